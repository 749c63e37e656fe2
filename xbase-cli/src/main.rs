//! xbase - inspect FoxPro DBF tables from the command line

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use xbase_engine::encoding::{converter_for, converter_for_code_page, Windows1252};
use xbase_engine::storage::Header;
use xbase_engine::EncodingConverter;

mod config;
mod render;

use config::Config;

/// xbase - read-only FoxPro table inspector
#[derive(Parser, Debug)]
#[command(name = "xbase")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text encoding (utf-8, latin-1, windows-1252, auto)
    #[arg(short, long)]
    encoding: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table header
    Info { table: PathBuf },
    /// List the columns
    Columns { table: PathBuf },
    /// Print decoded rows
    Rows {
        table: PathBuf,
        /// First row to print
        #[arg(long, default_value_t = 0)]
        start: u32,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<u32>,
        /// Include rows flagged as deleted
        #[arg(long)]
        show_deleted: bool,
    },
}

fn log_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

/// Pick a converter by name; "auto" follows the header's code page mark
fn converter(name: &str, table: &Path) -> Result<Box<dyn EncodingConverter>> {
    if name.eq_ignore_ascii_case("auto") {
        let mut file = std::fs::File::open(table)
            .with_context(|| format!("opening {}", table.display()))?;
        let header = Header::read_from(&mut file)?;
        let converter = converter_for_code_page(header.code_page).unwrap_or_else(|| {
            debug!(code_page = header.code_page, "no converter for code page, using windows-1252");
            Box::new(Windows1252) as Box<dyn EncodingConverter>
        });
        return Ok(converter);
    }
    match converter_for(name) {
        Some(converter) => Ok(converter),
        None => bail!("unknown encoding {:?}", name),
    }
}

fn table_path(command: &Command) -> &Path {
    match command {
        Command::Info { table } | Command::Columns { table } | Command::Rows { table, .. } => table,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let level = log_level(args.log_level.as_deref().unwrap_or(&config.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let path = table_path(&args.command);
    let encoding = args.encoding.as_deref().unwrap_or(&config.encoding);
    let converter = converter(encoding, path)?;
    info!(table = %path.display(), encoding = converter.name(), "opening table");

    let mut dbf = xbase_engine::fs::open(path, converter)
        .with_context(|| format!("opening {}", path.display()))?;

    match args.command {
        Command::Info { .. } => {
            let report = render::HeaderReport {
                header: dbf.header(),
                memo: dbf.memo_header(),
                encoding: dbf.converter().name(),
            };
            print!("{}", report);
        }
        Command::Columns { .. } => {
            print!("{}", render::ColumnTable(dbf.columns()));
        }
        Command::Rows {
            start,
            limit,
            show_deleted,
            ..
        } => {
            let limit = limit.or(config.limit).unwrap_or(u32::MAX);
            let show_deleted = show_deleted || config.show_deleted;
            let names: Vec<String> = dbf.column_names().into_iter().map(String::from).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();

            dbf.goto(start)?;
            let mut printed = 0;
            while !dbf.eof() && printed < limit {
                if show_deleted || !dbf.is_deleted()? {
                    let row = dbf.row()?;
                    println!("{}", render::RowLine { row: &row, names: &names });
                    printed += 1;
                }
                dbf.skip(1);
            }
            debug!(printed, "rows done");
        }
    }

    Ok(())
}
