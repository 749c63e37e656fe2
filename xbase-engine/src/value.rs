//! Interpretation of raw field bytes by column type

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::encoding::EncodingConverter;
use crate::error::{DbfError, DbfResult};
use crate::storage::column::{Column, ColumnType};

/// Julian day number of 1970-01-01
const JULIAN_DAY_UNIX_EPOCH: i64 = 2_440_588;

/// Currency values are stored scaled by this factor
const CURRENCY_SCALE: f64 = 10_000.0;

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Character(String),
    Integer(i64),
    Float(f64),
    Currency(f64),
    Logical(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Text memo, already decoded
    Text(String),
    /// Binary memo or varbinary, untouched
    Binary(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Character(s) | Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Currency(v) => write!(f, "{:.4}", v),
            Value::Logical(b) => f.write_str(if *b { "T" } else { "F" }),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f")),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Decode converter output into a `String`
pub(crate) fn decode_text(converter: &dyn EncodingConverter, raw: &[u8]) -> DbfResult<String> {
    let bytes = converter.decode(raw)?;
    String::from_utf8(bytes).map_err(|e| {
        DbfError::Encoding(format!("{} produced invalid UTF-8: {}", converter.name(), e))
    })
}

fn trimmed_ascii<'a>(column: &Column, raw: &'a [u8]) -> DbfResult<&'a str> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| DbfError::decode(column_what(column), column.offset as u64, e))?;
    Ok(text.trim_matches(|c: char| c == ' ' || c == '\0'))
}

fn column_what(column: &Column) -> &'static str {
    match column.column_type() {
        Some(ColumnType::Numeric) | Some(ColumnType::Float) => "numeric field",
        Some(ColumnType::Date) => "date field",
        Some(ColumnType::DateTime) => "datetime field",
        Some(ColumnType::Integer) => "integer field",
        Some(ColumnType::Currency) => "currency field",
        Some(ColumnType::Double) => "double field",
        Some(ColumnType::Logical) => "logical field",
        _ => "field",
    }
}

fn need(column: &Column, raw: &[u8], len: usize) -> DbfResult<()> {
    if raw.len() < len {
        return Err(DbfError::decode(
            column_what(column),
            column.offset as u64,
            format!("need {} bytes, found {}", len, raw.len()),
        ));
    }
    Ok(())
}

/// Interpret a non-memo field
///
/// Memo columns only hold a block index; resolving them needs the memo
/// store and happens in [`crate::table::Dbf::value`].
pub fn interpret(
    column: &Column,
    raw: &[u8],
    converter: &dyn EncodingConverter,
) -> DbfResult<Value> {
    let column_type = column.column_type().ok_or_else(|| {
        DbfError::decode(
            "column type",
            column.offset as u64,
            format!("unknown type tag {:?}", column.data_type as char),
        )
    })?;

    match column_type {
        ColumnType::Character | ColumnType::Varchar => {
            let text = decode_text(converter, raw)?;
            Ok(Value::Character(
                text.trim_end_matches(|c: char| c == ' ' || c == '\0').to_string(),
            ))
        }
        ColumnType::Numeric => {
            let text = trimmed_ascii(column, raw)?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            if column.decimals == 0 {
                if let Ok(i) = text.parse::<i64>() {
                    return Ok(Value::Integer(i));
                }
            }
            parse_float(column, text)
        }
        ColumnType::Float => {
            let text = trimmed_ascii(column, raw)?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            parse_float(column, text)
        }
        ColumnType::Integer => {
            need(column, raw, 4)?;
            Ok(Value::Integer(LittleEndian::read_i32(raw) as i64))
        }
        ColumnType::Currency => {
            need(column, raw, 8)?;
            Ok(Value::Currency(LittleEndian::read_i64(raw) as f64 / CURRENCY_SCALE))
        }
        ColumnType::Double => {
            need(column, raw, 8)?;
            Ok(Value::Float(LittleEndian::read_f64(raw)))
        }
        ColumnType::Logical => match raw.first() {
            Some(b'T' | b't' | b'Y' | b'y') => Ok(Value::Logical(true)),
            Some(b'F' | b'f' | b'N' | b'n') => Ok(Value::Logical(false)),
            Some(b' ' | b'?' | 0) | None => Ok(Value::Null),
            Some(other) => Err(DbfError::decode(
                "logical field",
                column.offset as u64,
                format!("unexpected byte 0x{:02x}", other),
            )),
        },
        ColumnType::Date => {
            let text = trimmed_ascii(column, raw)?;
            if text.is_empty() || text.bytes().all(|b| b == b'0') {
                return Ok(Value::Null);
            }
            NaiveDate::parse_from_str(text, "%Y%m%d")
                .map(Value::Date)
                .map_err(|e| DbfError::decode("date field", column.offset as u64, e))
        }
        ColumnType::DateTime => {
            need(column, raw, 8)?;
            let julian = LittleEndian::read_i32(&raw[..4]) as i64;
            let millis = LittleEndian::read_i32(&raw[4..8]) as i64;
            if julian == 0 && millis == 0 {
                return Ok(Value::Null);
            }
            julian_to_datetime(julian, millis)
                .map(Value::DateTime)
                .ok_or_else(|| {
                    DbfError::decode(
                        "datetime field",
                        column.offset as u64,
                        format!("julian day {} with {} ms is out of range", julian, millis),
                    )
                })
        }
        ColumnType::Varbinary => Ok(Value::Binary(raw.to_vec())),
        ColumnType::Memo | ColumnType::General | ColumnType::Picture => Err(DbfError::decode(
            "field",
            column.offset as u64,
            format!("column {} needs the memo store", column.name),
        )),
        ColumnType::NullFlags => Err(DbfError::decode(
            "field",
            column.offset as u64,
            "the null flags column has no value",
        )),
    }
}

fn parse_float(column: &Column, text: &str) -> DbfResult<Value> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| DbfError::decode(column_what(column), column.offset as u64, e))
}

fn julian_to_datetime(julian: i64, millis: i64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let days = Duration::try_days(julian - JULIAN_DAY_UNIX_EPOCH)?;
    epoch
        .checked_add_signed(days)?
        .checked_add_signed(Duration::try_milliseconds(millis)?)
}
