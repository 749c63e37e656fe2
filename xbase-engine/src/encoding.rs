//! Text decoding for character fields and text memos
//!
//! Tables store text in a single-byte code page. A converter turns those
//! bytes into UTF-8; the reader never interprets text bytes itself.

use crate::error::{DbfError, DbfResult};

/// Converts raw table text into UTF-8 bytes
pub trait EncodingConverter: Send + Sync {
    /// Decode `input` into UTF-8
    fn decode(&self, input: &[u8]) -> DbfResult<Vec<u8>>;

    /// Name used in configuration and diagnostics
    fn name(&self) -> &'static str;
}

/// Bytes are already UTF-8; invalid sequences are rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl EncodingConverter for Utf8 {
    fn decode(&self, input: &[u8]) -> DbfResult<Vec<u8>> {
        std::str::from_utf8(input)
            .map(|s| s.as_bytes().to_vec())
            .map_err(|e| DbfError::Encoding(format!("invalid UTF-8: {}", e)))
    }

    fn name(&self) -> &'static str {
        "utf-8"
    }
}

/// ISO-8859-1: every byte maps to the code point of the same value
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl EncodingConverter for Latin1 {
    fn decode(&self, input: &[u8]) -> DbfResult<Vec<u8>> {
        Ok(input.iter().map(|&b| b as char).collect::<String>().into_bytes())
    }

    fn name(&self) -> &'static str {
        "latin-1"
    }
}

/// Windows-1252, the usual code page of FoxPro tables (mark 0x03)
#[derive(Debug, Clone, Copy, Default)]
pub struct Windows1252;

/// Code points for 0x80..=0x9F; `None` marks unassigned bytes
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

impl EncodingConverter for Windows1252 {
    fn decode(&self, input: &[u8]) -> DbfResult<Vec<u8>> {
        let mut out = String::with_capacity(input.len());
        for (i, &b) in input.iter().enumerate() {
            let c = match b {
                0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize].ok_or_else(|| {
                    DbfError::Encoding(format!(
                        "byte 0x{:02x} at position {} is unassigned in windows-1252",
                        b, i
                    ))
                })?,
                _ => b as char,
            };
            out.push(c);
        }
        Ok(out.into_bytes())
    }

    fn name(&self) -> &'static str {
        "windows-1252"
    }
}

/// Look up a converter by name (case-insensitive)
pub fn converter_for(name: &str) -> Option<Box<dyn EncodingConverter>> {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Some(Box::new(Utf8)),
        "latin-1" | "latin1" | "iso-8859-1" => Some(Box::new(Latin1)),
        "windows-1252" | "cp1252" => Some(Box::new(Windows1252)),
        _ => None,
    }
}

/// Converter matching a header code page mark, if one is supported
pub fn converter_for_code_page(mark: u8) -> Option<Box<dyn EncodingConverter>> {
    match mark {
        0x03 => Some(Box::new(Windows1252)),
        _ => None,
    }
}
