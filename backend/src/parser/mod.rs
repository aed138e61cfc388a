//! CSV reading and writing with encoding and delimiter detection.
//!
//! Reading produces a [`SourceTable`] whose cells stay raw bytes: coercing a
//! row to text happens later, per row, so that a bad cell is reported with its
//! row index instead of failing the whole read.

use csv::{ByteRecord, ReaderBuilder, Terminator, WriterBuilder};
use std::path::Path;
use std::str::FromStr;

use crate::error::{CsvError, CsvResult};
use crate::models::{SourceTable, TargetTable};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// How to interpret the bytes of an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputEncoding {
    /// Strict UTF-8; invalid rows fail the conversion
    #[default]
    Utf8,
    /// Detect with chardet and transcode to UTF-8
    Auto,
    /// An explicit WHATWG encoding label (e.g. `windows-1252`)
    Label(String),
}

impl FromStr for InputEncoding {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "utf-8" | "utf8" => Ok(InputEncoding::Utf8),
            "auto" => Ok(InputEncoding::Auto),
            other => encoding_rs::Encoding::for_label(other.as_bytes())
                .map(|_| InputEncoding::Label(other.to_string()))
                .ok_or_else(|| CsvError::EncodingError(other.to_string())),
        }
    }
}

/// Result of reading a CSV with metadata
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub table: SourceTable,
    /// Encoding the content was read as
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Transcode bytes in the given encoding to UTF-8
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let enc = encoding_rs::Encoding::for_label(encoding.as_bytes())
        .ok_or_else(|| CsvError::EncodingError(encoding.to_string()))?;
    let (decoded, _, _) = enc.decode(bytes);
    Ok(decoded.into_owned())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &[u8]) -> char {
    let first_line = content
        .split(|b| *b == b'\n')
        .next()
        .unwrap_or_default();

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.iter().filter(|b| **b == sep as u8).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read CSV bytes into a source table.
pub fn read_csv_bytes(bytes: &[u8], encoding: &InputEncoding) -> CsvResult<ParsedCsv> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CsvError::EmptyFile);
    }

    let (content, encoding_name) = match encoding {
        InputEncoding::Utf8 => (bytes.to_vec(), "utf-8".to_string()),
        InputEncoding::Auto => {
            let detected = detect_encoding(bytes);
            if detected == "utf-8" {
                (bytes.to_vec(), detected)
            } else {
                (decode_content(bytes, &detected)?.into_bytes(), detected)
            }
        }
        InputEncoding::Label(label) => (decode_content(bytes, label)?.into_bytes(), label.clone()),
    };

    let delimiter = detect_delimiter(&content);
    let table = parse_table(&content, delimiter)?;

    Ok(ParsedCsv {
        table,
        encoding: encoding_name,
        delimiter,
    })
}

/// Read a CSV file from disk into a source table.
pub fn read_csv_file<P: AsRef<Path>>(path: P, encoding: &InputEncoding) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    read_csv_bytes(&bytes, encoding)
}

fn parse_table(content: &[u8], delimiter: char) -> CsvResult<SourceTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| {
            std::str::from_utf8(h)
                .map(str::to_string)
                .map_err(|e| CsvError::EncodingError(format!("header is not valid UTF-8: {}", e)))
        })
        .collect::<CsvResult<_>>()?;

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        rows.push(record.clone());
    }

    Ok(SourceTable::new(headers, rows))
}

/// Serialize a converted table as comma-delimited UTF-8 CSV.
///
/// The header is written verbatim, repeated names included.
pub fn write_csv(table: &TargetTable) -> CsvResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row.values())?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetRow;

    fn read(csv: &str) -> ParsedCsv {
        read_csv_bytes(csv.as_bytes(), &InputEncoding::Utf8).unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let parsed = read("name,age\nAlice,30\nBob,25");
        let table = parsed.table;

        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0).unwrap().raw("name"), Some("Alice"));
        assert_eq!(table.row(1).unwrap().raw("age"), Some("25"));
    }

    #[test]
    fn test_quoted_values() {
        let parsed = read("name,insight\n\"Doe, Jane\",\"Says \"\"hi\"\"\"");
        let row = parsed.table.row(0).unwrap();
        assert_eq!(row.raw("name"), Some("Doe, Jane"));
        assert_eq!(row.raw("insight"), Some("Says \"hi\""));
    }

    #[test]
    fn test_short_and_long_rows() {
        let parsed = read("a,b,c\n1\n1,2,3,4");
        let table = parsed.table;
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0).unwrap().raw("b"), None);
        assert_eq!(table.row(1).unwrap().raw("c"), Some("3"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"first_name\nJane");
        let parsed = read_csv_bytes(&bytes, &InputEncoding::Utf8).unwrap();
        assert_eq!(parsed.table.headers(), &["first_name"]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(
            read_csv_bytes(b"", &InputEncoding::Utf8),
            Err(CsvError::EmptyFile)
        ));
        assert!(matches!(
            read_csv_bytes(b" \n \n", &InputEncoding::Utf8),
            Err(CsvError::EmptyFile)
        ));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter(b"a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter(b"single"), ',');
    }

    #[test]
    fn test_semicolon_file() {
        let parsed = read("first_name;last_name\nJane;Doe");
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.table.row(0).unwrap().raw("last_name"), Some("Doe"));
    }

    #[test]
    fn test_invalid_utf8_deferred_to_row() {
        let mut bytes = b"city\nSpringfield\n".to_vec();
        bytes.extend_from_slice(&[b'S', b'o', b'c', 0xE9, b'\n']);
        let parsed = read_csv_bytes(&bytes, &InputEncoding::Utf8).unwrap();
        assert!(parsed.table.row(0).is_ok());
        assert!(parsed.table.row(1).is_err());
    }

    #[test]
    fn test_latin1_label() {
        let bytes: &[u8] = &[b'c', b'i', b't', b'y', b'\n', 0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let encoding: InputEncoding = "windows-1252".parse().unwrap();
        let parsed = read_csv_bytes(bytes, &encoding).unwrap();
        assert_eq!(parsed.table.row(0).unwrap().raw("city"), Some("Société"));
    }

    #[test]
    fn test_encoding_parse() {
        assert_eq!("UTF-8".parse::<InputEncoding>().unwrap(), InputEncoding::Utf8);
        assert_eq!("auto".parse::<InputEncoding>().unwrap(), InputEncoding::Auto);
        assert!("klingon".parse::<InputEncoding>().is_err());
    }

    #[test]
    fn test_write_keeps_duplicate_header() {
        let mut row = TargetRow::default();
        row.push("First Name", "Jane");
        row.push("Tag", "Homeowner");
        row.push("Tag", "Sellers, Pre-Movers");

        let table = TargetTable {
            header: vec!["First Name".into(), "Tag".into(), "Tag".into()],
            rows: vec![row],
        };
        let out = String::from_utf8(write_csv(&table).unwrap()).unwrap();
        assert_eq!(out, "First Name,Tag,Tag\nJane,Homeowner,\"Sellers, Pre-Movers\"\n");
    }
}
