//! Attendance export parser with encoding and delimiter auto-detection.
//!
//! Turns raw export bytes into typed [`AttendanceRecord`]s:
//! headers are trimmed, the required column set is checked up front,
//! the trailing timezone abbreviation is stripped from both timestamps,
//! and missing cells become empty strings.

use csv::{ReaderBuilder, StringRecord, Trim};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::error::ParseError;
use crate::models::AttendanceRecord;

/// Columns that must be present in the export header.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "User ID",
    "First Name",
    "Last Name",
    "Middle Name",
    "Class ID",
    "Course ID",
    "Title",
    "Start Date/Time",
    "End Date/Time",
    "Venue",
    "Instructor First Name",
    "Instructor Last Name",
];

/// One space followed by two slash-separated alphabetic tokens at the end, e.g. ` EST/EDT`.
static TIMEZONE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" [A-Za-z]+/[A-Za-z]+$").expect("timezone suffix pattern is valid"));

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Cleaned rows, in export order
    pub records: Vec<AttendanceRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Trimmed column headers, including ones we ignore
    pub headers: Vec<String>,
}

/// Remove a trailing timezone abbreviation pair such as ` GMT/BST`.
///
/// Everything else in the string is preserved verbatim.
pub fn strip_timezone_suffix(value: &str) -> String {
    TIMEZONE_SUFFIX.replace(value, "").into_owned()
}

/// Below this `chardet` confidence a non-UTF-8 export is read as Windows-1252.
const MIN_DETECTION_CONFIDENCE: f32 = 0.8;

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always reported as `utf-8`; `chardet` is only consulted
/// for bytes that are not.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let (charset, confidence, _) = chardet::detect(bytes);
    if confidence < MIN_DETECTION_CONFIDENCE {
        return "windows-1252".to_string();
    }

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "windows-1252".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Drop a leading UTF-8 byte order mark.
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Decode bytes to string using the specified encoding.
///
/// Labels follow the WHATWG encoding standard, so `iso-8859-1` decodes as
/// Windows-1252. Unknown labels fall back to Windows-1252. A leading BOM is
/// dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" => String::from_utf8_lossy(bytes).into_owned(),
        label => encoding_rs::Encoding::for_label(label.as_bytes())
            .unwrap_or(encoding_rs::WINDOWS_1252)
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    };

    strip_bom(&decoded).to_string()
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to a comma when none of the candidates appear.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Positions of the required columns in the header row.
struct ColumnIndex {
    user_id: usize,
    first_name: usize,
    middle_name: usize,
    last_name: usize,
    class_id: usize,
    course_id: usize,
    title: usize,
    start_time: usize,
    end_time: usize,
    venue: usize,
    instructor_first_name: usize,
    instructor_last_name: usize,
}

impl ColumnIndex {
    /// Resolve every required column, reporting all missing ones at once.
    fn resolve(headers: &[String]) -> Result<Self, ParseError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h.as_str() == **col))
            .map(|col| col.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ParseError::MissingColumns(missing));
        }

        // First occurrence wins if a header is duplicated.
        let pos = |name: &str| headers.iter().position(|h| h.as_str() == name).unwrap_or(0);

        Ok(Self {
            user_id: pos("User ID"),
            first_name: pos("First Name"),
            middle_name: pos("Middle Name"),
            last_name: pos("Last Name"),
            class_id: pos("Class ID"),
            course_id: pos("Course ID"),
            title: pos("Title"),
            start_time: pos("Start Date/Time"),
            end_time: pos("End Date/Time"),
            venue: pos("Venue"),
            instructor_first_name: pos("Instructor First Name"),
            instructor_last_name: pos("Instructor Last Name"),
        })
    }

    fn record(&self, row: &StringRecord) -> AttendanceRecord {
        let field = |i: usize| row.get(i).unwrap_or("").to_string();

        AttendanceRecord {
            user_id: field(self.user_id),
            first_name: field(self.first_name),
            middle_name: field(self.middle_name),
            last_name: field(self.last_name),
            class_id: field(self.class_id),
            course_id: field(self.course_id),
            title: field(self.title),
            start_time: strip_timezone_suffix(&field(self.start_time)),
            end_time: strip_timezone_suffix(&field(self.end_time)),
            venue: field(self.venue),
            instructor_first_name: field(self.instructor_first_name),
            instructor_last_name: field(self.instructor_last_name),
        }
    }
}

/// Parse decoded export text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use attendance::parser::parse_attendance;
///
/// let records = parse_attendance(&export_text, ',')?;
/// println!("{} rows", records.len());
/// ```
pub fn parse_attendance(content: &str, delimiter: char) -> Result<Vec<AttendanceRecord>, ParseError> {
    parse_with_headers(content, delimiter).map(|(records, _)| records)
}

fn parse_with_headers(
    content: &str,
    delimiter: char,
) -> Result<(Vec<AttendanceRecord>, Vec<String>), ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(columns.record(&row?));
    }

    Ok((records, headers))
}

/// Parse export bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParsedTable, ParseError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let (records, headers) = parse_with_headers(&content, delimiter)?;

    Ok(ParsedTable {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse an export file from disk with auto-detection.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> Result<ParsedTable, ParseError> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "User ID,First Name,Last Name,Middle Name,Class ID,Course ID,Title,Start Date/Time,End Date/Time,Venue,Instructor First Name,Instructor Last Name";

    #[test]
    fn test_strip_timezone_suffix() {
        assert_eq!(strip_timezone_suffix("7/14/2024 09:00:00 GMT/BST"), "7/14/2024 09:00:00");
        assert_eq!(strip_timezone_suffix("7/14/2024 09:00:00 PST/PDT"), "7/14/2024 09:00:00");
        assert_eq!(strip_timezone_suffix("7/14/2024 09:00:00"), "7/14/2024 09:00:00");
        assert_eq!(strip_timezone_suffix(""), "");
    }

    #[test]
    fn test_strip_timezone_suffix_only_at_end() {
        assert_eq!(strip_timezone_suffix("EST/EDT 7/14/2024"), "EST/EDT 7/14/2024");
        assert_eq!(strip_timezone_suffix("7/14/2024 09:00:00 EST"), "7/14/2024 09:00:00 EST");
        assert_eq!(strip_timezone_suffix("7/14/2024  09:00 a/b"), "7/14/2024  09:00");
    }

    #[test]
    fn test_parse_simple_export() {
        let csv = format!(
            "{}\nU1,Ada,Lovelace,,C1,CS101,Intro,7/14/2024 09:00:00 GMT/BST,7/14/2024 10:00:00 GMT/BST,Room 1,Alan,Turing",
            HEADER
        );
        let records = parse_attendance(&csv, ',').unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.user_id, "U1");
        assert_eq!(r.middle_name, "");
        assert_eq!(r.course_id, "CS101");
        assert_eq!(r.start_time, "7/14/2024 09:00:00");
        assert_eq!(r.end_time, "7/14/2024 10:00:00");
        assert_eq!(r.instructor_last_name, "Turing");
    }

    #[test]
    fn test_headers_are_trimmed_and_extra_columns_ignored() {
        let csv = " User ID , First Name,Last Name,Middle Name,Class ID,Course ID,Title,Start Date/Time,End Date/Time,Venue,Instructor First Name,Instructor Last Name ,Email\n\
                   U1,Ada,Lovelace,B,C1,CS101,Intro,x,y,Room,Alan,Turing,ada@example.org";
        let records = parse_attendance(csv, ',').unwrap();

        assert_eq!(records[0].user_id, "U1");
        assert_eq!(records[0].instructor_last_name, "Turing");
    }

    #[test]
    fn test_short_rows_are_padded_with_empty_strings() {
        let csv = format!("{}\nU1,Ada", HEADER);
        let records = parse_attendance(&csv, ',').unwrap();

        assert_eq!(records[0].first_name, "Ada");
        assert_eq!(records[0].venue, "");
        assert_eq!(records[0].start_time, "");
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let csv = format!(
            "{}\nU1,Ada,Lovelace,,C1,CS101,\"Intro, Part 1\",7/14/2024 09:00:00,7/14/2024 10:00:00,\"Hall A, Floor 2\",Alan,Turing",
            HEADER
        );
        let records = parse_attendance(&csv, ',').unwrap();

        assert_eq!(records[0].title, "Intro, Part 1");
        assert_eq!(records[0].venue, "Hall A, Floor 2");
    }

    #[test]
    fn test_missing_columns_error() {
        let csv = "User ID,First Name\nU1,Ada";
        let err = parse_attendance(csv, ',').unwrap_err();

        match err {
            ParseError::MissingColumns(cols) => {
                assert!(cols.contains(&"Class ID".to_string()));
                assert!(cols.contains(&"Venue".to_string()));
                assert!(!cols.contains(&"User ID".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_export_error() {
        assert!(matches!(parse_attendance("", ','), Err(ParseError::Empty)));
        assert!(matches!(parse_attendance("  \n", ','), Err(ParseError::Empty)));
    }

    #[test]
    fn test_header_only_export_has_no_records() {
        let records = parse_attendance(HEADER, ',').unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_semicolon_with_bom() {
        let csv = format!("\u{feff}{}\nU1;Ada;Lovelace;;C1;CS101;Intro;a;b;Room;Alan;Turing", HEADER.replace(',', ";"));
        let table = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(table.delimiter, ';');
        assert_eq!(table.headers[0], "User ID");
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].class_id, "C1");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_utf8_export_keeps_accented_names() {
        let csv = format!(
            "{}\nU1,José,Müller,Zoë,C1,CS101,Économie,7/14/2024 09:00:00,7/14/2024 10:00:00,Salle Érable,François,Ñúñez",
            HEADER
        );
        let table = parse_bytes_auto(csv.as_bytes()).unwrap();
        let r = &table.records[0];

        assert_eq!(table.encoding, "utf-8");
        assert_eq!(r.first_name, "José");
        assert_eq!(r.last_name, "Müller");
        assert_eq!(r.middle_name, "Zoë");
        assert_eq!(r.title, "Économie");
        assert_eq!(r.venue, "Salle Érable");
        assert_eq!(r.instructor_first_name, "François");
        assert_eq!(r.instructor_last_name, "Ñúñez");
    }

    #[test]
    fn test_latin1_export_is_detected() {
        let mut bytes = format!("{}\n", HEADER).into_bytes();
        // "U1,Renée,Chloé,,C1,CS101,Intro,a,b,Salle Érable,Alan,Turing" in ISO-8859-1
        bytes.extend_from_slice(b"U1,Ren\xe9e,Chlo\xe9,,C1,CS101,Intro,a,b,Salle \xc9rable,Alan,Turing");

        let table = parse_bytes_auto(&bytes).unwrap();
        let r = &table.records[0];

        assert_ne!(table.encoding, "utf-8");
        assert_eq!(r.first_name, "Renée");
        assert_eq!(r.last_name, "Chloé");
        assert_eq!(r.venue, "Salle Érable");
    }

    #[test]
    fn test_detect_encoding_prefers_utf8() {
        assert_eq!(detect_encoding("Renée".as_bytes()), "utf-8");
        assert_eq!(detect_encoding(b"plain ascii"), "utf-8");
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}User ID"), "User ID");
        assert_eq!(strip_bom("User ID"), "User ID");
    }

    #[test]
    fn test_parse_file_auto() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, format!("{}\nU9,Grace,Hopper,M,C2,CS201,Compilers,7/15/2024 13:00:00,7/15/2024 14:00:00,Lab,Edsger,Dijkstra", HEADER)).unwrap();

        let table = parse_file_auto(&path).unwrap();
        assert_eq!(table.records[0].user_id, "U9");
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file_auto("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
