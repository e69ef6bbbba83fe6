//! CSV ingest and normalization.
//!
//! This module is responsible for turning a COVID-19 time-series CSV into a
//! clean list of `Record`s that are safe to aggregate.
//!
//! Design goals:
//! - **Tolerant schema**: two header spellings per column, case-insensitive
//! - **Row-level filtering** (skip bad rows, but report what happened)
//! - **Never fails**: degenerate input maps to an empty result
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{Record, UNKNOWN_REGION};

const DATE_COLUMNS: &[&str] = &["date"];
const REGION_COLUMNS: &[&str] = &["country/region", "country"];
const SUBREGION_COLUMNS: &[&str] = &["province/state", "province"];
const CONFIRMED_COLUMNS: &[&str] = &["confirmed"];
const DEATHS_COLUMNS: &[&str] = &["deaths"];
const RECOVERED_COLUMNS: &[&str] = &["recovered"];
const ACTIVE_COLUMNS: &[&str] = &["active"];

// `%y` must come before `%Y`: chrono would otherwise read "1/22/20" as year 20.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// A row that was skipped during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based line number in the source text.
    pub line: usize,
    pub reason: String,
}

/// Ingest output: surviving records + bookkeeping about skipped rows.
#[derive(Debug, Clone, Default)]
pub struct IngestedRecords {
    pub records: Vec<Record>,
    pub rows_read: usize,
    pub dropped: Vec<DroppedRow>,
}

/// Parse raw CSV text into records.
///
/// Rows with an unparseable (or negative) `confirmed` value or an invalid date
/// are dropped silently; other count columns fall back to 0.
pub fn parse_records(text: &str) -> IngestedRecords {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            debug!("CSV header row unreadable: {e}");
            return IngestedRecords::default();
        }
    };
    let header_map = build_header_map(&headers);

    let mut out = IngestedRecords::default();

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header and lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                drop_row(&mut out, line, format!("CSV parse error: {e}"));
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(r) => out.records.push(r),
            Err(reason) => drop_row(&mut out, line, reason),
        }
    }

    debug!(
        rows_read = out.rows_read,
        kept = out.records.len(),
        dropped = out.dropped.len(),
        "parsed CSV records"
    );
    out
}

fn drop_row(out: &mut IngestedRecords, line: usize, reason: String) {
    debug!(line, %reason, "dropping CSV row");
    out.dropped.push(DroppedRow { line, reason });
}

/// Normalized header name -> every column carrying it, in file order.
fn build_header_map(headers: &StringRecord) -> HashMap<String, Vec<usize>> {
    let mut map: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(normalize_header_name(name)).or_default().push(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the `date` column goes missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    strip_quotes(name).to_ascii_lowercase()
}

fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// First non-empty value among the given column aliases.
fn field<'a>(record: &'a StringRecord, header_map: &HashMap<String, Vec<usize>>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| header_map.get(*name))
        .flatten()
        .filter_map(|&idx| record.get(idx))
        .map(strip_quotes)
        .find(|v| !v.is_empty())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, Vec<usize>>) -> Result<Record, String> {
    let confirmed = match field(record, header_map, CONFIRMED_COLUMNS) {
        None => 0,
        Some(raw) => parse_count(raw).ok_or_else(|| format!("invalid confirmed value '{raw}'"))?,
    };
    if confirmed < 0 {
        return Err(format!("negative confirmed value {confirmed}"));
    }

    let raw_date = field(record, header_map, DATE_COLUMNS).ok_or_else(|| "missing date".to_string())?;
    let date = parse_date(raw_date).ok_or_else(|| format!("invalid date '{raw_date}'"))?;

    let region = field(record, header_map, REGION_COLUMNS)
        .unwrap_or(UNKNOWN_REGION)
        .to_string();
    let subregion = field(record, header_map, SUBREGION_COLUMNS)
        .unwrap_or_default()
        .to_string();

    Ok(Record {
        date,
        region,
        subregion,
        confirmed,
        deaths: count_or_zero(field(record, header_map, DEATHS_COLUMNS)),
        recovered: count_or_zero(field(record, header_map, RECOVERED_COLUMNS)),
        active: count_or_zero(field(record, header_map, ACTIVE_COLUMNS)),
    })
}

fn count_or_zero(raw: Option<&str>) -> i64 {
    raw.and_then(parse_count).unwrap_or(0)
}

/// Leading-integer parse: optional sign, then digits; trailing text is ignored.
///
/// `"12"` -> 12, `"12.9"` -> 12, `"-3"` -> -3, `"abc"` -> None.
/// Digit runs too long for `i64` saturate.
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Only digits remain, so a parse failure means the run overflows `i64`.
    let value = match digits[..end].parse::<i64>() {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value)
}

/// Parse a calendar date from the handful of layouts seen in public COVID exports.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_all_recognized_columns_verbatim() {
        let text = "\
\"Province/State\",\"Country/Region\",\"Date\",\"Confirmed\",\"Deaths\",\"Recovered\",\"Active\"
Hubei,China,2020-01-22,444,17,28,399
";
        let out = parse_records(text);
        assert_eq!(out.rows_read, 1);
        assert!(out.dropped.is_empty());
        assert_eq!(
            out.records,
            vec![Record {
                date: ymd(2020, 1, 22),
                region: "China".to_string(),
                subregion: "Hubei".to_string(),
                confirmed: 444,
                deaths: 17,
                recovered: 28,
                active: 399,
            }]
        );
    }

    #[test]
    fn lowercase_headers_are_accepted() {
        let text = "date,country,province,confirmed,deaths,recovered,active\n2021-03-01,Italy,,10,1,2,7\n";
        let out = parse_records(text);
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.region, "Italy");
        assert_eq!(r.subregion, "");
        assert_eq!(r.confirmed, 10);
        assert_eq!(r.active, 7);
    }

    #[test]
    fn header_bom_is_stripped() {
        let text = "\u{feff}Date,Country/Region,Confirmed\n2020-02-01,France,5\n";
        let out = parse_records(text);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].date, ymd(2020, 2, 1));
    }

    #[test]
    fn non_numeric_confirmed_drops_the_row() {
        let text = "Date,Country/Region,Confirmed,Deaths\n2020-02-01,France,abc,3\n2020-02-02,France,7,1\n";
        let out = parse_records(text);
        assert_eq!(out.rows_read, 2);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].confirmed, 7);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].line, 2);
    }

    #[test]
    fn missing_fields_default() {
        let text = "Date,Country/Region,Confirmed,Deaths\n2020-02-01,,,x\n";
        let out = parse_records(text);
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.region, UNKNOWN_REGION);
        assert_eq!(r.confirmed, 0);
        assert_eq!(r.deaths, 0);
        assert_eq!(r.recovered, 0);
    }

    #[test]
    fn invalid_date_drops_the_row() {
        let text = "Date,Confirmed\nnot-a-date,5\n";
        let out = parse_records(text);
        assert!(out.records.is_empty());
        assert_eq!(out.dropped.len(), 1);
    }

    #[test]
    fn header_only_or_empty_input_yields_no_records() {
        assert!(parse_records("Date,Confirmed\n").records.is_empty());
        assert!(parse_records("").records.is_empty());
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let text = "Date,Country/Region,Confirmed\n2020-04-01,\"Korea, South\",9\n";
        let out = parse_records(text);
        assert_eq!(out.records[0].region, "Korea, South");
        assert_eq!(out.records[0].confirmed, 9);
    }

    #[test]
    fn dates_normalize_from_common_layouts() {
        assert_eq!(parse_date("2020-12-28"), Some(ymd(2020, 12, 28)));
        assert_eq!(parse_date("1/22/20"), Some(ymd(2020, 1, 22)));
        assert_eq!(parse_date("01/22/2020"), Some(ymd(2020, 1, 22)));
        assert_eq!(parse_date("2020-01-22T00:00:00Z"), Some(ymd(2020, 1, 22)));
        assert_eq!(parse_date("2020-01-22 13:45:00"), Some(ymd(2020, 1, 22)));
        assert_eq!(parse_date("2020-02-30"), None);
    }

    #[test]
    fn count_parse_uses_leading_integer() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count("12.9"), Some(12));
        assert_eq!(parse_count("-3"), Some(-3));
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("-"), None);
    }

    #[test]
    fn oversized_counts_saturate_and_keep_the_row() {
        assert_eq!(parse_count("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_count("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_count("9223372036854775807"), Some(i64::MAX));

        let out = parse_records("Date,Confirmed\n2020-01-01,99999999999999999999\n");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].confirmed, i64::MAX);
    }

    #[test]
    fn case_duplicate_headers_fall_through_to_the_filled_column() {
        let text = "Date,Confirmed,confirmed\n2020-01-01,,42\n2020-01-02,7,9\n";
        let out = parse_records(text);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].confirmed, 42);
        assert_eq!(out.records[1].confirmed, 7);
    }

    #[test]
    fn negative_confirmed_is_dropped_but_negative_active_is_kept() {
        let text = "Date,Confirmed,Active\n2020-01-01,-1,0\n2020-01-02,5,-2\n";
        let out = parse_records(text);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].active, -2);
    }
}
