// src/process/extract.rs

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, instrument, trace};

use super::types::ObservationRow;
use crate::error::ExtractError;
use crate::fetch::RawYearPayload;

/// Marks the header line of the tabular section.
pub const HEADER_MARKER: &str = "\"tab_code\"";

pub const TAB_CODE: &str = "tab_code";
pub const CATEGORY_CODE: &str = "cat01_code";
pub const AREA_CODE: &str = "area_code";
pub const VALUE: &str = "value";

const REQUIRED_COLUMNS: [&str; 4] = [TAB_CODE, CATEGORY_CODE, AREA_CODE, VALUE];

/// Headers that carry the human-readable region label, in preference order.
pub const REGION_NAME_COLUMNS: [&str; 2] = ["地域", "area_name"];

/// Byte offset of the first line containing [`HEADER_MARKER`].
pub fn locate_header(text: &str) -> Option<usize> {
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        if line.contains(HEADER_MARKER) {
            return Some(pos);
        }
        pos += line.len();
    }
    None
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    category: usize,
    area: usize,
    value: usize,
    region: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, ExtractError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            match find(name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ExtractError::SchemaMismatch { missing });
        }

        let [_tab, category, area, value] = required;
        Ok(Self {
            category,
            area,
            value,
            region: REGION_NAME_COLUMNS.iter().find_map(|name| find(*name)),
        })
    }

    fn row(&self, record: &StringRecord, survey_year: i32) -> ObservationRow {
        let cell = |idx: usize| record.get(idx).unwrap_or("").to_string();
        ObservationRow {
            category_code: cell(self.category),
            area_code: cell(self.area),
            region_name: self
                .region
                .and_then(|idx| record.get(idx))
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            value: cell(self.value),
            survey_year,
        }
    }
}

/// Parse the tabular section of `payload` into rows stamped with its year.
#[instrument(level = "debug", skip(payload), fields(year = payload.year, bytes = payload.body.len()))]
pub fn extract_rows(payload: &RawYearPayload) -> Result<Vec<ObservationRow>, ExtractError> {
    let start = locate_header(&payload.body).ok_or(ExtractError::HeaderNotFound)?;
    trace!(offset = start, "found header line");

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(payload.body[start..].as_bytes());

    let columns = Columns::resolve(reader.headers()?)?;
    trace!(?columns, "resolved columns");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(columns.row(&record, payload.year));
    }

    if rows.is_empty() {
        return Err(ExtractError::EmptyTable);
    }
    debug!(rows = rows.len(), "extracted rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::{QuoteStyle, WriterBuilder};

    const PAYLOAD_2015: &str = r#"
"RESULT", "OK"
"METADATA", "..."

"VALUE"
"tab_code","表章項目","cat01_code","男女別","area_code","地域","time_code","時間軸","unit","value","annotation"
"020","人口","A1101","総数","01000","Hokkaido","2015100000","2015年","人","5381733",""
"020","人口","A1101","総数","13000","Tokyo","2015100000","2015年","人","13515271",""
"#;

    fn payload(year: i32, body: &str) -> RawYearPayload {
        RawYearPayload {
            year,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_header_located_after_banner() {
        let offset = locate_header(PAYLOAD_2015).unwrap();
        assert!(PAYLOAD_2015[offset..].starts_with("\"tab_code\""));
        assert_eq!(locate_header("\"RESULT\"\n\"VALUE\"\n"), None);
    }

    #[test]
    fn test_rows_keep_leading_zeros_and_year() {
        let rows = extract_rows(&payload(2015, PAYLOAD_2015)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ObservationRow {
                category_code: "A1101".into(),
                area_code: "01000".into(),
                region_name: Some("Hokkaido".into()),
                value: "5381733".into(),
                survey_year: 2015,
            }
        );
        assert_eq!(rows[1].region_name.as_deref(), Some("Tokyo"));
    }

    #[test]
    fn test_missing_region_column_leaves_name_absent() {
        let body = "\"RESULT\",\"OK\"\n\
\"tab_code\",\"cat01_code\",\"area_code\",\"time_code\",\"unit\",\"value\",\"note\"\n\
\"010\",\"A1101\",\"99000\",\"2020100000\",\"人\",\"***\",\"注釈\"\n";
        let rows = extract_rows(&payload(2020, body)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].region_name, None);
        assert_eq!(rows[0].value, "***");
    }

    #[test]
    fn test_no_header_and_empty_table() {
        let err = extract_rows(&payload(2000, "\"RESULT\",\"NG\"\n")).unwrap_err();
        assert!(matches!(err, ExtractError::HeaderNotFound));

        let body = "\"RESULT\",\"OK\"\n\"VALUE\"\n\"tab_code\",\"cat01_code\",\"area_code\",\"value\"";
        let err = extract_rows(&payload(2000, body)).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyTable));

        let body = "\"tab_code\",\"cat01_code\",\"area_code\",\"value\"\n\n\"\",\"\",\"\",\"\"\n";
        let err = extract_rows(&payload(2000, body)).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyTable));
    }

    #[test]
    fn test_missing_required_column_is_schema_mismatch() {
        let body = "\"tab_code\",\"cat01_code\",\"value\"\n\"010\",\"A1101\",\"5\"\n";
        match extract_rows(&payload(2005, body)).unwrap_err() {
            ExtractError::SchemaMismatch { missing } => assert_eq!(missing, vec!["area_code"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reparse_of_written_rows_is_identical() {
        let rows = extract_rows(&payload(2015, PAYLOAD_2015)).unwrap();

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(Vec::new());
        writer
            .write_record(["tab_code", "cat01_code", "area_code", "地域", "value"])
            .unwrap();
        for row in &rows {
            writer
                .write_record([
                    "020",
                    row.category_code.as_str(),
                    row.area_code.as_str(),
                    row.region_name.as_deref().unwrap_or(""),
                    row.value.as_str(),
                ])
                .unwrap();
        }
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let again = extract_rows(&payload(2015, &text)).unwrap();
        assert_eq!(again, rows);
    }
}
