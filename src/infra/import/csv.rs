use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::dataset::TabularData;
use crate::domain::entities::record::Record;

const UTF8_BOM: char = '\u{feff}';

/// Emitted while parsing, driven by the number of records read so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub rows_parsed: usize,
    pub done: bool,
}

pub fn parse_csv(text: &str) -> Result<TabularData> {
    parse_csv_with_progress(text, 0, |_| {})
}

/// Parses `text`, reporting progress every `chunk_rows` records (never when
/// `chunk_rows` is zero) and once more when the input is exhausted.
///
/// Short rows keep their missing trailing cells absent; header names are
/// trimmed and stripped of a leading byte order mark. Repeated header names
/// are returned as is and collapse into one cell per record, so callers that
/// need a lossless table must reject them.
pub fn parse_csv_with_progress<F>(
    text: &str,
    chunk_rows: usize,
    mut on_progress: F,
) -> Result<TabularData>
where
    F: FnMut(LoadProgress),
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read csv header row")?
        .iter()
        .map(clean_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to parse csv record {}", rows.len() + 1))?;
        let values: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(Record::from_row(&headers, &values));

        if chunk_rows > 0 && rows.len() % chunk_rows == 0 {
            on_progress(LoadProgress {
                rows_parsed: rows.len(),
                done: false,
            });
        }
    }

    on_progress(LoadProgress {
        rows_parsed: rows.len(),
        done: true,
    });

    Ok(TabularData { headers, rows })
}

fn clean_header(name: &str) -> String {
    name.trim_start_matches(UTF8_BOM).trim().to_string()
}

/// Header row in `headers` order followed by one line per record; absent
/// cells are written as empty fields.
pub fn serialize_csv(headers: &[String], rows: &[Record]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("failed to write csv header row")?;
    for (row_idx, row) in rows.iter().enumerate() {
        writer
            .write_record(row.to_row(headers))
            .with_context(|| format!("failed to write csv row {row_idx}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv writer: {}", err.error()))?;
    String::from_utf8(bytes).context("serialized csv is not valid utf-8")
}

pub fn read_csv_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to open csv: {}", path.display()))
}

pub fn write_csv_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write csv: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let data = parse_csv("name,city\nAlice,Paris\nBob,Tokyo\n").expect("csv should parse");

        assert_eq!(data.headers, ["name", "city"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0].value("city"), "Paris");
        assert_eq!(data.rows[1].value("name"), "Bob");
    }

    #[test]
    fn strips_bom_and_whitespace_from_headers() {
        let data = parse_csv("\u{feff}id , title\n1,A\n").expect("csv should parse");

        assert_eq!(data.headers, ["id", "title"]);
        assert_eq!(data.rows[0].value("id"), "1");
    }

    #[test]
    fn repeated_header_names_are_kept_in_header_list() {
        let data = parse_csv("a,a,b\n1,2,3\n").expect("csv should parse");

        assert_eq!(data.headers, ["a", "a", "b"]);
        assert_eq!(data.rows[0].len(), 2, "repeated names share one cell");
    }

    #[test]
    fn short_rows_leave_cells_absent() {
        let data = parse_csv("a,b,c\n1\n").expect("csv should parse");

        assert_eq!(data.rows[0].get("a"), Some("1"));
        assert_eq!(data.rows[0].get("c"), None);
    }

    #[test]
    fn quoted_fields_survive_serialization() {
        let headers = vec!["title".to_string(), "note".to_string()];
        let rows = vec![
            Record::from_pairs([("title", "a, b"), ("note", "say \"hi\"")]),
            Record::from_pairs([("title", "line\nbreak")]),
        ];

        let text = serialize_csv(&headers, &rows).expect("csv should serialize");
        let parsed = parse_csv(&text).expect("csv should parse");

        assert_eq!(parsed.headers, headers);
        assert_eq!(parsed.rows[0], rows[0]);
        assert_eq!(parsed.rows[1].value("title"), "line\nbreak");
        assert_eq!(parsed.rows[1].get("note"), Some(""));
    }

    #[test]
    fn serialize_uses_header_order() {
        let headers = vec!["b".to_string(), "a".to_string()];
        let rows = vec![Record::from_pairs([("a", "1"), ("b", "2")])];

        let text = serialize_csv(&headers, &rows).expect("csv should serialize");

        assert_eq!(text, "b,a\n2,1\n");
    }

    #[test]
    fn progress_follows_parsed_rows() {
        let mut text = String::from("n\n");
        for n in 0..5 {
            text.push_str(&format!("{n}\n"));
        }
        let mut events = Vec::new();

        parse_csv_with_progress(&text, 2, |progress| events.push(progress))
            .expect("csv should parse");

        let counts: Vec<(usize, bool)> = events
            .iter()
            .map(|event| (event.rows_parsed, event.done))
            .collect();
        assert_eq!(counts, [(2, false), (4, false), (5, true)]);
    }

    #[test]
    fn empty_input_has_no_headers() {
        let data = parse_csv("").expect("empty csv should parse");

        assert!(data.headers.is_empty());
        assert!(data.rows.is_empty());
    }
}
