use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::record::RecordRow;
use crate::domain::table::TableConfig;

/// Rows per flush. Bounds writer memory on large in-memory exports and keeps
/// partial output on disk if a later chunk fails.
const CHUNK_ROWS: usize = 250;

/// Writes the degraded export: only the rows currently in memory, only the
/// fixed fallback column subset. Quoting follows the csv crate's RFC4180
/// behavior (fields with comma, quote or newline are quoted, quotes doubled).
/// Returns the number of data rows written.
pub fn write_fallback_csv(
    config: &TableConfig,
    rows: &[RecordRow],
    dest: &Path,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(dest)
        .with_context(|| format!("failed to create csv file: {}", dest.display()))?;

    let headers: Vec<&str> = config
        .export_columns
        .iter()
        .map(|key| {
            config
                .column(key)
                .map(|spec| spec.label)
                .unwrap_or(*key)
        })
        .collect();
    writer
        .write_record(&headers)
        .context("failed to write csv header")?;

    let mut written = 0_usize;
    for chunk in rows.chunks(CHUNK_ROWS) {
        for row in chunk {
            let record: Vec<&str> = config
                .export_columns
                .iter()
                .map(|key| row.fields.get(*key).map(String::as_str).unwrap_or(""))
                .collect();
            writer
                .write_record(&record)
                .context("failed to write csv row")?;
            written += 1;
        }
        writer.flush().context("failed to flush csv chunk")?;
    }

    writer.flush().context("failed to flush csv file")?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::columns::ColumnSpec;
    use crate::domain::record::record_id;
    use crate::domain::table::EndpointConfig;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_test_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("leaddesk-{prefix}-{nanos}"))
    }

    fn mapper(raw: &Value) -> RecordRow {
        let mut fields = BTreeMap::new();
        for key in ["name", "note"] {
            fields.insert(key.to_string(), crate::domain::record::field(raw, key));
        }
        RecordRow {
            id: record_id(raw),
            fields,
            raw: raw.clone(),
        }
    }

    fn config() -> TableConfig {
        TableConfig {
            entity: "widgets",
            title: "Widgets",
            endpoints: EndpointConfig::rest("/api/widgets"),
            columns: vec![
                ColumnSpec::new("name", "Name"),
                ColumnSpec::new("note", "Note"),
            ],
            filters: vec![],
            default_hidden: &[],
            export_columns: &["name", "note"],
            row_mapper: mapper,
            form_fields: &[],
            attachment_field: None,
            supports_validate: false,
            intake_form: false,
        }
    }

    #[test]
    fn tricky_fields_survive_a_csv_round_trip() {
        let temp_dir = unique_test_dir("csv-escape");
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let dest = temp_dir.join("out.csv");

        let config = config();
        let tricky = "said \"hi\", then\nleft";
        let rows = vec![mapper(&json!({"id": 1, "name": tricky, "note": "plain"}))];

        let written = write_fallback_csv(&config, &rows, &dest).expect("export should succeed");
        assert_eq!(written, 1);

        let mut reader = csv::Reader::from_path(&dest).expect("should reopen csv");
        let headers = reader.headers().expect("should read headers").clone();
        assert_eq!(headers, csv::StringRecord::from(vec!["Name", "Note"]));
        let record = reader
            .records()
            .next()
            .expect("one record expected")
            .expect("record should parse");
        assert_eq!(record.get(0), Some(tricky));
        assert_eq!(record.get(1), Some("plain"));

        fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
    }

    #[test]
    fn missing_fields_render_as_empty_cells() {
        let temp_dir = unique_test_dir("csv-missing");
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let dest = temp_dir.join("out.csv");

        let config = config();
        let rows = vec![mapper(&json!({"id": 2, "name": "solo"}))];
        write_fallback_csv(&config, &rows, &dest).expect("export should succeed");

        let contents = fs::read_to_string(&dest).expect("should read csv");
        assert!(contents.lines().nth(1).unwrap().ends_with(','));

        fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
    }
}
