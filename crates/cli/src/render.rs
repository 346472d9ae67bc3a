//! Terminal rendering of relation rows.

use std::io::Write;

use serde::Serialize;

use labledger_infra::{StoreError, Tabular};
use labledger_infra::store::to_csv_string;

/// Rows as an aligned text table, or as a JSON array when `json` is set.
pub fn rows<R, W>(out: &mut W, relation: &str, rows: &[R], json: bool) -> anyhow::Result<()>
where
    R: Tabular + Serialize,
    W: Write,
{
    if json {
        serde_json::to_writer_pretty(&mut *out, rows)?;
        writeln!(out)?;
        return Ok(());
    }
    if rows.is_empty() {
        writeln!(out, "(no {relation} rows)")?;
        return Ok(());
    }
    let text = to_csv_string(relation, rows)?;
    out.write_all(table(&text)?.as_bytes())?;
    Ok(())
}

/// Align CSV text (header row first) into padded columns.
pub fn table(csv_text: &str) -> Result<String, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(csv_text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| StoreError::Export {
            relation: "table".to_string(),
            message: source.to_string(),
        })?;
        records.push(record.iter().map(str::to_string).collect());
    }

    let columns = records.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for record in &records {
        for (i, cell) in record.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut rendered = String::new();
    for (line, record) in records.iter().enumerate() {
        let cells: Vec<String> = record
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect();
        rendered.push_str(cells.join("  ").trim_end());
        rendered.push('\n');
        if line == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            rendered.push_str(&rule.join("  "));
            rendered.push('\n');
        }
    }
    Ok(rendered)
}
