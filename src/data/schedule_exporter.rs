use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::config::config::MarkupConfig;
use crate::data::schedule_table::{ScheduleRow, ScheduleTable};
use crate::html::render_schedule;

/// One visible row as written to JSON
#[derive(Debug, Serialize)]
struct ExportedRow {
    group: Option<String>,
    main: bool,
    cells: Map<String, Value>,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

impl ExportFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "html" | "htm" => Ok(ExportFormat::Html),
            other => Err(anyhow!(
                "Unsupported export format '{}' (use .csv, .json or .html)",
                other
            )),
        }
    }
}

/// Writes the currently visible rows, in current order
pub struct ScheduleExporter;

impl ScheduleExporter {
    /// Header labels, unique per column. Unnamed columns are given their
    /// position; a repeated label gets `_<position>` appended.
    fn column_labels(table: &ScheduleTable, width: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        (0..width)
            .map(|idx| {
                let label = match table.header(idx) {
                    Some(h) if !h.label.is_empty() => h.label.clone(),
                    _ => format!("column_{}", idx),
                };
                if seen.insert(label.clone()) {
                    return label;
                }
                let renamed = format!("{}_{}", label, idx);
                seen.insert(renamed.clone());
                renamed
            })
            .collect()
    }

    fn visible_rows(table: &ScheduleTable) -> Vec<&ScheduleRow> {
        table
            .rows_in_order()
            .map(|(_, row)| row)
            .filter(|row| row.is_visible())
            .collect()
    }

    fn width(table: &ScheduleTable, rows: &[&ScheduleRow]) -> usize {
        rows.iter()
            .map(|r| r.cells().len())
            .max()
            .unwrap_or(0)
            .max(table.column_count())
    }

    pub fn to_csv(table: &ScheduleTable, path: &Path) -> Result<usize> {
        let rows = Self::visible_rows(table);
        let labels = Self::column_labels(table, Self::width(table, &rows));

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let mut header = vec!["group".to_string()];
        header.extend(labels.iter().cloned());
        wtr.write_record(&header)?;

        for row in &rows {
            let mut record = vec![row.group().unwrap_or("").to_string()];
            record.extend((0..labels.len()).map(|idx| {
                row.cell(idx)
                    .map(|c| c.text.trim().to_string())
                    .unwrap_or_default()
            }));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(rows.len())
    }

    pub fn to_json(table: &ScheduleTable, path: &Path) -> Result<usize> {
        let rows = Self::visible_rows(table);
        let labels = Self::column_labels(table, Self::width(table, &rows));

        let exported: Vec<ExportedRow> = rows
            .iter()
            .map(|row| {
                let cells = row
                    .cells()
                    .iter()
                    .zip(&labels)
                    .map(|(cell, label)| (label.clone(), Value::String(cell.text.trim().to_string())))
                    .collect();
                ExportedRow {
                    group: row.group().map(str::to_string),
                    main: row.is_main(),
                    cells,
                }
            })
            .collect();

        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &exported)?;
        Ok(exported.len())
    }

    pub fn to_html(table: &ScheduleTable, config: &MarkupConfig, path: &Path) -> Result<usize> {
        let html = render_schedule(table, config)?;
        std::fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(table.visible_row_count())
    }

    /// Export in the format implied by the file extension.
    /// Returns the number of visible rows written.
    pub fn export(table: &ScheduleTable, config: &MarkupConfig, path: &Path) -> Result<usize> {
        let count = match ExportFormat::from_path(path)? {
            ExportFormat::Csv => Self::to_csv(table, path)?,
            ExportFormat::Json => Self::to_json(table, path)?,
            ExportFormat::Html => Self::to_html(table, config, path)?,
        };

        info!(target: "export", "Exported {} rows to {}", count, path.display());
        Ok(count)
    }
}
