use anyhow::Result;
use std::fmt::Write;

use crate::config::config::MarkupConfig;
use crate::data::schedule_table::{CellKind, HeaderCell, ScheduleRow, ScheduleTable};
use crate::data::sort_state::SortDirection;

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn write_attributes(out: &mut String, attributes: &[(String, String)]) -> std::fmt::Result {
    for (name, value) in attributes {
        write!(out, " {}=\"{}\"", name, escape_attribute(value))?;
    }
    Ok(())
}

/// Header classes with any stale sort marking replaced by the current one
fn header_class(header: &HeaderCell) -> Option<String> {
    let mut classes: Vec<&str> = header
        .attributes
        .iter()
        .filter(|(name, _)| name == "class")
        .flat_map(|(_, value)| value.split_whitespace())
        .filter(|c| {
            *c != SortDirection::Ascending.css_class() && *c != SortDirection::Descending.css_class()
        })
        .collect();
    if let Some(direction) = header.indicator() {
        classes.push(direction.css_class());
    }
    (!classes.is_empty()).then(|| classes.join(" "))
}

fn write_header(out: &mut String, header: &HeaderCell, config: &MarkupConfig) -> std::fmt::Result {
    out.push_str("        <th");
    if header.sortable {
        write!(out, " {}", config.sortable_attribute)?;
    }
    if let Some(name) = &header.name {
        write!(out, " {}=\"{}\"", config.name_attribute, escape_attribute(name))?;
    }
    let others: Vec<(String, String)> = header
        .attributes
        .iter()
        .filter(|(name, _)| name != "class")
        .cloned()
        .collect();
    write_attributes(out, &others)?;
    if let Some(class) = header_class(header) {
        write!(out, " class=\"{}\"", escape_attribute(&class))?;
    }
    writeln!(out, ">{}</th>", escape_text(&header.label))
}

fn write_row(out: &mut String, row: &ScheduleRow, config: &MarkupConfig) -> std::fmt::Result {
    out.push_str("      <tr");
    if let Some(group) = row.group() {
        write!(out, " {}=\"{}\"", config.group_attribute, escape_attribute(group))?;
    }
    write_attributes(out, row.attributes())?;
    if let Some(tab_index) = row.tab_index() {
        write!(out, " tabindex=\"{}\"", tab_index)?;
    }
    if !row.is_visible() {
        out.push_str(" style=\"display: none\"");
    }
    out.push_str(">\n");

    for cell in row.cells() {
        let tag = match cell.kind {
            CellKind::RowHeader | CellKind::Header => "th",
            CellKind::Data => "td",
        };
        write!(out, "        <{}", tag)?;
        write_attributes(out, &cell.attributes)?;
        writeln!(out, ">{}</{}>", escape_text(cell.text.trim()), tag)?;
    }

    out.push_str("      </tr>\n");
    Ok(())
}

/// Render the table as a standalone HTML document in current body order.
///
/// Cells are written from their text content, so inline markup inside a
/// cell (links, `<br>`, spans) comes out as plain escaped text.
pub fn render_schedule(table: &ScheduleTable, config: &MarkupConfig) -> Result<String> {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n");
    out.push_str("  <title>Schedule</title>\n</head>\n<body>\n");

    writeln!(out, "  <table id=\"{}\">", escape_attribute(&config.table_id))?;
    out.push_str("    <thead>\n      <tr>\n");
    for header in table.headers() {
        write_header(&mut out, header, config)?;
    }
    out.push_str("      </tr>\n    </thead>\n");

    writeln!(out, "    <tbody id=\"{}\">", escape_attribute(&config.body_id))?;
    for (_, row) in table.rows_in_order() {
        write_row(&mut out, row, config)?;
    }
    out.push_str("    </tbody>\n  </table>\n</body>\n</html>\n");

    Ok(out)
}
