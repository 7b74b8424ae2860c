use anyhow::{anyhow, Context, Result};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::path::Path;
use tracing::{info, warn};

use crate::config::config::MarkupConfig;
use crate::data::schedule_table::{CellKind, HeaderCell, ScheduleRow, ScheduleTable, TableCell};

/// Attributes regenerated on output and therefore not carried over
const REGENERATED_ROW_ATTRIBUTES: &[&str] = &["style", "tabindex"];

fn element_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    element_name(handle).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

fn attribute(handle: &Handle, attr_name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr_name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn attributes_except(handle: &Handle, skip: &[&str]) -> Vec<(String, String)> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .filter(|a| !skip.contains(&&*a.name.local))
            .map(|a| (a.name.local.to_string(), a.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Concatenated text of every descendant text node
fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    collect_text(handle, &mut text);
    text
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// First descendant (depth-first, document order) matching `pred`
fn find_first<F>(handle: &Handle, pred: &F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    for child in handle.children.borrow().iter() {
        if pred(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, pred) {
            return Some(found);
        }
    }
    None
}

/// All `<tr>` below `handle`, without looking inside a row once found
fn collect_rows(handle: &Handle, out: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        if is_element(child, "tr") {
            out.push(child.clone());
        } else {
            collect_rows(child, out);
        }
    }
}

fn element_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|c| element_name(c).is_some())
        .cloned()
        .collect()
}

fn is_row_header(handle: &Handle) -> bool {
    is_element(handle, "th") && attribute(handle, "scope").as_deref() == Some("row")
}

fn with_id<'a>(tag: &'a str, id: &'a str) -> impl Fn(&Handle) -> bool + 'a {
    move |h| is_element(h, tag) && attribute(h, "id").as_deref() == Some(id)
}

fn read_headers(table: &Handle, config: &MarkupConfig) -> Vec<HeaderCell> {
    let header_row = find_first(table, &|h: &Handle| is_element(h, "thead"))
        .and_then(|thead| find_first(&thead, &|h: &Handle| is_element(h, "tr")));

    let Some(header_row) = header_row else {
        warn!(target: "html", "Table has no <thead> row, no column can be sorted");
        return Vec::new();
    };

    let skip = [
        config.sortable_attribute.as_str(),
        config.name_attribute.as_str(),
    ];

    element_children(&header_row)
        .iter()
        .map(|cell| {
            let mut header = HeaderCell::new(text_content(cell).trim())
                .with_attributes(attributes_except(cell, &skip));
            if attribute(cell, &config.sortable_attribute).is_some() {
                header = header.sortable();
            }
            if let Some(name) = attribute(cell, &config.name_attribute).filter(|n| !n.is_empty()) {
                header = header.with_name(name);
            }
            header
        })
        .collect()
}

fn read_row(row: &Handle, config: &MarkupConfig) -> ScheduleRow {
    let cells = element_children(row)
        .iter()
        .filter(|c| is_element(c, "th") || is_element(c, "td"))
        .map(|cell| {
            let kind = if is_row_header(cell) {
                CellKind::RowHeader
            } else if is_element(cell, "th") {
                CellKind::Header
            } else {
                CellKind::Data
            };
            TableCell::data(text_content(cell))
                .with_kind(kind)
                .with_attributes(attributes_except(cell, &[]))
        })
        .collect();

    let mut skip: Vec<&str> = REGENERATED_ROW_ATTRIBUTES.to_vec();
    skip.push(config.group_attribute.as_str());

    let mut schedule_row = ScheduleRow::new(cells)
        .with_main(find_first(row, &is_row_header).is_some())
        .with_text(text_content(row))
        .with_attributes(attributes_except(row, &skip));
    if let Some(group) = attribute(row, &config.group_attribute) {
        schedule_row = schedule_row.with_group(group);
    }
    schedule_row
}

/// Parse schedule markup into a table model.
///
/// Looks up the table and body by id and falls back to the first `<table>`
/// and its first `<tbody>`. Fails only when there is no table at all.
pub fn load_schedule(markup: &str, config: &MarkupConfig) -> Result<ScheduleTable> {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    let document = &dom.document;

    let table = match find_first(document, &with_id("table", &config.table_id)) {
        Some(table) => table,
        None => {
            let table = find_first(document, &|h: &Handle| is_element(h, "table"))
                .ok_or_else(|| anyhow!("No <table> element found in markup"))?;
            warn!(
                target: "html",
                "No table with id '{}', using the first table", config.table_id
            );
            table
        }
    };

    let body = find_first(document, &with_id("tbody", &config.body_id))
        .or_else(|| {
            warn!(
                target: "html",
                "No tbody with id '{}', using the first tbody of the table", config.body_id
            );
            find_first(&table, &|h: &Handle| is_element(h, "tbody"))
        });

    let mut schedule = ScheduleTable::new(read_headers(&table, config));

    let mut rows = Vec::new();
    match body {
        Some(body) => collect_rows(&body, &mut rows),
        None => {
            for child in element_children(&table) {
                if !is_element(&child, "thead") {
                    collect_rows(&child, &mut rows);
                }
            }
        }
    }

    for row in &rows {
        schedule.add_row(read_row(row, config));
    }

    info!(
        target: "html",
        "Loaded schedule: {} columns, {} rows",
        schedule.column_count(),
        schedule.row_count()
    );

    Ok(schedule)
}

/// Read and parse a schedule file
pub fn load_schedule_file(path: impl AsRef<Path>, config: &MarkupConfig) -> Result<ScheduleTable> {
    let path = path.as_ref();
    let markup = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule file {}", path.display()))?;
    load_schedule(&markup, config)
        .with_context(|| format!("Failed to load schedule from {}", path.display()))
}
