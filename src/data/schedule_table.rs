use serde::Serialize;
use std::fmt;

use crate::data::sort_state::SortDirection;

/// Stable handle to a row, independent of its current position in the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a body cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellKind {
    /// `<th scope="row">`, marks the row carrying the course name
    RowHeader,
    /// Any other `<th>`
    Header,
    /// `<td>`
    Data,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub kind: CellKind,
    pub text: String,
    pub attributes: Vec<(String, String)>,
}

impl TableCell {
    pub fn data(text: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Data,
            text: text.into(),
            attributes: Vec::new(),
        }
    }

    pub fn row_header(text: impl Into<String>) -> Self {
        Self {
            kind: CellKind::RowHeader,
            text: text.into(),
            attributes: vec![("scope".to_string(), "row".to_string())],
        }
    }

    pub fn with_kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<(String, String)>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A cell of the header row
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub sortable: bool,
    /// Semantic column name ("time", "day", ...) used for typed comparison
    pub name: Option<String>,
    pub attributes: Vec<(String, String)>,
    indicator: Option<SortDirection>,
}

impl HeaderCell {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sortable: false,
            name: None,
            attributes: Vec::new(),
            indicator: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<(String, String)>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Current sort marking shown on this header, if any
    pub fn indicator(&self) -> Option<SortDirection> {
        self.indicator
    }
}

/// A body row: cells plus the attributes that drive grouping
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    cells: Vec<TableCell>,
    group: Option<String>,
    main: bool,
    text: String,
    attributes: Vec<(String, String)>,
    visible: bool,
    tab_index: Option<i32>,
}

impl ScheduleRow {
    /// Create a row from its cells. The row counts as a main row when any
    /// cell is a row header, and its text is the cell texts joined by spaces.
    pub fn new(cells: Vec<TableCell>) -> Self {
        let main = cells.iter().any(|c| c.kind == CellKind::RowHeader);
        let text = cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            cells,
            group: None,
            main,
            text,
            attributes: Vec::new(),
            visible: true,
            tab_index: None,
        }
    }

    /// Convenience constructor for plain data rows
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        Self::new(values.iter().map(|v| TableCell::data(v.as_ref())).collect())
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_main(mut self, main: bool) -> Self {
        self.main = main;
        self
    }

    /// Override the full text content (markup may carry text outside cells)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<(String, String)>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&TableCell> {
        self.cells.get(index)
    }

    /// Group key; an empty key counts as no key
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tab_index(&self) -> Option<i32> {
        self.tab_index
    }
}

/// Read access to a row's value in a given column.
///
/// Sorting only needs this capability, so it can run against any row store.
pub trait ColumnValueSource {
    /// Trimmed text of the cell, or an empty string when the cell is missing
    fn column_value(&self, row: RowId, column: usize) -> String;
}

/// In-memory schedule: a header row and a body whose order can change
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    headers: Vec<HeaderCell>,
    rows: Vec<ScheduleRow>,
    /// Current document order of the body
    order: Vec<RowId>,
}

impl ScheduleTable {
    pub fn new(headers: Vec<HeaderCell>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Append a row at the end of the body
    pub fn add_row(&mut self, row: ScheduleRow) -> RowId {
        let id = RowId(self.rows.len());
        self.rows.push(row);
        self.order.push(id);
        id
    }

    pub fn headers(&self) -> &[HeaderCell] {
        &self.headers
    }

    pub fn header(&self, column: usize) -> Option<&HeaderCell> {
        self.headers.get(column)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Semantic name of a column, empty when the header is missing or unnamed
    pub fn header_name(&self, column: usize) -> &str {
        self.headers
            .get(column)
            .and_then(|h| h.name.as_deref())
            .unwrap_or("")
    }

    /// Find a column by index, label or semantic name (case-insensitive)
    pub fn resolve_column(&self, column: &str) -> Option<usize> {
        let column = column.trim();
        if let Ok(index) = column.parse::<usize>() {
            return (index < self.headers.len()).then_some(index);
        }

        self.headers.iter().position(|h| {
            h.label.trim().eq_ignore_ascii_case(column)
                || h.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(column))
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, id: RowId) -> Option<&ScheduleRow> {
        self.rows.get(id.0)
    }

    /// Row ids in current body order
    pub fn body_order(&self) -> &[RowId] {
        &self.order
    }

    /// Rows in current body order
    pub fn rows_in_order(&self) -> impl Iterator<Item = (RowId, &ScheduleRow)> {
        self.order.iter().map(move |&id| (id, &self.rows[id.0]))
    }

    pub fn visible_row_count(&self) -> usize {
        self.rows.iter().filter(|r| r.visible).count()
    }

    /// Row at a position in the current body order
    pub fn row_at(&self, position: usize) -> Option<RowId> {
        self.order.get(position).copied()
    }

    pub fn set_visible(&mut self, id: RowId, visible: bool) {
        if let Some(row) = self.rows.get_mut(id.0) {
            row.visible = visible;
        }
    }

    pub fn set_tab_index(&mut self, id: RowId, tab_index: i32) {
        if let Some(row) = self.rows.get_mut(id.0) {
            row.tab_index = Some(tab_index);
        }
    }

    /// Move each listed row to the end of the body, in list order.
    ///
    /// Rows not listed keep their relative order ahead of the listed ones.
    /// A row listed twice ends up at its last listed position.
    pub fn append_to_body(&mut self, ids: &[RowId]) {
        let mut last_seen = vec![None; self.rows.len()];
        for (pos, id) in ids.iter().enumerate() {
            if let Some(slot) = last_seen.get_mut(id.0) {
                *slot = Some(pos);
            }
        }

        let mut new_order: Vec<RowId> = self
            .order
            .iter()
            .copied()
            .filter(|id| last_seen[id.0].is_none())
            .collect();
        new_order.extend(
            ids.iter()
                .enumerate()
                .filter(|(pos, id)| last_seen.get(id.0).copied().flatten() == Some(*pos))
                .map(|(_, id)| *id),
        );

        self.order = new_order;
    }

    /// Mark one header as sorted and clear the marking on every other header
    pub fn set_sort_indicator(&mut self, active: Option<(usize, SortDirection)>) {
        for (idx, header) in self.headers.iter_mut().enumerate() {
            header.indicator = match active {
                Some((column, direction)) if column == idx => Some(direction),
                _ => None,
            };
        }
    }
}

impl ColumnValueSource for ScheduleTable {
    fn column_value(&self, row: RowId, column: usize) -> String {
        self.row(row)
            .and_then(|r| r.cell(column))
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_rows(n: usize) -> ScheduleTable {
        let mut table = ScheduleTable::new(vec![HeaderCell::new("Course")]);
        for i in 0..n {
            table.add_row(ScheduleRow::from_values(&[format!("row {i}")]));
        }
        table
    }

    #[test]
    fn test_append_moves_rows_to_end() {
        let mut table = table_with_rows(4);
        table.append_to_body(&[RowId(1), RowId(0)]);
        assert_eq!(
            table.body_order(),
            &[RowId(2), RowId(3), RowId(1), RowId(0)]
        );
    }

    #[test]
    fn test_append_duplicate_keeps_last_position() {
        let mut table = table_with_rows(3);
        table.append_to_body(&[RowId(0), RowId(2), RowId(0)]);
        assert_eq!(table.body_order(), &[RowId(1), RowId(2), RowId(0)]);
    }

    #[test]
    fn test_column_value_trims_and_defaults() {
        let mut table = ScheduleTable::new(vec![HeaderCell::new("A"), HeaderCell::new("B")]);
        let id = table.add_row(ScheduleRow::from_values(&["  9:00 AM \n"]));
        assert_eq!(table.column_value(id, 0), "9:00 AM");
        assert_eq!(table.column_value(id, 1), "");
        assert_eq!(table.column_value(RowId(42), 0), "");
    }

    #[test]
    fn test_empty_group_key_is_no_group() {
        let row = ScheduleRow::from_values(&["x"]).with_group("");
        assert_eq!(row.group(), None);
    }

    #[test]
    fn test_resolve_column() {
        let table = ScheduleTable::new(vec![
            HeaderCell::new("Course"),
            HeaderCell::new("Meeting Time").sortable().with_name("time"),
        ]);
        assert_eq!(table.resolve_column("1"), Some(1));
        assert_eq!(table.resolve_column("meeting time"), Some(1));
        assert_eq!(table.resolve_column("TIME"), Some(1));
        assert_eq!(table.resolve_column("course"), Some(0));
        assert_eq!(table.resolve_column("7"), None);
        assert_eq!(table.resolve_column("room"), None);
    }

    #[test]
    fn test_single_sort_indicator() {
        let mut table = ScheduleTable::new(vec![HeaderCell::new("A"), HeaderCell::new("B")]);
        table.set_sort_indicator(Some((0, SortDirection::Ascending)));
        table.set_sort_indicator(Some((1, SortDirection::Descending)));
        assert_eq!(table.headers()[0].indicator(), None);
        assert_eq!(
            table.headers()[1].indicator(),
            Some(SortDirection::Descending)
        );
    }
}
