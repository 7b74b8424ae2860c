use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use course_table::config::config::DisplayConfig;
use course_table::ScheduleView;

fn new_table(display: &DisplayConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if !display.use_color {
        table.force_no_tty();
    }
    table
}

/// "N of M rows visible (g of G groups)"
pub fn status_line(view: &ScheduleView) -> String {
    let summary = view.filter_summary();
    format!(
        "{} of {} rows visible ({} of {} groups)",
        summary.visible_rows, summary.total_rows, summary.visible_groups, summary.total_groups
    )
}

pub fn display_schedule(view: &ScheduleView, display: &DisplayConfig) {
    let schedule = view.table();
    let mut table = new_table(display);

    let mut headers = vec![Cell::new("#").add_attribute(Attribute::Bold)];
    if display.show_group_column {
        headers.push(Cell::new("Group").add_attribute(Attribute::Bold));
    }
    for header in schedule.headers() {
        let label = match header.indicator() {
            Some(direction) => format!("{} {}", header.label, direction.arrow()),
            None if header.sortable => format!("{} ·", header.label),
            None => header.label.clone(),
        };
        headers.push(Cell::new(label).add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    let mut shown = 0;
    for (position, (_, row)) in schedule.rows_in_order().enumerate() {
        if !row.is_visible() && !display.show_hidden_rows {
            continue;
        }
        shown += 1;

        let style = |cell: Cell| -> Cell {
            let cell = if row.is_main() {
                cell.add_attribute(Attribute::Bold)
            } else {
                cell
            };
            if row.is_visible() {
                cell
            } else {
                cell.add_attribute(Attribute::Dim)
            }
        };

        let mut cells = vec![style(Cell::new(position))];
        if display.show_group_column {
            cells.push(style(Cell::new(row.group().unwrap_or("-"))));
        }
        for cell in row.cells() {
            cells.push(style(Cell::new(cell.text.trim())));
        }
        table.add_row(cells);
    }

    if shown == 0 {
        let message = "No rows match the current filter.";
        if display.use_color {
            println!("{}", message.yellow());
        } else {
            println!("{}", message);
        }
    } else {
        println!("{table}");
    }

    let status = status_line(view);
    if display.use_color {
        println!("\n{}", status.green());
    } else {
        println!("\n{}", status);
    }
}

/// One line per group: key, member count, main row and visibility
pub fn display_groups(view: &ScheduleView, display: &DisplayConfig) {
    let schedule = view.table();
    let mut table = new_table(display);
    table.set_header(vec![
        Cell::new("Group").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("Main row").add_attribute(Attribute::Bold),
        Cell::new("Visible").add_attribute(Attribute::Bold),
    ]);

    for group in view.index().groups() {
        let main = group
            .main_row()
            .and_then(|id| schedule.row(id))
            .and_then(|row| row.cells().first())
            .map(|cell| cell.text.trim().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        let visible = group
            .rows()
            .first()
            .and_then(|&id| schedule.row(id))
            .is_some_and(|r| r.is_visible());

        table.add_row(vec![
            Cell::new(group.key()),
            Cell::new(group.rows().len()),
            Cell::new(main),
            Cell::new(if visible { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    println!(
        "{} ungrouped rows",
        view.index().ungrouped().len()
    );
}
