// Test loading schedule markup and writing it back out

use course_table::config::config::MarkupConfig;
use course_table::html::{load_schedule, load_schedule_file, render_schedule};
use course_table::{CellKind, ScheduleView, SortDirection, SortEngine};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/schedule.html")
}

fn load_fixture() -> ScheduleView {
    let table = load_schedule_file(fixture_path(), &MarkupConfig::default()).unwrap();
    ScheduleView::new(table, SortEngine::default())
}

fn group_order(view: &ScheduleView) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (_, row) in view.table().rows_in_order() {
        if !row.is_visible() {
            continue;
        }
        let key = row.group().unwrap_or("-").to_string();
        if keys.last() != Some(&key) {
            keys.push(key);
        }
    }
    keys
}

fn click(view: &mut ScheduleView, column: &str) -> Option<SortDirection> {
    let index = view.table().resolve_column(column).unwrap();
    view.on_header_click(index)
}

#[test]
fn test_headers_from_thead() {
    let view = load_fixture();
    let headers = view.table().headers();

    let labels: Vec<&str> = headers.iter().map(|h| h.label.as_str()).collect();
    assert_eq!(labels, vec!["Course", "Day", "Time", "Room", "Instructor"]);

    let sortable: Vec<bool> = headers.iter().map(|h| h.sortable).collect();
    assert_eq!(sortable, vec![true, true, true, false, true]);

    assert_eq!(view.table().header_name(1), "day");
    assert_eq!(view.table().header_name(2), "time");
    assert_eq!(view.table().header_name(4), "");
}

#[test]
fn test_rows_groups_and_main_rows() {
    let view = load_fixture();
    let table = view.table();
    let index = view.index();

    assert_eq!(table.row_count(), 7);
    assert_eq!(index.group_count(), 4);
    assert_eq!(index.ungrouped().len(), 1);

    for group in index.groups() {
        let main = group.main_row().unwrap();
        let row = table.row(main).unwrap();
        assert!(row.is_main());
        assert_eq!(row.cells()[0].kind, CellKind::RowHeader);
    }

    let footnote = table.row(index.ungrouped()[0]).unwrap();
    assert_eq!(footnote.cells().len(), 1);
    assert_eq!(footnote.cells()[0].text, "Schedule subject to change & updates");
}

#[test]
fn test_sort_fixture_by_each_column() {
    let mut view = load_fixture();

    assert_eq!(click(&mut view, "time"), Some(SortDirection::Ascending));
    assert_eq!(group_order(&view), vec!["mat140", "eng210", "cyb325", "cs499", "-"]);

    assert_eq!(click(&mut view, "day"), Some(SortDirection::Ascending));
    assert_eq!(group_order(&view), vec!["eng210", "mat140", "cyb325", "cs499", "-"]);

    click(&mut view, "course");
    assert_eq!(group_order(&view), vec!["cs499", "cyb325", "eng210", "mat140", "-"]);

    click(&mut view, "instructor");
    assert_eq!(group_order(&view), vec!["eng210", "mat140", "cs499", "cyb325", "-"]);

    assert_eq!(click(&mut view, "room"), None);
}

#[test]
fn test_filter_fixture() {
    let mut view = load_fixture();

    let summary = view.on_filter_input("Hall");
    assert_eq!(group_order(&view), vec!["cyb325", "mat140", "cs499"]);
    assert_eq!(summary.visible_groups, 3);
    assert_eq!(summary.visible_rows, 5);

    // A lab row matches, so its whole course shows
    view.on_filter_input("reyes");
    assert_eq!(group_order(&view), vec!["cyb325"]);

    view.on_filter_input("subject to change");
    assert_eq!(group_order(&view), vec!["-"]);
}

#[test]
fn test_render_reflects_view_state() {
    let mut view = load_fixture();
    click(&mut view, "time");
    view.on_filter_input("hall");

    let html = render_schedule(view.table(), &MarkupConfig::default()).unwrap();

    assert!(html.contains(r#"<table id="schedule">"#));
    assert!(html.contains(r#"<tbody id="schedule-body">"#));
    assert!(html.contains(r#"<th data-sortable data-name="time" class="sort-asc">Time</th>"#));
    assert!(html.contains(r#"<th data-sortable data-name="day">Day</th>"#));
    assert!(html.contains("<th>Room</th>"));
    assert_eq!(html.matches(r#"tabindex="0""#).count(), 7);
    // ENG 210 and the footnote are filtered out
    assert_eq!(html.matches(r#"style="display: none""#).count(), 2);
    assert!(html.contains("Schedule subject to change &amp; updates"));

    let mat = html.find("MAT 140").unwrap();
    let cyb = html.find("CYB 325").unwrap();
    let cs = html.find("CS 499").unwrap();
    assert!(mat < cyb && cyb < cs);
}

#[test]
fn test_rendered_markup_loads_again() {
    let mut view = load_fixture();
    click(&mut view, "day");
    let html = render_schedule(view.table(), &MarkupConfig::default()).unwrap();

    let reloaded = ScheduleView::new(
        load_schedule(&html, &MarkupConfig::default()).unwrap(),
        SortEngine::default(),
    );
    assert_eq!(group_order(&reloaded), group_order(&view));
    assert_eq!(reloaded.table().header(1).unwrap().indicator(), None);
    assert!(reloaded.table().header(1).unwrap().sortable);
}

#[test]
fn test_falls_back_to_first_table_and_tbody() {
    let markup = r#"
        <table>
          <thead><tr><th data-sortable data-name="time">When</th></tr></thead>
          <tbody>
            <tr data-group="x"><th scope="row">2:00 PM</th></tr>
            <tr data-group="y"><th scope="row">8:00 AM</th></tr>
          </tbody>
        </table>"#;

    let table = load_schedule(markup, &MarkupConfig::default()).unwrap();
    assert_eq!(table.row_count(), 2);

    let mut view = ScheduleView::new(table, SortEngine::default());
    view.on_header_click(0);
    assert_eq!(group_order(&view), vec!["y", "x"]);
}

#[test]
fn test_custom_attribute_names() {
    let config = MarkupConfig {
        table_id: "timetable".to_string(),
        group_attribute: "data-course".to_string(),
        ..MarkupConfig::default()
    };
    let markup = r#"
        <table id="other"><tbody><tr><td>decoy</td></tr></tbody></table>
        <table id="timetable">
          <thead><tr><th data-sortable>Course</th></tr></thead>
          <tbody>
            <tr data-course="a"><th scope="row">Art</th></tr>
            <tr data-course="a"><td>Studio</td></tr>
          </tbody>
        </table>"#;

    let table = load_schedule(markup, &config).unwrap();
    let view = ScheduleView::new(table, SortEngine::default());
    assert_eq!(view.table().row_count(), 2);
    assert_eq!(view.index().group("a").unwrap().rows().len(), 2);
}

#[test]
fn test_missing_table_is_an_error() {
    let err = load_schedule("<p>No schedule yet</p>", &MarkupConfig::default()).unwrap_err();
    assert!(err.to_string().contains("No <table>"));
}

#[test]
fn test_missing_file_is_an_error() {
    let result = load_schedule_file("does/not/exist.html", &MarkupConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_inline_cell_markup_is_written_as_text() {
    let markup = r#"
        <table id="schedule">
          <thead><tr><th data-sortable>Course</th><th>Notes</th></tr></thead>
          <tbody id="schedule-body">
            <tr data-group="a">
              <th scope="row"><a href="/art">Art</a> 101</th>
              <td>Bring<br><span class="warn">sketchbook</span></td>
            </tr>
          </tbody>
        </table>"#;

    let table = load_schedule(markup, &MarkupConfig::default()).unwrap();
    let html = render_schedule(&table, &MarkupConfig::default()).unwrap();

    assert!(html.contains(r#"<th scope="row">Art 101</th>"#));
    assert!(html.contains("<td>Bringsketchbook</td>"));
    assert!(!html.contains("<a href"));
    assert!(!html.contains("<span"));
}

#[test]
fn test_special_characters_survive_render_and_reload() {
    let course = "Ciberseguridad & Redes: Año 2 «Défense» 網絡 <core>";
    let note = "A&B && C &amp; D; \"quoted\" 'single' café";
    let markup = format!(
        r#"<table id="schedule">
          <thead><tr><th data-sortable>Cours &amp; salle</th><th>Notes</th></tr></thead>
          <tbody id="schedule-body">
            <tr data-group="sécu&amp;1" title="Salle «B» &amp; co">
              <th scope="row">{}</th><td>{}</td>
            </tr>
          </tbody>
        </table>"#,
        course.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;"),
        note.replace('&', "&amp;"),
    );

    let first = load_schedule(&markup, &MarkupConfig::default()).unwrap();
    let row = first.row(first.body_order()[0]).unwrap();
    assert_eq!(row.cells()[0].text, course);
    assert_eq!(row.cells()[1].text, note);

    let html = render_schedule(&first, &MarkupConfig::default()).unwrap();
    let second = load_schedule(&html, &MarkupConfig::default()).unwrap();

    assert_eq!(second.headers()[0].label, "Cours & salle");
    let row = second.row(second.body_order()[0]).unwrap();
    assert_eq!(row.group(), Some("sécu&1"));
    assert_eq!(row.cells()[0].text, course);
    assert_eq!(row.cells()[1].text, note);
    assert!(row
        .attributes()
        .contains(&("title".to_string(), "Salle «B» & co".to_string())));

    let view = ScheduleView::new(second, SortEngine::default());
    assert_eq!(view.index().group("sécu&1").unwrap().rows().len(), 1);
}
