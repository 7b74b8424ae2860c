use reedline::{Completer, Span, Suggestion};

use course_table::ScheduleTable;

pub const COMMANDS: &[&str] = &[
    "filter", "sort", "show", "groups", "key", "export", "logs", "help", "clear", "quit",
];

/// Completes shell commands and, after `sort`, column labels
pub struct ScheduleCompleter {
    columns: Vec<String>,
}

impl ScheduleCompleter {
    pub fn new(table: &ScheduleTable) -> Self {
        let columns = table
            .headers()
            .iter()
            .filter(|h| h.sortable)
            .map(|h| h.label.clone())
            .filter(|label| !label.is_empty())
            .collect();
        Self { columns }
    }

    fn suggestion(value: &str, description: &str, start: usize, end: usize) -> Suggestion {
        Suggestion {
            value: value.to_string(),
            description: Some(description.to_string()),
            extra: None,
            span: Span { start, end },
            style: None,
            append_whitespace: description == "command",
        }
    }
}

impl Completer for ScheduleCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];

        if let Some(partial) = input.strip_prefix("sort ") {
            let partial_lower = partial.to_lowercase();
            let start = pos - partial.len();
            return self
                .columns
                .iter()
                .filter(|c| c.to_lowercase().starts_with(&partial_lower))
                .map(|c| Self::suggestion(c, "column", start, pos))
                .collect();
        }

        if input.contains(' ') {
            return Vec::new();
        }

        COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(input))
            .map(|cmd| Self::suggestion(cmd, "command", 0, pos))
            .collect()
    }
}
