use anyhow::{anyhow, bail, Result};
use crossterm::style::Stylize;
use std::path::PathBuf;

use course_table::config::config::Config;
use course_table::data::schedule_exporter::ScheduleExporter;
use course_table::utils::logging::LogRingBuffer;
use course_table::{RowKey, RowKeyOutcome, ScheduleView};

use crate::table_display::{display_groups, display_schedule, status_line};

const DEFAULT_LOG_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Filter(String),
    Sort(String),
    Show,
    Groups,
    Key { position: usize, key: String },
    Export(PathBuf),
    Logs(usize),
    ClearLogs,
    Help,
    Clear,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_start();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest),
            None => (line.trim_end(), ""),
        };

        match command.to_lowercase().as_str() {
            // The query is kept as typed, spaces included
            "filter" | "f" => Ok(ShellCommand::Filter(rest.to_string())),
            "sort" | "s" => {
                let column = rest.trim();
                if column.is_empty() {
                    bail!("Usage: sort <column index|label|name>");
                }
                Ok(ShellCommand::Sort(column.to_string()))
            }
            "show" | "ls" => Ok(ShellCommand::Show),
            "groups" => Ok(ShellCommand::Groups),
            "key" => {
                let mut parts = rest.split_whitespace();
                let position = parts
                    .next()
                    .and_then(|p| p.parse::<usize>().ok())
                    .ok_or_else(|| anyhow!("Usage: key <row #> <enter|space>"))?;
                let key = parts
                    .next()
                    .ok_or_else(|| anyhow!("Usage: key <row #> <enter|space>"))?;
                Ok(ShellCommand::Key {
                    position,
                    key: key.to_string(),
                })
            }
            "export" => {
                let path = rest.trim();
                if path.is_empty() {
                    bail!("Usage: export <file.html|file.csv|file.json>");
                }
                Ok(ShellCommand::Export(PathBuf::from(path)))
            }
            "logs" => {
                let count = match rest.trim() {
                    "clear" => return Ok(ShellCommand::ClearLogs),
                    "" => DEFAULT_LOG_LINES,
                    n => n
                        .parse()
                        .map_err(|_| anyhow!("Usage: logs [number of lines|clear]"))?,
                };
                Ok(ShellCommand::Logs(count))
            }
            "help" | "?" => Ok(ShellCommand::Help),
            "clear" => Ok(ShellCommand::Clear),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(anyhow!("Unknown command '{}', type 'help'", other)),
        }
    }
}

pub enum Flow {
    Continue,
    Quit,
}

/// Interactive session over one schedule
pub struct Session {
    pub view: ScheduleView,
    pub config: Config,
    pub log_buffer: Option<LogRingBuffer>,
}

impl Session {
    fn success(&self, message: &str) {
        if self.config.display.use_color {
            println!("{}", message.green());
        } else {
            println!("{}", message);
        }
    }

    pub fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Filter(text) => {
                self.view.on_filter_input(&text);
                display_schedule(&self.view, &self.config.display);
            }
            ShellCommand::Sort(column) => {
                let index = self
                    .view
                    .table()
                    .resolve_column(&column)
                    .ok_or_else(|| anyhow!("No column '{}'", column))?;
                match self.view.on_header_click(index) {
                    Some(_) => display_schedule(&self.view, &self.config.display),
                    None => bail!("Column '{}' is not sortable", column),
                }
            }
            ShellCommand::Show => display_schedule(&self.view, &self.config.display),
            ShellCommand::Groups => display_groups(&self.view, &self.config.display),
            ShellCommand::Key { position, key } => {
                let row = self
                    .view
                    .table()
                    .row_at(position)
                    .ok_or_else(|| anyhow!("No row at position {}", position))?;
                match self.view.on_row_key(row, RowKey::parse(&key)) {
                    RowKeyOutcome::Reserved => println!("Row {} activated (no action)", position),
                    RowKeyOutcome::Ignored => println!("Key '{}' ignored", key),
                }
            }
            ShellCommand::Export(path) => {
                let count = ScheduleExporter::export(self.view.table(), &self.config.markup, &path)?;
                self.success(&format!("Exported {} visible rows to {}", count, path.display()));
            }
            ShellCommand::Logs(count) => match &self.log_buffer {
                Some(buffer) => {
                    for entry in buffer.get_recent(count) {
                        println!("{}", entry.format_for_display());
                    }
                }
                None => println!("Logging is not initialized"),
            },
            ShellCommand::ClearLogs => match &self.log_buffer {
                Some(buffer) => {
                    let dropped = buffer.len();
                    buffer.clear();
                    self.success(&format!("Cleared {} log lines", dropped));
                }
                None => println!("Logging is not initialized"),
            },
            ShellCommand::Help => print_commands(),
            ShellCommand::Clear => print!("{esc}[2J{esc}[1;1H", esc = 27 as char),
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    pub fn status(&self) -> String {
        status_line(&self.view)
    }
}

pub fn print_commands() {
    println!("{}", "Commands:".yellow());
    println!("  {}  - Show groups matching the text (empty clears)", "filter <text>".green());
    println!("  {}   - Click a column header (again to reverse)", "sort <column>".green());
    println!("  {}            - Show the schedule", "show".green());
    println!("  {}          - List groups and their main rows", "groups".green());
    println!("  {} - Send a key to the row at a position", "key <#> <enter|space>".green());
    println!("  {}   - Write visible rows (.html, .csv, .json)", "export <file>".green());
    println!("  {}        - Show recent log lines", "logs [n]".green());
    println!("  {}      - Empty the in-memory log", "logs clear".green());
    println!("  {}           - Clear the screen", "clear".green());
    println!("  {}            - Exit", "quit".green());
}
