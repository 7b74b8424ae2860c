use anyhow::{anyhow, bail, Context, Result};
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, KeyCode, KeyModifiers, MenuBuilder, Prompt,
    PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, ReedlineEvent,
    ReedlineMenu, Signal,
};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

mod completer;
mod shell;
mod table_display;

use completer::ScheduleCompleter;
use course_table::config::config::Config;
use course_table::data::schedule_exporter::ScheduleExporter;
use course_table::html::load_schedule_file;
use course_table::utils::logging::init_tracing;
use course_table::{ScheduleView, SortEngine};
use shell::{print_commands, Flow, Session, ShellCommand};
use table_display::{display_schedule, status_line};

struct SchedulePrompt {
    status: String,
}

impl Prompt for SchedulePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("schedule")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.status)
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "Course Table - group-aware schedule filtering and sorting".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  course-table [OPTIONS] FILE.html");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}     - Filter once and print (batch mode)", "--filter TEXT".green());
    println!("  {}       - Click a column header, repeatable (batch mode)", "--sort COL".green());
    println!("  {}    - Export visible rows to .html/.csv/.json", "--output FILE".green());
    println!("  {}           - Print the resulting table", "--print".green());
    println!("  {}   - Use a specific config file", "--config FILE".green());
    println!("  {}     - Initialize configuration with wizard", "--init-config".green());
    println!("  {} - Generate config file with defaults", "--generate-config".green());
    println!();
    print_commands();
    println!();
}

#[derive(Debug, Default)]
struct CliArgs {
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    filter: Option<String>,
    sorts: Vec<String>,
    output: Option<PathBuf>,
    print: bool,
    help: bool,
    init_config: bool,
    generate_config: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = CliArgs::default();
        let mut iter = args.iter().skip(1);

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{} requires a value", flag))
            };

            match arg.as_str() {
                "--help" | "-h" => parsed.help = true,
                "--init-config" => parsed.init_config = true,
                "--generate-config" => parsed.generate_config = true,
                "--print" => parsed.print = true,
                "--filter" => parsed.filter = Some(value("--filter")?),
                "--sort" => parsed.sorts.push(value("--sort")?),
                "--output" | "-o" => parsed.output = Some(PathBuf::from(value("--output")?)),
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                flag if flag.starts_with("--") => bail!("Unknown option {}", flag),
                file => {
                    if parsed.file.is_some() {
                        bail!("Only one schedule file can be given");
                    }
                    parsed.file = Some(PathBuf::from(file));
                }
            }
        }

        Ok(parsed)
    }

    fn is_batch(&self) -> bool {
        self.filter.is_some() || !self.sorts.is_empty() || self.output.is_some() || self.print
    }
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize course-table.");
    Ok(())
}

fn load_view(file: &Path, config: &Config) -> Result<ScheduleView> {
    let table = load_schedule_file(file, &config.markup)?;
    Ok(ScheduleView::new(
        table,
        SortEngine::new(config.sort.weekday_mapping()),
    ))
}

fn run_batch(mut view: ScheduleView, args: &CliArgs, config: &Config) -> Result<()> {
    if let Some(filter) = &args.filter {
        view.on_filter_input(filter);
    }

    for column in &args.sorts {
        let index = view
            .table()
            .resolve_column(column)
            .ok_or_else(|| anyhow!("No column '{}'", column))?;
        if view.on_header_click(index).is_none() {
            bail!("Column '{}' is not sortable", column);
        }
    }

    if let Some(output) = &args.output {
        let count = ScheduleExporter::export(view.table(), &config.markup, output)?;
        eprintln!("Exported {} visible rows to {}", count, output.display());
    }

    if args.print || args.output.is_none() {
        display_schedule(&view, &config.display);
    }

    Ok(())
}

fn run_shell(session: &mut Session) -> Result<()> {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("schedule_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("schedule_completion".to_string()),
    );

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(ScheduleCompleter::new(session.view.table())))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    display_schedule(&session.view, &session.config.display);
    println!("Type {} for commands.", "help".green());

    loop {
        let prompt = SchedulePrompt {
            status: session.status(),
        };
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                if buffer.trim().is_empty() {
                    continue;
                }

                let result = ShellCommand::parse(&buffer).and_then(|cmd| session.execute(cmd));
                match result {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
                }
            }
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let args = match CliArgs::parse(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            print_help();
            std::process::exit(2);
        }
    };

    if args.help {
        print_help();
        return Ok(());
    }

    if args.init_config {
        let config = Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        if !config.display.use_color {
            println!("Note: colors disabled");
        }
        return Ok(());
    }

    if args.generate_config {
        return generate_config();
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let log_buffer = match init_tracing(&config.logging) {
        Ok(handle) => {
            if let Some(path) = &handle.log_path {
                eprintln!("Debug logs will be written to: {}", path.display());
            }
            Some(handle.buffer)
        }
        Err(e) => {
            eprintln!("{}", format!("Logging disabled: {:#}", e).yellow());
            None
        }
    };

    let Some(file) = &args.file else {
        print_help();
        std::process::exit(1);
    };

    let view = load_view(file, &config)?;
    tracing::info!(target: "main", "{}", status_line(&view));

    if args.is_batch() {
        return run_batch(view, &args, &config);
    }

    let mut session = Session {
        view,
        config,
        log_buffer,
    };
    run_shell(&mut session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("course-table")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_batch_args() {
        let parsed = CliArgs::parse(&args(&[
            "schedule.html",
            "--filter",
            "cyb",
            "--sort",
            "time",
            "--sort",
            "time",
        ]))
        .unwrap();
        assert_eq!(parsed.file, Some(PathBuf::from("schedule.html")));
        assert_eq!(parsed.filter.as_deref(), Some("cyb"));
        assert_eq!(parsed.sorts, vec!["time", "time"]);
        assert!(parsed.is_batch());
    }

    #[test]
    fn test_parse_interactive_args() {
        let parsed = CliArgs::parse(&args(&["schedule.html"])).unwrap();
        assert!(!parsed.is_batch());
    }

    #[test]
    fn test_parse_rejects_missing_value_and_unknown_flag() {
        assert!(CliArgs::parse(&args(&["--filter"])).is_err());
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
        assert!(CliArgs::parse(&args(&["a.html", "b.html"])).is_err());
    }
}
