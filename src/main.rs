mod app;
mod help;
use crate::app::{App, Outcome};
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use env_logger::{Env, Target};
use lexopt::{Arg, Parser, ValueExt};
use log::warn;
use rangecal::calendar::WeekWindow;
use rangecal::day::parse_day;
use rangecal::{Config, Page, PageParts, RangeSelector, WeekStart, WeekendTint};
use ratatui::{style::Color, DefaultTerminal};
use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    start: Option<Date>,
    end: Option<Date>,
    today: Option<Date>,
    config: Config,
    parts: PageParts,
    log_file: Option<PathBuf>,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("start") => opts.start = Some(parser.value()?.parse_with(parse_day)?),
                Arg::Long("end") => opts.end = Some(parser.value()?.parse_with(parse_day)?),
                Arg::Long("today") => opts.today = Some(parser.value()?.parse_with(parse_day)?),
                Arg::Long("sunday") => opts.config.week_start = WeekStart::Sunday,
                Arg::Long("monday") => opts.config.week_start = WeekStart::Monday,
                Arg::Long("highlight") => {
                    opts.config.highlight_color = parser.value()?.parse::<Color>()?;
                }
                Arg::Long("weekend") => {
                    opts.config.weekend_color = parser.value()?.parse::<Color>()?;
                }
                Arg::Long("format") => opts.config.display_format = parser.value()?.string()?,
                Arg::Long("calendar-id") => {
                    opts.config.calendar_id = parser.value()?.string()?;
                }
                Arg::Long("start-input") => {
                    opts.config.start_input_id = parser.value()?.string()?;
                }
                Arg::Long("end-input") => {
                    opts.config.end_input_id = parser.value()?.string()?;
                }
                Arg::Long("info-container") => {
                    opts.config.info_container_id = parser.value()?.string()?;
                }
                Arg::Long("info-text") => {
                    opts.config.info_text_id = parser.value()?.string()?;
                }
                Arg::Long("submit-selector") => {
                    opts.config.submit_selector = parser.value()?.string()?;
                }
                Arg::Long("no-status") => opts.parts.status = false,
                Arg::Long("no-submit") => opts.parts.submit = false,
                Arg::Long("no-inputs") => opts.parts.inputs = false,
                Arg::Long("log-file") => opts.log_file = Some(PathBuf::from(parser.value()?)),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                if let Some(path) = &opts.log_file {
                    init_logging(path)?;
                }
                let today = match opts.today {
                    Some(d) => d,
                    None => OffsetDateTime::now_local()
                        .context("failed to determine local date")?
                        .date(),
                };
                let weeks = WeekWindow::new(
                    today,
                    WeekendTint(opts.config.weekend_color),
                    opts.config.week_start,
                )
                .start_date(opts.start.or(opts.end).unwrap_or(today));
                let page = Page::standard(&opts.config, opts.parts);
                let mut selector = RangeSelector::attach(&opts.config, page, weeks)
                    .context("invalid configuration")?;
                if opts.start.is_some() || opts.end.is_some() {
                    selector.set_range(opts.start, opts.end);
                }
                let outcome = with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(selector)
                        .run(&mut terminal)
                        .context("failed to run terminal UI")
                })?;
                if let Outcome::Submitted(data) = outcome {
                    for (id, value) in data {
                        println!("{id}={value}");
                    }
                }
                Ok(())
            }
            Command::Help => {
                println!("Usage: rangecal [OPTIONS]");
                println!();
                println!("Pick a date range on a terminal calendar and print it as form fields");
                println!();
                println!("Options:");
                println!("  --start YYYY-MM-DD    Preselect the start of the range");
                println!("  --end YYYY-MM-DD      Preselect the end of the range");
                println!("  --today YYYY-MM-DD    Use the given date as today");
                println!("  --sunday              Start weeks on Sunday");
                println!("  --monday              Start weeks on Monday [default]");
                println!("  --highlight COLOR     Background of the selected range [default: #cde8ff]");
                println!("  --weekend COLOR       Color of Saturdays & Sundays [default: #fac8c8]");
                println!("  --format FMT          Date format for the status line [default: [day]/[month]/[year]]");
                println!("  --calendar-id ID      ID of the calendar slot [default: date-range-calendar]");
                println!("  --start-input ID      Form field for the start date [default: range-start]");
                println!("  --end-input ID        Form field for the end date [default: range-end]");
                println!("  --info-container ID   ID of the status line container [default: range-info]");
                println!("  --info-text ID        ID of the status line text [default: range-text]");
                println!(r#"  --submit-selector SEL Submit button to gate [default: button[type="submit"]]"#);
                println!("  --no-status           Do not show a status line");
                println!("  --no-submit           Do not show a submit button");
                println!("  --no-inputs           Do not include form inputs");
                println!("  --log-file PATH       Write logs to the given file");
                println!("  -h, --help            Display this help message and exit");
                println!("  -V, --version         Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::new().filter_or("RANGECAL_LOG", "info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialize logging")?;
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| func(terminal));
    if let Err(e) = execute!(stdout(), DisableMouseCapture) {
        warn!("Failed to disable mouse capture: {e}");
    }
    ratatui::restore();
    r
}
