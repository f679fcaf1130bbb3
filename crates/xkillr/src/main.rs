mod app;
mod config;
mod filter;
mod process;
mod selection;
mod signals;
mod ui;

use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use config::{Config, DEFAULT_POLL_MS, DEFAULT_PROC_ROOT, Theme};
use filter::{FilteredView, target_pattern};
use process::Snapshot;
use signals::NixSender;
use ui::{Screen, TerminalScreen};

const KEYS: &str = "\
Keys:
    type        filter by user, pid or command (case-insensitive regex)
    Backspace   erase the last filter character
    Up/Down     move the selection
    Enter       send SIGTERM to the selected process and exit
    Ctrl-Q      quit without sending anything

Logging:
    RUST_LOG above `error` needs --log-file, the tui owns the terminal";

const COPYING: &str = "\
xkillr: kill processes

This program is free software; you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 2 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License along
with this program; if not, see <https://www.gnu.org/licenses/>.
";

#[derive(Debug, Parser)]
#[command(
    name = "xkillr",
    about = "Filter the process table and terminate a process",
    version,
    after_help = KEYS
)]
pub struct Cli {
    /// pid or process name used as the initial filter.
    #[arg(value_name = "PID|NAME")]
    pub target: Option<String>,

    /// print the process table and exit.
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// print license information and exit.
    #[arg(long = "copying")]
    pub copying: bool,

    /// highlight colors for the tui.
    #[arg(long = "theme", value_enum, default_value_t = Theme::Pink)]
    pub theme: Theme,

    /// how long to wait for input before looping, in milliseconds.
    #[arg(long = "poll-rate", value_name = "ms", default_value_t = DEFAULT_POLL_MS)]
    pub poll_rate: u64,

    /// write logs to this file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[arg(long = "proc-root", value_name = "PATH", default_value = DEFAULT_PROC_ROOT, hide = true)]
    pub proc_root: PathBuf,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            theme: self.theme,
            proc_root: self.proc_root.clone(),
            initial_filter: self.target.as_deref().map(target_pattern),
            poll_interval: Duration::from_millis(self.poll_rate.max(1)),
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    if args.copying {
        print!("{COPYING}");
        return ExitCode::SUCCESS;
    }

    if let Err(err) = init_logging(args.log_file.as_deref()) {
        eprintln!("xkillr: {err:#}");
        return ExitCode::FAILURE;
    }

    let config = args.config();
    log::debug!("{config:?}");

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("xkillr: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli, config: &Config) -> Result<()> {
    let snapshot = Snapshot::capture(&config.proc_root)?;
    if snapshot.is_empty() {
        log::warn!("no readable processes under {}", config.proc_root.display());
    }

    if args.list {
        let pattern = config.initial_filter.as_deref().unwrap_or_default();
        let view = FilteredView::recompute(&snapshot, pattern);
        return match ui::listing::write_table(&mut io::stdout().lock(), view.records(&snapshot)) {
            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => other.context("cannot write process list"),
        };
    }

    let outer_level = log::max_level();
    log::set_max_level(session_log_level(outer_level, args.log_file.is_some()));
    let outcome = (|| {
        let mut screen = TerminalScreen::new().context("cannot set up the terminal")?;
        let mut app = app::App::new(snapshot, config, screen.viewport_height()?);
        app::run(&mut app, &mut screen, &mut NixSender, config.poll_interval)
    })();
    log::set_max_level(outer_level);
    let outcome = outcome?;

    // the alternate screen is gone by now, leave the result in the scrollback
    if let Some(outcome) = outcome {
        println!("{outcome}");
    }
    Ok(())
}

/// Anything below `error` would be written over the alternate screen unless it
/// goes to a log file.
fn session_log_level(outer: LevelFilter, logs_to_file: bool) -> LevelFilter {
    if logs_to_file {
        outer
    } else {
        outer.min(LevelFilter::Error)
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let default_level = if log_file.is_some() { "debug" } else { "error" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_enter_the_interactive_view() {
        let args = Cli::parse_from(["xkillr"]);
        assert!(!args.list && !args.copying);
        let config = args.config();
        assert_eq!(config.initial_filter, None);
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.theme, Theme::Pink);
    }

    #[test]
    fn short_and_long_list_flags() {
        assert!(Cli::parse_from(["xkillr", "-l"]).list);
        assert!(Cli::parse_from(["xkillr", "--list"]).list);
        assert!(Cli::parse_from(["xkillr", "--copying"]).copying);
    }

    #[test]
    fn positional_target_becomes_the_initial_filter() {
        let by_pid = Cli::parse_from(["xkillr", "1234"]).config();
        assert_eq!(by_pid.initial_filter.as_deref(), Some("^1234$"));

        let by_name = Cli::parse_from(["xkillr", "-l", "node.js"]).config();
        assert_eq!(by_name.initial_filter.as_deref(), Some(r"node\.js"));
    }

    #[test]
    fn unknown_flags_and_extra_targets_are_rejected() {
        assert!(Cli::try_parse_from(["xkillr", "--frobnicate"]).is_err());
        assert!(Cli::try_parse_from(["xkillr", "vim", "emacs"]).is_err());
    }

    #[test]
    fn poll_rate_never_drops_to_zero() {
        let config = Cli::parse_from(["xkillr", "--poll-rate", "0"]).config();
        assert_eq!(config.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn stderr_logging_is_capped_while_the_tui_runs() {
        assert_eq!(
            session_log_level(LevelFilter::Debug, false),
            LevelFilter::Error
        );
        assert_eq!(session_log_level(LevelFilter::Off, false), LevelFilter::Off);
        assert_eq!(
            session_log_level(LevelFilter::Trace, true),
            LevelFilter::Trace
        );
    }

    #[test]
    fn help_lists_the_keys() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Ctrl-Q"));
        assert!(help.contains("--list"));
        assert!(help.contains("RUST_LOG"));
    }
}
