use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::format::DateFormat;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "datepick",
    version,
    about = "Calendar date picker driven from the terminal",
    after_help = "EXAMPLES:\n\
        \x20 datepick grid --month 2024-03 2024-03-05 2024-03-09\n\
        \x20 datepick format today --format iso\n\
        \x20 datepick pick --range --json 2024-03-20 2024-03-05\n\
        \x20 printf 'open\\nright\\nenter\\n' | datepick session"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Override a setting, e.g. `--rc format=iso`.
    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    /// Settings file to load instead of `~/.datepickrc`.
    #[arg(long = "pickerrc", global = true)]
    pub pickerrc: Option<PathBuf>,

    /// Pretend today is this date.
    #[arg(long = "today", global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the month grid after applying clicks.
    Grid(GridArgs),
    /// Print a date in one of the display formats.
    Format(FormatArgs),
    /// Click dates in order and print every change event.
    Pick(PickArgs),
    /// Read picker events from stdin, one per line.
    Session(SessionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PickerArgs {
    /// Select a [start, end] range instead of a single date.
    #[arg(long)]
    pub range: bool,

    #[arg(long, value_parser = parse_format)]
    pub format: Option<DateFormat>,

    /// Earliest selectable date.
    #[arg(long)]
    pub min: Option<String>,

    /// Latest selectable date.
    #[arg(long)]
    pub max: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    #[command(flatten)]
    pub picker: PickerArgs,

    /// Month to show: `YYYY-MM` or any date expression.
    #[arg(long)]
    pub month: Option<String>,

    /// Dates to click before printing.
    pub clicks: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    pub date: String,

    #[arg(long, value_parser = parse_format)]
    pub format: Option<DateFormat>,
}

#[derive(Args, Debug, Clone)]
pub struct PickArgs {
    #[command(flatten)]
    pub picker: PickerArgs,

    /// Print change events as JSON.
    #[arg(long)]
    pub json: bool,

    pub clicks: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    #[command(flatten)]
    pub picker: PickerArgs,

    /// Print change events as JSON.
    #[arg(long)]
    pub json: bool,
}

fn parse_format(s: &str) -> anyhow::Result<DateFormat> {
    s.parse()
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` and `rc.key:value` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                rest.split_once(':')
                    .map(|(k, v)| (format!("rc.{k}"), v.to_string()))
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

impl PickerArgs {
    /// Flags given on the command line, as config overrides.
    pub fn overrides(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if self.range {
            out.push(("range".to_string(), "on".to_string()));
        }
        if let Some(format) = self.format {
            out.push(("format".to_string(), format.as_key().to_string()));
        }
        if let Some(min) = &self.min {
            out.push(("min".to_string(), min.clone()));
        }
        if let Some(max) = &self.max {
            out.push(("max".to_string(), max.clone()));
        }
        out
    }
}
