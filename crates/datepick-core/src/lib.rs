//! Headless calendar date picker.
//!
//! The picker logic lives in [`picker::DatePicker`] and the modules it is
//! built from: [`grid`] for the 42-day month grid, [`selection`] for
//! single and range clicks, [`format`] for the input text and [`popup`]
//! for visibility. [`run`] drives a picker from the command line.

pub mod bounds;
pub mod cell;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod format;
pub mod grid;
pub mod picker;
pub mod popup;
pub mod render;
pub mod selection;
pub mod value;

use std::ffi::OsString;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use bounds::DateBounds;
pub use cell::DayCell;
pub use format::DateFormat;
pub use grid::ViewMonth;
pub use picker::{
  DatePicker,
  PickerOptions,
  PickerState
};
pub use popup::{
  Key,
  PopupState
};
pub use value::DateValue;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting datepick"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.pickerrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let tz = datetime::resolve_timezone(
    cfg.get("timezone").as_deref()
  );
  let clock_today =
    datetime::today_in(tz, Utc::now());
  let today = match cli.today.as_deref()
  {
    | Some(raw) => {
      datetime::parse_date_expr(
        raw,
        clock_today
      )
      .context("invalid --today")?
    }
    | None => clock_today
  };
  debug!(%tz, %today, "resolved today");

  let renderer =
    render::Renderer::new(&cfg)?;

  commands::dispatch(
    &cfg,
    &renderer,
    today,
    cli.command
  )?;

  info!("done");
  Ok(())
}
