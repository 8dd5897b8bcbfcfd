use std::io::{self, BufRead};

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::cli::{Command, FormatArgs, GridArgs, PickArgs, PickerArgs, SessionArgs};
use crate::config::Config;
use crate::datetime::{parse_date_expr, parse_month_expr};
use crate::grid::ViewMonth;
use crate::picker::DatePicker;
use crate::popup::Key;
use crate::render::Renderer;
use crate::value::DateValue;

/// One line of `datepick session` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Open,
    Close,
    Outside,
    Prev,
    Next,
    Show,
    Click(NaiveDate),
    Hover(Option<NaiveDate>),
    Key(Key),
}

impl SessionEvent {
    pub fn parse(line: &str, today: NaiveDate) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        let event = match word.to_ascii_lowercase().as_str() {
            "open" | "focus" => Self::Open,
            "close" => Self::Close,
            "outside" => Self::Outside,
            "prev" => Self::Prev,
            "next" => Self::Next,
            "show" => Self::Show,
            "click" => Self::Click(
                parse_date_expr(rest, today).context("`click` expects a date")?,
            ),
            "hover" if rest.is_empty() => Self::Hover(None),
            "hover" => Self::Hover(Some(
                parse_date_expr(rest, today).context("`hover` expects a date")?,
            )),
            other => Self::Key(
                other
                    .parse::<Key>()
                    .map_err(|_| anyhow!("unknown session command: {line}"))?,
            ),
        };
        Ok(event)
    }

    /// Applies the event, returning the change event it produced, if any.
    pub fn apply(&self, picker: &mut DatePicker, today: NaiveDate) -> Option<DateValue> {
        match *self {
            Self::Open => {
                picker.click_input(today);
                None
            }
            Self::Close => {
                picker.close();
                None
            }
            Self::Outside => {
                picker.outside_pointer_down();
                None
            }
            Self::Prev => {
                picker.prev_month();
                None
            }
            Self::Next => {
                picker.next_month();
                None
            }
            Self::Show => None,
            Self::Click(day) => picker.click_day(day),
            Self::Hover(day) => {
                picker.hover_day(day);
                None
            }
            Self::Key(key) => picker.handle_key(key, today),
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn dispatch(
    cfg: &Config,
    renderer: &Renderer,
    today: NaiveDate,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Grid(args) => cmd_grid(cfg, renderer, today, args),
        Command::Format(args) => cmd_format(cfg, today, args),
        Command::Pick(args) => cmd_pick(cfg, renderer, today, args),
        Command::Session(args) => cmd_session(cfg, renderer, today, args),
    }
}

fn build_picker(cfg: &Config, args: &PickerArgs, today: NaiveDate) -> anyhow::Result<DatePicker> {
    let mut cfg = cfg.clone();
    cfg.apply_overrides(args.overrides());
    let options = cfg.picker_options(today)?;
    debug!(
        format = %options.format,
        range = options.range,
        bounds = ?options.bounds,
        "built picker options"
    );
    let value = DateValue::empty(options.range);
    Ok(DatePicker::new(options, value, today))
}

fn click_all(
    picker: &mut DatePicker,
    clicks: &[String],
    today: NaiveDate,
    mut on_change: impl FnMut(&DatePicker, DateValue) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    for raw in clicks {
        let day = parse_date_expr(raw, today)?;
        if !picker.is_open() {
            picker.click_input(today);
        }
        match picker.click_day(day) {
            Some(value) => on_change(picker, value)?,
            None => warn!(%day, "click ignored: day is disabled"),
        }
    }
    Ok(())
}

#[tracing::instrument(skip(cfg, renderer, args))]
fn cmd_grid(cfg: &Config, renderer: &Renderer, today: NaiveDate, args: GridArgs) -> anyhow::Result<()> {
    let mut picker = build_picker(cfg, &args.picker, today)?;
    click_all(&mut picker, &args.clicks, today, |_, _| Ok(()))?;

    if let Some(month) = &args.month {
        let month = parse_month_expr(month, today)?;
        let mut state = *picker.state();
        state.view = ViewMonth::containing(month);
        picker = DatePicker::with_state(picker.options().clone(), state);
    }

    renderer.print_picker(&picker, today)
}

fn cmd_format(cfg: &Config, today: NaiveDate, args: FormatArgs) -> anyhow::Result<()> {
    let day = parse_date_expr(&args.date, today)?;
    let format = match args.format {
        Some(format) => format,
        None => cfg.picker_options(today)?.format,
    };
    println!("{}", format.format(day));
    Ok(())
}

#[tracing::instrument(skip(cfg, renderer, args))]
fn cmd_pick(cfg: &Config, renderer: &Renderer, today: NaiveDate, args: PickArgs) -> anyhow::Result<()> {
    let mut picker = build_picker(cfg, &args.picker, today)?;
    let json = args.json;
    click_all(&mut picker, &args.clicks, today, |picker, value| {
        renderer.print_change(&value, &picker.display_text(), json)
    })?;

    if !json {
        println!("value: {}", picker.display_text());
        println!("popup: {}", picker.popup());
    }
    info!(value = ?picker.value(), "pick finished");
    Ok(())
}

#[tracing::instrument(skip(cfg, renderer, args))]
fn cmd_session(cfg: &Config, renderer: &Renderer, today: NaiveDate, args: SessionArgs) -> anyhow::Result<()> {
    let mut picker = build_picker(cfg, &args.picker, today)?;
    let stdin = io::stdin();

    for (line_num, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed reading stdin")?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let event = SessionEvent::parse(&line, today)
            .with_context(|| format!("line {}", line_num + 1))?;
        debug!(?event, "session event");

        if let Some(value) = event.apply(&mut picker, today) {
            renderer.print_change(&value, &picker.display_text(), args.json)?;
        }
        if event == SessionEvent::Show || picker.is_open() {
            renderer.print_picker(&picker, today)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::SessionEvent;
    use crate::picker::{DatePicker, PickerOptions};
    use crate::popup::Key;
    use crate::value::DateValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_session_lines() {
        let today = date(2024, 3, 14);
        assert_eq!(
            SessionEvent::parse("click 2024-03-05", today).expect("click"),
            SessionEvent::Click(date(2024, 3, 5))
        );
        assert_eq!(
            SessionEvent::parse("  hover  ", today).expect("hover"),
            SessionEvent::Hover(None)
        );
        assert_eq!(
            SessionEvent::parse("PageDown", today).expect("key"),
            SessionEvent::Key(Key::PageDown)
        );
        assert!(SessionEvent::parse("jump", today).is_err());
        assert!(SessionEvent::parse("click whenever", today).is_err());
    }

    #[test]
    fn scripted_range_session() {
        let today = date(2024, 3, 14);
        let mut picker = DatePicker::new(
            PickerOptions {
                range: true,
                ..PickerOptions::default()
            },
            DateValue::empty(true),
            today,
        );

        let mut changes = Vec::new();
        for line in ["open", "right", "enter", "down", "space"] {
            let event = SessionEvent::parse(line, today).expect("parse");
            if let Some(value) = event.apply(&mut picker, today) {
                changes.push(value);
            }
        }

        assert_eq!(
            changes,
            vec![
                DateValue::range(Some(date(2024, 3, 15)), None),
                DateValue::range(Some(date(2024, 3, 15)), Some(date(2024, 3, 22))),
            ]
        );
        assert!(!picker.is_open());
    }
}
