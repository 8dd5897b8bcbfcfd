use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{Datelike, NaiveDate};

use crate::cell::DayCell;
use crate::config::Config;
use crate::grid::{GRID_COLUMNS, weekday_labels};
use crate::picker::DatePicker;
use crate::value::DateValue;

const CELL_WIDTH: usize = 4;

/// Prints picker state to a terminal.
///
/// Cells are four columns wide: a left
/// marker, the two-digit day and a right
/// marker. `[05]` is a selected end,
/// `(06)` lies inside the range or the
/// hover preview, `07*` is today and
/// `08x` is disabled.
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, picker))]
    pub fn print_picker(&self, picker: &DatePicker, today: NaiveDate) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_picker(&mut out, picker, today)
    }

    pub fn write_picker<W: Write>(
        &self,
        mut out: W,
        picker: &DatePicker,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let options = picker.options();
        let text = picker.display_text();
        let shown = if text.is_empty() {
            self.paint(&options.placeholder, "2")
        } else {
            text
        };
        writeln!(out, "{}: {shown}", options.label)?;
        writeln!(out, "popup: {}", picker.popup())?;

        let width = CELL_WIDTH * GRID_COLUMNS;
        let title = picker.view().title();
        writeln!(out, "{:^width$}", format!("< {title} >"))?;
        self.write_grid(&mut out, &picker.cells(today))?;
        Ok(())
    }

    pub fn write_grid<W: Write>(&self, mut out: W, cells: &[DayCell]) -> anyhow::Result<()> {
        for label in weekday_labels() {
            write!(out, "{:^width$}", &label[..2], width = CELL_WIDTH)?;
        }
        writeln!(out)?;

        for week in cells.chunks(GRID_COLUMNS) {
            let line = week
                .iter()
                .map(|cell| self.format_cell(cell))
                .collect::<String>();
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    pub fn print_change(&self, value: &DateValue, text: &str, json: bool) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if json {
            writeln!(out, "{}", serde_json::to_string(value)?)?;
        } else {
            writeln!(out, "changed: {text}")?;
        }
        Ok(())
    }

    fn format_cell(&self, cell: &DayCell) -> String {
        let (left, right) = if cell.is_selected() {
            ('[', ']')
        } else if cell.in_range || cell.in_preview {
            ('(', ')')
        } else if cell.is_today {
            (' ', '*')
        } else if cell.disabled {
            (' ', 'x')
        } else {
            (' ', ' ')
        };
        let left = if cell.is_focused { '>' } else { left };
        let text = format!("{left}{:02}{right}", cell.date.day());

        let code = if cell.is_selected() {
            "7"
        } else if cell.disabled {
            "9"
        } else if !cell.in_month {
            "2"
        } else {
            return text;
        };
        self.paint(&text, code)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::Renderer;
    use crate::picker::{DatePicker, PickerOptions};
    use crate::value::DateValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn renders_range_markers() {
        let today = date(2024, 3, 14);
        let picker = DatePicker::new(
            PickerOptions {
                range: true,
                ..PickerOptions::default()
            },
            DateValue::range(Some(date(2024, 3, 5)), Some(date(2024, 3, 7))),
            today,
        );

        let mut buf = Vec::new();
        Renderer::plain()
            .write_picker(&mut buf, &picker, today)
            .expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Date: 05.03.2024 – 07.03.2024");
        assert_eq!(lines[1], "popup: closed");
        assert!(lines[2].contains("< March 2024 >"));
        assert_eq!(lines[3].split_whitespace().next(), Some("Mo"));
        assert_eq!(lines.len(), 4 + 6);
        assert!(lines[4].starts_with(" 26"));
        assert!(lines[5].contains("[05](06)[07]"));
        assert!(lines[6].contains(" 14*"));
    }

    #[test]
    fn shows_placeholder_when_empty() {
        let today = date(2024, 3, 14);
        let picker = DatePicker::new(PickerOptions::default(), DateValue::empty(false), today);
        let mut buf = Vec::new();
        Renderer::plain()
            .write_picker(&mut buf, &picker, today)
            .expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("Date: dd.mm.yyyy\n"));
    }
}
