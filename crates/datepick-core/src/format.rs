use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};

use crate::value::DateValue;

/// Placed between the ends of a range.
pub const RANGE_SEPARATOR: &str = " – ";

/// Years that fit the four-digit year
/// field of every format.
pub const YEAR_RANGE: RangeInclusive<i32> =
  0..=9999;

/// Rejects dates whose year does not fit
/// [`YEAR_RANGE`].
pub fn ensure_formattable(
  date: NaiveDate
) -> anyhow::Result<NaiveDate> {
  if YEAR_RANGE.contains(&date.year()) {
    Ok(date)
  } else {
    Err(anyhow!(
      "{date} is outside years \
       0000-9999"
    ))
  }
}

/// Display format for the input text.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
pub enum DateFormat {
  #[default]
  #[serde(rename = "dd.mm.yyyy")]
  DayMonthYear,
  #[serde(rename = "mm/dd/yyyy")]
  MonthDayYear,
  #[serde(rename = "iso")]
  Iso
}

impl DateFormat {
  pub const ALL: [Self; 3] = [
    Self::DayMonthYear,
    Self::MonthDayYear,
    Self::Iso
  ];

  #[must_use]
  pub fn as_key(self) -> &'static str {
    match self {
      | Self::DayMonthYear => {
        "dd.mm.yyyy"
      }
      | Self::MonthDayYear => {
        "mm/dd/yyyy"
      }
      | Self::Iso => "iso"
    }
  }

  /// Hint shown in an empty input.
  #[must_use]
  pub fn placeholder(
    self,
    range: bool
  ) -> String {
    if range {
      format!(
        "{key}{RANGE_SEPARATOR}{key}",
        key = self.as_key()
      )
    } else {
      self.as_key().to_string()
    }
  }

  fn pattern(self) -> &'static str {
    match self {
      | Self::DayMonthYear => "%d.%m.%Y",
      | Self::MonthDayYear => "%m/%d/%Y",
      | Self::Iso => "%Y-%m-%d"
    }
  }

  /// Zero-padded, fixed-width text for
  /// years in [`YEAR_RANGE`]. Other years
  /// print wider; input boundaries reject
  /// them with [`ensure_formattable`].
  #[must_use]
  pub fn format(
    self,
    date: NaiveDate
  ) -> String {
    let (y, m, d) = (
      date.year(),
      date.month(),
      date.day()
    );
    match self {
      | Self::DayMonthYear => {
        format!("{d:02}.{m:02}.{y:04}")
      }
      | Self::MonthDayYear => {
        format!("{m:02}/{d:02}/{y:04}")
      }
      | Self::Iso => {
        format!("{y:04}-{m:02}-{d:02}")
      }
    }
  }

  pub fn parse(
    self,
    input: &str
  ) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(
      input.trim(),
      self.pattern()
    )
    .with_context(|| {
      format!(
        "expected a {} date, got: \
         {input}",
        self.as_key()
      )
    })
  }

  /// Input text for a value. Empty
  /// values render as an empty string so
  /// the placeholder shows through.
  #[must_use]
  pub fn format_value(
    self,
    value: &DateValue
  ) -> String {
    match *value {
      | DateValue::Single {
        date: Some(date)
      } => self.format(date),
      | DateValue::Range {
        start: Some(start),
        end
      } => {
        let mut text =
          self.format(start);
        text.push_str(RANGE_SEPARATOR);
        if let Some(end) = end {
          text.push_str(
            &self.format(end)
          );
        }
        text
      }
      | _ => String::new()
    }
  }
}

impl fmt::Display for DateFormat {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for DateFormat {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "dd.mm.yyyy" | "dmy" => {
        Ok(Self::DayMonthYear)
      }
      | "mm/dd/yyyy" | "mdy" => {
        Ok(Self::MonthDayYear)
      }
      | "iso" | "yyyy-mm-dd" => {
        Ok(Self::Iso)
      }
      | other => {
        Err(anyhow!(
          "unknown date format: \
           {other} (expected \
           dd.mm.yyyy, mm/dd/yyyy or \
           iso)"
        ))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::DateFormat;
  use crate::value::DateValue;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn formats_fixed_date_in_each_format() {
    let day = date(2024, 3, 5);
    assert_eq!(
      DateFormat::DayMonthYear
        .format(day),
      "05.03.2024"
    );
    assert_eq!(
      DateFormat::MonthDayYear
        .format(day),
      "03/05/2024"
    );
    assert_eq!(
      DateFormat::Iso.format(day),
      "2024-03-05"
    );
  }

  #[test]
  fn pads_short_years() {
    assert_eq!(
      DateFormat::Iso
        .format(date(987, 1, 2)),
      "0987-01-02"
    );
  }

  #[test]
  fn parses_what_it_formats() {
    let day = date(2024, 12, 31);
    for format in DateFormat::ALL {
      assert_eq!(
        format
          .parse(&format.format(day))
          .expect("parse formatted"),
        day
      );
    }
    assert!(
      DateFormat::Iso
        .parse("31.12.2024")
        .is_err()
    );
  }

  #[test]
  fn range_display_text() {
    let start = date(2024, 3, 5);
    let end = date(2024, 3, 9);
    assert_eq!(
      DateFormat::DayMonthYear
        .format_value(&DateValue::range(
          Some(start),
          None
        )),
      "05.03.2024 – "
    );
    assert_eq!(
      DateFormat::Iso.format_value(
        &DateValue::range(
          Some(start),
          Some(end)
        )
      ),
      "2024-03-05 – 2024-03-09"
    );
    assert_eq!(
      DateFormat::Iso.format_value(
        &DateValue::empty(true)
      ),
      ""
    );
    assert_eq!(
      DateFormat::Iso.format_value(
        &DateValue::empty(false)
      ),
      ""
    );
  }

  #[test]
  fn placeholder_follows_mode() {
    assert_eq!(
      DateFormat::MonthDayYear
        .placeholder(false),
      "mm/dd/yyyy"
    );
    assert_eq!(
      DateFormat::Iso.placeholder(true),
      "iso – iso"
    );
  }

  #[test]
  fn format_keys_round_trip() {
    for format in DateFormat::ALL {
      assert_eq!(
        format
          .as_key()
          .parse::<DateFormat>()
          .expect("parse key"),
        format
      );
    }
    assert!(
      "yyyy/mm/dd"
        .parse::<DateFormat>()
        .is_err()
    );
  }
}
