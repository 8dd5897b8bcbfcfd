//! Month grid generation.
//!
//! The popup always renders six Monday-first weeks so the layout does not
//! jump between months with four, five or six rows.

use std::fmt;

use chrono::{
  Datelike,
  Months,
  NaiveDate,
  TimeDelta
};
use serde::{
  Deserialize,
  Serialize
};

pub const GRID_COLUMNS: usize = 7;
pub const GRID_ROWS: usize = 6;
pub const GRID_CELLS: usize =
  GRID_COLUMNS * GRID_ROWS;

const WEEKDAY_LABELS: [&str; 7] = [
  "Mon", "Tue", "Wed", "Thu", "Fri",
  "Sat", "Sun"
];

/// The calendar month shown in the
/// popup, stored as its first day.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct ViewMonth(NaiveDate);

impl ViewMonth {
  /// The month containing `date`.
  #[must_use]
  pub fn containing(
    date: NaiveDate
  ) -> Self {
    Self(first_day_of_month(
      date.year(),
      date.month()
    ))
  }

  #[must_use]
  pub fn first_day(self) -> NaiveDate {
    self.0
  }

  #[must_use]
  pub fn last_day(self) -> NaiveDate {
    last_day_of_month(
      self.0.year(),
      self.0.month()
    )
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.0.year()
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.0.month()
  }

  #[must_use]
  pub fn contains(
    self,
    date: NaiveDate
  ) -> bool {
    date.year() == self.0.year()
      && date.month() == self.0.month()
  }

  #[must_use]
  pub fn prev(self) -> Self {
    self.shift(-1)
  }

  #[must_use]
  pub fn next(self) -> Self {
    self.shift(1)
  }

  #[must_use]
  pub fn shift(
    self,
    months: i32
  ) -> Self {
    Self(shift_months(self.0, months))
  }

  /// `March 2024`.
  #[must_use]
  pub fn title(self) -> String {
    self.0.format("%B %Y").to_string()
  }

  #[must_use]
  pub fn days(self) -> u32 {
    days_in_month(
      self.0.year(),
      self.0.month()
    )
  }

  /// Rows actually occupied by this
  /// month's days.
  #[must_use]
  pub fn rows_needed(self) -> usize {
    let leading = self
      .0
      .weekday()
      .num_days_from_monday()
      as usize;
    (leading + self.days() as usize)
      .div_ceil(GRID_COLUMNS)
  }

  /// The 42 dates of the popup grid,
  /// starting on the Monday on or
  /// before the 1st.
  #[must_use]
  pub fn grid(
    self
  ) -> [NaiveDate; GRID_CELLS] {
    let start = start_of_week(self.0);
    std::array::from_fn(|offset| {
      add_days(start, offset as i64)
    })
  }
}

impl fmt::Display for ViewMonth {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{:04}-{:02}",
      self.year(),
      self.month()
    )
  }
}

impl From<NaiveDate> for ViewMonth {
  fn from(date: NaiveDate) -> Self {
    Self::containing(date)
  }
}

#[must_use]
pub fn weekday_labels()
-> [&'static str; 7] {
  WEEKDAY_LABELS
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

#[must_use]
pub fn last_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month).day()
}

/// `date` moved by `days`, or `None`
/// outside chrono's date range.
#[must_use]
pub fn checked_add_days(
  date: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  TimeDelta::try_days(days).and_then(
    |delta| date.checked_add_signed(delta)
  )
}

/// Cursor-sized steps; stays on `date`
/// at the edge of chrono's range.
#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  checked_add_days(date, days)
    .unwrap_or(date)
}

/// Monday on or before `day`.
#[must_use]
pub fn start_of_week(
  day: NaiveDate
) -> NaiveDate {
  let diff = day
    .weekday()
    .num_days_from_monday()
    as i64;
  add_days(day, -diff)
}

/// Sunday on or after `day`.
#[must_use]
pub fn end_of_week(
  day: NaiveDate
) -> NaiveDate {
  add_days(start_of_week(day), 6)
}

/// First day of the month `months`
/// away from the month of `date`.
#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let first = first_day_of_month(
    date.year(),
    date.month()
  );
  checked_shift_months(first, months)
    .unwrap_or(first)
}

fn checked_shift_months(
  first: NaiveDate,
  months: i32
) -> Option<NaiveDate> {
  let step = Months::new(
    months.unsigned_abs()
  );
  if months >= 0 {
    first.checked_add_months(step)
  } else {
    first.checked_sub_months(step)
  }
}

/// `date` moved by whole months, with
/// the day clamped to the target
/// month's length.
#[must_use]
pub fn shift_date_by_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let target =
    shift_months(date, months);
  clamp_day(target, date.day())
    .unwrap_or(target)
}

/// Like [`shift_date_by_months`], but
/// `None` when the target month is
/// outside chrono's date range.
#[must_use]
pub fn checked_shift_date_by_months(
  date: NaiveDate,
  months: i32
) -> Option<NaiveDate> {
  let first = first_day_of_month(
    date.year(),
    date.month()
  );
  let target =
    checked_shift_months(first, months)?;
  clamp_day(target, date.day())
}

fn clamp_day(
  first: NaiveDate,
  day: u32
) -> Option<NaiveDate> {
  first.with_day(day.min(days_in_month(
    first.year(),
    first.month()
  )))
}
