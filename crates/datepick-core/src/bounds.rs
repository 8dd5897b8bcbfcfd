use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;

type DisabledPredicate =
  Rc<dyn Fn(NaiveDate) -> bool>;

/// Which days may be selected.
///
/// A day is disabled when it falls
/// outside `[min, max]` or when the
/// injected predicate returns true.
#[derive(Clone, Default)]
pub struct DateBounds {
  min:       Option<NaiveDate>,
  max:       Option<NaiveDate>,
  predicate: Option<DisabledPredicate>
}

impl DateBounds {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with_min(
    mut self,
    min: Option<NaiveDate>
  ) -> Self {
    self.min = min;
    self
  }

  #[must_use]
  pub fn with_max(
    mut self,
    max: Option<NaiveDate>
  ) -> Self {
    self.max = max;
    self
  }

  #[must_use]
  pub fn with_predicate<F>(
    mut self,
    predicate: F
  ) -> Self
  where
    F: Fn(NaiveDate) -> bool + 'static
  {
    self.predicate =
      Some(Rc::new(predicate));
    self
  }

  #[must_use]
  pub fn min(
    &self
  ) -> Option<NaiveDate> {
    self.min
  }

  #[must_use]
  pub fn max(
    &self
  ) -> Option<NaiveDate> {
    self.max
  }

  #[must_use]
  pub fn has_predicate(&self) -> bool {
    self.predicate.is_some()
  }

  #[must_use]
  pub fn is_disabled(
    &self,
    date: NaiveDate
  ) -> bool {
    if self.min.is_some_and(|min| {
      date < min
    }) {
      return true;
    }
    if self.max.is_some_and(|max| {
      date > max
    }) {
      return true;
    }
    self
      .predicate
      .as_ref()
      .is_some_and(|predicate| {
        predicate(date)
      })
  }

  /// Nearest enabled day to `date` in
  /// the direction of `step` (in days),
  /// looking at most `limit` steps
  /// away.
  #[must_use]
  pub fn nearest_enabled(
    &self,
    date: NaiveDate,
    step: i64,
    limit: usize
  ) -> Option<NaiveDate> {
    let mut current = date;
    for _ in 0..=limit {
      if !self.is_disabled(current) {
        return Some(current);
      }
      current = current
        .checked_add_signed(
          chrono::Duration::days(step)
        )?;
    }
    None
  }
}

impl fmt::Debug for DateBounds {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("DateBounds")
      .field("min", &self.min)
      .field("max", &self.max)
      .field(
        "predicate",
        &self.predicate.is_some()
      )
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Datelike,
    NaiveDate,
    Weekday
  };

  use super::DateBounds;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn unbounded_allows_everything() {
    let bounds = DateBounds::new();
    assert!(
      !bounds.is_disabled(NaiveDate::MIN)
    );
    assert!(
      !bounds.is_disabled(NaiveDate::MAX)
    );
  }

  #[test]
  fn min_and_max_are_inclusive() {
    let bounds = DateBounds::new()
      .with_min(Some(date(2024, 3, 5)))
      .with_max(Some(date(2024, 3, 10)));
    assert!(
      bounds.is_disabled(date(2024, 3, 4))
    );
    assert!(
      !bounds.is_disabled(date(2024, 3, 5))
    );
    assert!(
      !bounds
        .is_disabled(date(2024, 3, 10))
    );
    assert!(
      bounds
        .is_disabled(date(2024, 3, 11))
    );
  }

  #[test]
  fn predicate_disables_matching_days() {
    let bounds = DateBounds::new()
      .with_predicate(|day| {
        matches!(
          day.weekday(),
          Weekday::Sat | Weekday::Sun
        )
      });
    assert!(
      bounds.is_disabled(date(2024, 3, 9))
    );
    assert!(
      !bounds.is_disabled(date(2024, 3, 8))
    );
  }

  #[test]
  fn nearest_enabled_skips_disabled_days()
  {
    let bounds = DateBounds::new()
      .with_predicate(|day| {
        day.weekday() == Weekday::Sat
          || day.weekday() == Weekday::Sun
      });
    assert_eq!(
      bounds.nearest_enabled(
        date(2024, 3, 9),
        1,
        7
      ),
      Some(date(2024, 3, 11))
    );
    assert_eq!(
      bounds.nearest_enabled(
        date(2024, 3, 9),
        -1,
        7
      ),
      Some(date(2024, 3, 8))
    );
    assert_eq!(
      DateBounds::new()
        .with_min(Some(date(2024, 3, 20)))
        .nearest_enabled(
          date(2024, 3, 9),
          -1,
          7
        ),
      None
    );
  }
}
