use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};

/// The picker's committed value.
///
/// Range values keep `start <= end`
/// whenever both ends are present; use
/// [`DateValue::range`] to build one.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(
  tag = "mode",
  rename_all = "snake_case"
)]
pub enum DateValue {
  Single {
    date: Option<NaiveDate>
  },
  Range {
    start: Option<NaiveDate>,
    end:   Option<NaiveDate>
  }
}

/// Where a value sits in the selection
/// state machine.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SelectionPhase {
  Empty,
  /// A single date, or a range with
  /// only its start chosen.
  Anchored,
  /// A range with both ends chosen.
  Complete
}

impl Default for DateValue {
  fn default() -> Self {
    Self::Single { date: None }
  }
}

impl DateValue {
  #[must_use]
  pub fn empty(range: bool) -> Self {
    if range {
      Self::Range {
        start: None,
        end:   None
      }
    } else {
      Self::Single { date: None }
    }
  }

  #[must_use]
  pub fn single(
    date: NaiveDate
  ) -> Self {
    Self::Single { date: Some(date) }
  }

  /// Builds a range, swapping the ends
  /// when they arrive out of order.
  #[must_use]
  pub fn range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>
  ) -> Self {
    match (start, end) {
      | (Some(a), Some(b)) if b < a => {
        Self::Range {
          start: Some(b),
          end:   Some(a)
        }
      }
      | (None, Some(only)) => {
        Self::Range {
          start: Some(only),
          end:   None
        }
      }
      | _ => Self::Range { start, end }
    }
  }

  #[must_use]
  pub fn is_range(&self) -> bool {
    matches!(self, Self::Range { .. })
  }

  /// The single date, or the range
  /// start.
  #[must_use]
  pub fn start(
    &self
  ) -> Option<NaiveDate> {
    match *self {
      | Self::Single { date } => date,
      | Self::Range { start, .. } => {
        start
      }
    }
  }

  /// The single date, or the range
  /// end.
  #[must_use]
  pub fn end(
    &self
  ) -> Option<NaiveDate> {
    match *self {
      | Self::Single { date } => date,
      | Self::Range { end, .. } => end
    }
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.phase()
      == SelectionPhase::Empty
  }

  #[must_use]
  pub fn phase(&self) -> SelectionPhase {
    match *self {
      | Self::Single { date: None }
      | Self::Range {
        start: None,
        end: None
      } => SelectionPhase::Empty,
      | Self::Range {
        start: Some(_),
        end: Some(_)
      } => SelectionPhase::Complete,
      | _ => SelectionPhase::Anchored
    }
  }

  /// Whether `date` lies between the
  /// range ends, inclusive. Always
  /// false for single values and
  /// incomplete ranges.
  #[must_use]
  pub fn spans(
    &self,
    date: NaiveDate
  ) -> bool {
    match *self {
      | Self::Range {
        start: Some(start),
        end: Some(end)
      } => start <= date && date <= end,
      | _ => false
    }
  }

  /// Date the popup should open on.
  #[must_use]
  pub fn anchor(
    &self
  ) -> Option<NaiveDate> {
    self.start().or(self.end())
  }

  /// Converts the value to the given
  /// mode. A single date becomes a range
  /// start; a range collapses to its
  /// start.
  #[must_use]
  pub fn coerce(
    self,
    range: bool
  ) -> Self {
    match (self, range) {
      | (
        Self::Range { start, end },
        true
      ) => Self::range(start, end),
      | (Self::Single { date }, true) => {
        Self::range(date, None)
      }
      | (Self::Range { .. }, false) => {
        Self::Single {
          date: self.anchor()
        }
      }
      | (single, false) => single
    }
  }
}
