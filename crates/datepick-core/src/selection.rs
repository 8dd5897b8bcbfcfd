//! Click handling for single and range
//! selection.

use chrono::NaiveDate;
use tracing::debug;

use crate::bounds::DateBounds;
use crate::value::{
  DateValue,
  SelectionPhase
};

/// Result of clicking a day.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClickOutcome {
  /// The day was disabled; nothing
  /// changes and no change event fires.
  Ignored,
  Committed {
    value: DateValue,
    /// The popup should close.
    close: bool
  }
}

impl ClickOutcome {
  #[must_use]
  pub fn value(
    &self
  ) -> Option<DateValue> {
    match *self {
      | Self::Ignored => None,
      | Self::Committed {
        value, ..
      } => Some(value)
    }
  }

  #[must_use]
  pub fn closes(&self) -> bool {
    matches!(
      self,
      Self::Committed { close: true, .. }
    )
  }
}

/// Applies a click on `clicked` to the
/// current value. The value's variant
/// decides between single and range
/// mode.
///
/// In range mode a click with no start,
/// or on top of a complete range, starts
/// a new range and keeps the popup open.
/// A click with only the start set
/// completes the range in date order and
/// closes.
#[tracing::instrument(
  level = "debug",
  skip(bounds)
)]
pub fn apply_click(
  current: &DateValue,
  clicked: NaiveDate,
  bounds: &DateBounds
) -> ClickOutcome {
  if bounds.is_disabled(clicked) {
    debug!(%clicked, "ignoring click on disabled day");
    return ClickOutcome::Ignored;
  }

  if !current.is_range() {
    return ClickOutcome::Committed {
      value: DateValue::single(clicked),
      close: true
    };
  }

  match (current.phase(), current.start())
  {
    | (
      SelectionPhase::Anchored,
      Some(start)
    ) => ClickOutcome::Committed {
      value: DateValue::range(
        Some(start),
        Some(clicked)
      ),
      close: true
    },
    | _ => ClickOutcome::Committed {
      value: DateValue::range(
        Some(clicked),
        None
      ),
      close: false
    }
  }
}
