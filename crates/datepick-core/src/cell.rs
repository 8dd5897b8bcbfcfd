use chrono::NaiveDate;
use serde::Serialize;

use crate::bounds::DateBounds;
use crate::grid::ViewMonth;
use crate::value::{
  DateValue,
  SelectionPhase
};

/// One day button of the popup grid.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct DayCell {
  pub date:       NaiveDate,
  pub in_month:   bool,
  pub disabled:   bool,
  /// Single value, or range start.
  pub is_start:   bool,
  /// Single value, or range end.
  pub is_end:     bool,
  pub in_range:   bool,
  /// Between the range start and the
  /// hovered day while the range is
  /// still open.
  pub in_preview: bool,
  pub is_today:   bool,
  pub is_focused: bool
}

impl DayCell {
  #[must_use]
  pub fn is_selected(&self) -> bool {
    self.is_start || self.is_end
  }
}

/// Inputs to a render pass of the grid.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
  pub view:   ViewMonth,
  pub value:  &'a DateValue,
  pub bounds: &'a DateBounds,
  pub today:  NaiveDate,
  pub hover:  Option<NaiveDate>,
  pub focus:  Option<NaiveDate>
}

/// Derives the 42 cells for a render.
#[must_use]
pub fn build_cells(
  ctx: &CellContext<'_>
) -> Vec<DayCell> {
  let preview = preview_span(ctx);

  ctx
    .view
    .grid()
    .into_iter()
    .map(|date| {
      DayCell {
        date,
        in_month: ctx.view.contains(date),
        disabled: ctx
          .bounds
          .is_disabled(date),
        is_start: ctx.value.start()
          == Some(date),
        is_end: ctx.value.end()
          == Some(date),
        in_range: ctx.value.spans(date),
        in_preview: preview.is_some_and(
          |(from, to)| {
            from <= date && date <= to
          }
        ),
        is_today: date == ctx.today,
        is_focused: ctx.focus
          == Some(date)
      }
    })
    .collect()
}

fn preview_span(
  ctx: &CellContext<'_>
) -> Option<(NaiveDate, NaiveDate)> {
  if !ctx.value.is_range()
    || ctx.value.phase()
      != SelectionPhase::Anchored
  {
    return None;
  }
  let start = ctx.value.start()?;
  let hover = ctx.hover?;
  Some(if hover < start {
    (hover, start)
  } else {
    (start, hover)
  })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    CellContext,
    build_cells
  };
  use crate::bounds::DateBounds;
  use crate::grid::ViewMonth;
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
  fn flags_range_today_and_month() {
    let value = DateValue::range(
      Some(date(2024, 3, 5)),
      Some(date(2024, 3, 7))
    );
    let bounds = DateBounds::new()
      .with_min(Some(date(2024, 3, 2)));
    let cells =
      build_cells(&CellContext {
        view:   ViewMonth::containing(
          date(2024, 3, 1)
        ),
        value:  &value,
        bounds: &bounds,
        today:  date(2024, 3, 6),
        hover:  None,
        focus:  Some(date(2024, 3, 6))
      });

    assert_eq!(cells.len(), 42);
    let find = |day: NaiveDate| {
      cells
        .iter()
        .find(|cell| cell.date == day)
        .copied()
        .expect("cell present")
    };

    let leading = find(date(2024, 2, 26));
    assert!(!leading.in_month);
    assert!(leading.disabled);

    let start = find(date(2024, 3, 5));
    assert!(start.is_start && !start.is_end);
    assert!(start.in_range);

    let middle = find(date(2024, 3, 6));
    assert!(middle.in_range);
    assert!(middle.is_today);
    assert!(middle.is_focused);
    assert!(!middle.is_selected());

    let end = find(date(2024, 3, 7));
    assert!(end.is_end && end.in_range);
    assert!(!find(date(2024, 3, 8)).in_range);
  }

  #[test]
  fn single_value_marks_both_ends_without_range()
  {
    let value =
      DateValue::single(date(2024, 3, 5));
    let bounds = DateBounds::new();
    let cells =
      build_cells(&CellContext {
        view:   ViewMonth::containing(
          date(2024, 3, 1)
        ),
        value:  &value,
        bounds: &bounds,
        today:  date(2024, 1, 1),
        hover:  None,
        focus:  None
      });
    let selected = cells
      .iter()
      .filter(|cell| cell.is_selected())
      .collect::<Vec<_>>();
    assert_eq!(selected.len(), 1);
    assert!(
      selected[0].is_start
        && selected[0].is_end
    );
    assert!(
      cells.iter().all(|cell| !cell.in_range)
    );
  }

  #[test]
  fn hover_previews_open_range_backwards() {
    let value = DateValue::range(
      Some(date(2024, 3, 10)),
      None
    );
    let bounds = DateBounds::new();
    let cells =
      build_cells(&CellContext {
        view:   ViewMonth::containing(
          date(2024, 3, 1)
        ),
        value:  &value,
        bounds: &bounds,
        today:  date(2024, 1, 1),
        hover:  Some(date(2024, 3, 8)),
        focus:  None
      });
    let previewed = cells
      .iter()
      .filter(|cell| cell.in_preview)
      .map(|cell| cell.date)
      .collect::<Vec<_>>();
    assert_eq!(
      previewed,
      vec![
        date(2024, 3, 8),
        date(2024, 3, 9),
        date(2024, 3, 10)
      ]
    );
  }
}
