//! Headless date-picker controller.
//!
//! [`DatePicker`] owns the picker state
//! and turns input events into state
//! changes. Methods that can commit a
//! selection return the new
//! [`DateValue`]; callers forward it to
//! whatever change callback they hold.
//! Everything shown on screen is derived
//! from the state on each render.

use chrono::NaiveDate;
use tracing::{
  debug,
  trace
};

use crate::bounds::DateBounds;
use crate::cell::{
  CellContext,
  DayCell,
  build_cells
};
use crate::format::DateFormat;
use crate::grid::{
  ViewMonth,
  add_days,
  end_of_week,
  shift_date_by_months,
  start_of_week
};
use crate::popup::{
  Key,
  PopupEvent,
  PopupState
};
use crate::selection::{
  ClickOutcome,
  apply_click
};
use crate::value::DateValue;

/// How far forward to look for an
/// enabled day to put the cursor on
/// when opening an empty picker.
const OPEN_FOCUS_SEARCH_DAYS: usize = 366;

/// Configuration fixed for the lifetime
/// of a picker.
#[derive(Debug, Clone)]
pub struct PickerOptions {
  pub format:      DateFormat,
  pub range:       bool,
  pub bounds:      DateBounds,
  pub label:       String,
  pub placeholder: String
}

impl Default for PickerOptions {
  fn default() -> Self {
    let format = DateFormat::default();
    Self {
      format,
      range: false,
      bounds: DateBounds::new(),
      label: "Date".to_string(),
      placeholder: format
        .as_key()
        .to_string()
    }
  }
}

/// Mutable picker state.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct PickerState {
  pub value: DateValue,
  pub view:  ViewMonth,
  pub popup: PopupState,
  /// Keyboard cursor inside the grid.
  pub focus: Option<NaiveDate>,
  pub hover: Option<NaiveDate>
}

impl PickerState {
  #[must_use]
  pub fn new(
    value: DateValue,
    today: NaiveDate
  ) -> Self {
    Self {
      value,
      view: ViewMonth::containing(
        value.anchor().unwrap_or(today)
      ),
      popup: PopupState::Closed,
      focus: None,
      hover: None
    }
  }
}

#[derive(Debug, Clone)]
pub struct DatePicker {
  options: PickerOptions,
  state:   PickerState
}

impl DatePicker {
  #[must_use]
  pub fn new(
    options: PickerOptions,
    value: DateValue,
    today: NaiveDate
  ) -> Self {
    let value = value.coerce(options.range);
    Self {
      state: PickerState::new(
        value, today
      ),
      options
    }
  }

  /// Rebuilds a picker around state kept
  /// elsewhere, e.g. in a UI framework's
  /// state hook.
  #[must_use]
  pub fn with_state(
    options: PickerOptions,
    mut state: PickerState
  ) -> Self {
    state.value =
      state.value.coerce(options.range);
    Self { options, state }
  }

  #[must_use]
  pub fn options(&self) -> &PickerOptions {
    &self.options
  }

  #[must_use]
  pub fn state(&self) -> &PickerState {
    &self.state
  }

  #[must_use]
  pub fn into_state(self) -> PickerState {
    self.state
  }

  #[must_use]
  pub fn value(&self) -> DateValue {
    self.state.value
  }

  #[must_use]
  pub fn view(&self) -> ViewMonth {
    self.state.view
  }

  #[must_use]
  pub fn popup(&self) -> PopupState {
    self.state.popup
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    self.state.popup.is_open()
  }

  #[must_use]
  pub fn focus(
    &self
  ) -> Option<NaiveDate> {
    self.state.focus
  }

  /// Text for the read-only input.
  #[must_use]
  pub fn display_text(&self) -> String {
    self
      .options
      .format
      .format_value(&self.state.value)
  }

  /// Replaces the value from outside,
  /// e.g. when a parent passes a new
  /// one in. Never fires a change event.
  pub fn set_value(
    &mut self,
    value: DateValue
  ) {
    let value =
      value.coerce(self.options.range);
    if value == self.state.value {
      return;
    }
    debug!(?value, "value replaced externally");
    self.state.value = value;
    if let Some(anchor) = value.anchor() {
      self.state.view =
        ViewMonth::containing(anchor);
    }
  }

  pub fn focus_input(
    &mut self,
    today: NaiveDate
  ) {
    self.dispatch_popup(
      PopupEvent::InputFocus,
      today
    );
  }

  pub fn click_input(
    &mut self,
    today: NaiveDate
  ) {
    self.dispatch_popup(
      PopupEvent::InputClick,
      today
    );
  }

  /// Opens the popup on the value's
  /// month, or on today's.
  pub fn open(
    &mut self,
    today: NaiveDate
  ) {
    let anchor = self.state.value.anchor();
    let focus = anchor.unwrap_or_else(|| {
      self
        .options
        .bounds
        .nearest_enabled(
          today,
          1,
          OPEN_FOCUS_SEARCH_DAYS
        )
        .unwrap_or(today)
    });
    self.state.popup = PopupState::Open;
    self.state.view =
      ViewMonth::containing(focus);
    self.state.focus = Some(focus);
    self.state.hover = None;
    debug!(view = %self.state.view, %focus, "popup opened");
  }

  pub fn close(&mut self) {
    if !self.is_open() {
      return;
    }
    self.state.popup = PopupState::Closed;
    self.state.focus = None;
    self.state.hover = None;
    debug!("popup closed");
  }

  /// Pointer-down outside the picker.
  /// Closes without touching the value.
  pub fn outside_pointer_down(&mut self) {
    self.finish(
      PopupEvent::OutsidePointerDown
    );
  }

  pub fn prev_month(&mut self) {
    self.state.view = self.state.view.prev();
    trace!(view = %self.state.view, "previous month");
  }

  pub fn next_month(&mut self) {
    self.state.view = self.state.view.next();
    trace!(view = %self.state.view, "next month");
  }

  pub fn hover_day(
    &mut self,
    day: Option<NaiveDate>
  ) {
    self.state.hover = day;
  }

  /// Clicks a day in the grid. Returns
  /// the new value when the click
  /// committed one.
  pub fn click_day(
    &mut self,
    day: NaiveDate
  ) -> Option<DateValue> {
    let outcome = apply_click(
      &self.state.value,
      day,
      &self.options.bounds
    );
    let ClickOutcome::Committed {
      value,
      close
    } = outcome
    else {
      return None;
    };

    debug!(?value, close, "selection committed");
    self.state.value = value;
    self.state.focus = Some(day);
    self.state.hover = None;
    if close {
      self.finish(
        PopupEvent::SelectionFinished
      );
    }
    Some(value)
  }

  /// Keyboard input while the picker has
  /// focus. A closed popup only reacts
  /// to the entry keys; an open one moves
  /// the cursor, selects, or closes.
  pub fn handle_key(
    &mut self,
    key: Key,
    today: NaiveDate
  ) -> Option<DateValue> {
    if !self.is_open() {
      self.dispatch_popup(
        PopupEvent::Key(key),
        today
      );
      return None;
    }

    if key == Key::Escape {
      self.finish(PopupEvent::Key(key));
      return None;
    }

    let cursor = self
      .state
      .focus
      .unwrap_or_else(|| {
        self.state.view.first_day()
      });

    if key.activates() {
      return self.click_day(cursor);
    }

    let moved = match key {
      | Key::ArrowLeft => {
        add_days(cursor, -1)
      }
      | Key::ArrowRight => {
        add_days(cursor, 1)
      }
      | Key::ArrowUp => add_days(cursor, -7),
      | Key::ArrowDown => {
        add_days(cursor, 7)
      }
      | Key::PageUp => {
        shift_date_by_months(cursor, -1)
      }
      | Key::PageDown => {
        shift_date_by_months(cursor, 1)
      }
      | Key::Home => start_of_week(cursor),
      | Key::End => end_of_week(cursor),
      | _ => return None
    };
    self.move_focus(moved);
    None
  }

  /// Cells for the current render.
  #[must_use]
  pub fn cells(
    &self,
    today: NaiveDate
  ) -> Vec<DayCell> {
    let open = self.is_open();
    build_cells(&CellContext {
      view: self.state.view,
      value: &self.state.value,
      bounds: &self.options.bounds,
      today,
      hover: self
        .state
        .hover
        .filter(|_| open),
      focus: self
        .state
        .focus
        .filter(|_| open)
    })
  }

  fn move_focus(
    &mut self,
    day: NaiveDate
  ) {
    self.state.focus = Some(day);
    if self.options.range {
      self.state.hover = Some(day);
    }
    if !self.state.view.contains(day) {
      self.state.view =
        ViewMonth::containing(day);
    }
    trace!(focus = %day, "cursor moved");
  }

  /// Applies an event that can only
  /// close the popup.
  fn finish(
    &mut self,
    event: PopupEvent
  ) {
    if !self
      .state
      .popup
      .transition(event)
      .is_open()
    {
      self.close();
    }
  }

  fn dispatch_popup(
    &mut self,
    event: PopupEvent,
    today: NaiveDate
  ) {
    let before = self.state.popup;
    let after = before.transition(event);
    if before == after {
      return;
    }
    match after {
      | PopupState::Open => {
        self.open(today)
      }
      | PopupState::Closed => self.close()
    }
  }
}
