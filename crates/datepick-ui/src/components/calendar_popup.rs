use chrono::NaiveDate;
use datepick_core::DayCell;
use datepick_core::grid::weekday_labels;
use web_sys::{
  KeyboardEvent,
  MouseEvent
};
use yew::{
  Callback,
  Classes,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct CalendarPopupProps {
  pub title:        String,
  pub cells:        Vec<DayCell>,
  pub on_prev:      Callback<()>,
  pub on_next:      Callback<()>,
  pub on_day_click: Callback<NaiveDate>,
  pub on_day_hover:
    Callback<Option<NaiveDate>>,
  pub on_key:       Callback<KeyboardEvent>
}

pub(crate) fn day_cell_classes(
  cell: &DayCell
) -> Classes {
  classes!(
    "date-picker-day",
    (!cell.in_month).then_some("outside"),
    cell.disabled.then_some("disabled"),
    cell
      .is_selected()
      .then_some("selected"),
    cell.is_start.then_some("range-start"),
    cell.is_end.then_some("range-end"),
    cell.in_range.then_some("in-range"),
    cell
      .in_preview
      .then_some("in-preview"),
    cell.is_today.then_some("today"),
    cell.is_focused.then_some("focused")
  )
}

fn day_button(
  cell: &DayCell,
  on_day_click: &Callback<NaiveDate>,
  on_day_hover: &Callback<
    Option<NaiveDate>
  >
) -> Html {
  let day = cell.date;
  let onclick = {
    let on_day_click =
      on_day_click.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_day_click.emit(day);
      }
    )
  };
  let onmouseenter = {
    let on_day_hover =
      on_day_hover.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_day_hover.emit(Some(day));
      }
    )
  };

  html! {
    <button
      key={day.to_string()}
      type="button"
      role="gridcell"
      class={day_cell_classes(cell)}
      data-date={day.to_string()}
      tabindex={if cell.is_focused { "0" } else { "-1" }}
      aria-label={day.format("%A, %-d %B %Y").to_string()}
      aria-disabled={cell.disabled.to_string()}
      aria-selected={cell.is_selected().to_string()}
      aria-current={cell.is_today.then_some("date")}
      {onclick}
      {onmouseenter}
    >
      { day.format("%-d").to_string() }
    </button>
  }
}

#[function_component(CalendarPopup)]
pub fn calendar_popup(
  props: &CalendarPopupProps
) -> Html {
  let on_prev = {
    let on_prev = props.on_prev.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_prev.emit(());
      }
    )
  };
  let on_next = {
    let on_next = props.on_next.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_next.emit(());
      }
    )
  };
  let on_grid_leave = {
    let on_day_hover =
      props.on_day_hover.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_day_hover.emit(None);
      }
    )
  };
  let onkeydown = {
    let on_key = props.on_key.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        on_key.emit(event);
      }
    )
  };

  html! {
    <div
      class="date-picker-popup"
      role="dialog"
      aria-label={props.title.clone()}
      {onkeydown}
    >
      <div class="date-picker-header">
        <button
          type="button"
          class="date-picker-nav prev"
          aria-label="Previous month"
          onclick={on_prev}
        >
          { "‹" }
        </button>
        <span class="date-picker-title" aria-live="polite">
          { props.title.clone() }
        </span>
        <button
          type="button"
          class="date-picker-nav next"
          aria-label="Next month"
          onclick={on_next}
        >
          { "›" }
        </button>
      </div>
      <div class="date-picker-weekdays" role="row">
        { for weekday_labels().iter().map(|label| html! {
          <span role="columnheader">{ *label }</span>
        }) }
      </div>
      <div
        class="date-picker-grid"
        role="grid"
        onmouseleave={on_grid_leave}
      >
        { for props.cells.iter().map(|cell| {
          day_button(cell, &props.on_day_click, &props.on_day_hover)
        }) }
      </div>
    </div>
  }
}
