use std::cell::RefCell;
use std::rc::Rc;

use chrono::{
  NaiveDate,
  Utc
};
use datepick_core::picker::DatePicker as HeadlessPicker;
use datepick_core::{
  DateBounds,
  DateFormat,
  DateValue,
  Key,
  PickerOptions,
  PickerState
};
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{
  Element,
  FocusEvent,
  HtmlElement,
  KeyboardEvent,
  MouseEvent,
  Node
};
use yew::{
  AttrValue,
  Callback,
  Html,
  NodeRef,
  Properties,
  Reducible,
  UseReducerHandle,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_node_ref,
  use_reducer
};

use super::CalendarPopup;

#[derive(Properties, PartialEq)]
pub struct DatePickerProps {
  #[prop_or_default]
  pub value:         DateValue,
  pub on_change:     Callback<DateValue>,
  #[prop_or_default]
  pub format:        DateFormat,
  #[prop_or_default]
  pub range:         bool,
  #[prop_or_default]
  pub min_date:      Option<NaiveDate>,
  #[prop_or_default]
  pub max_date:      Option<NaiveDate>,
  /// Extra rule marking days as not
  /// selectable.
  #[prop_or_default]
  pub disabled_date:
    Option<Callback<NaiveDate, bool>>,
  #[prop_or(AttrValue::Static("Date"))]
  pub label:         AttrValue,
  #[prop_or_default]
  pub placeholder:   Option<AttrValue>,
  /// Defaults to the UTC date.
  #[prop_or_default]
  pub today:         Option<NaiveDate>
}

#[derive(Debug, Clone, PartialEq)]
struct PickerModel(PickerState);

enum PickerAction {
  Replace(PickerState),
  Sync {
    value: DateValue,
    range: bool
  },
  OutsidePointerDown
}

impl Reducible for PickerModel {
  type Action = PickerAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let next = match action {
      | PickerAction::Replace(state) => {
        state
      }
      | PickerAction::Sync {
        value,
        range
      } => {
        let mut picker =
          headless(range, self.0);
        picker.set_value(value);
        picker.into_state()
      }
      | PickerAction::OutsidePointerDown => {
        if !self.0.popup.is_open() {
          return self;
        }
        let mut picker = headless(
          self.0.value.is_range(),
          self.0
        );
        picker.outside_pointer_down();
        picker.into_state()
      }
    };

    if next == self.0 {
      self
    } else {
      Rc::new(Self(next))
    }
  }
}

/// A picker carrying only the mode,
/// enough for transitions that never
/// consult bounds or formatting.
fn headless(
  range: bool,
  state: PickerState
) -> HeadlessPicker {
  HeadlessPicker::with_state(
    PickerOptions {
      range,
      ..PickerOptions::default()
    },
    state
  )
}

fn picker_options(
  props: &DatePickerProps
) -> PickerOptions {
  let mut bounds = DateBounds::new()
    .with_min(props.min_date)
    .with_max(props.max_date);
  if let Some(disabled) =
    props.disabled_date.clone()
  {
    bounds = bounds.with_predicate(
      move |day| disabled.emit(day)
    );
  }

  PickerOptions {
    format: props.format,
    range: props.range,
    bounds,
    label: props.label.to_string(),
    placeholder: props
      .placeholder
      .as_ref()
      .map(ToString::to_string)
      .unwrap_or_else(|| {
        props
          .format
          .placeholder(props.range)
      })
  }
}

/// Runs one picker operation against
/// the current state, stores the result
/// and forwards any committed value.
/// Returns whether the operation closed
/// the popup.
fn update(
  handle: &UseReducerHandle<PickerModel>,
  options: &PickerOptions,
  on_change: &Callback<DateValue>,
  op: impl FnOnce(
    &mut HeadlessPicker
  ) -> Option<DateValue>
) -> bool {
  let before = handle.0;
  let mut picker =
    HeadlessPicker::with_state(
      options.clone(),
      before
    );
  let changed = op(&mut picker);
  let after = picker.into_state();
  handle.dispatch(PickerAction::Replace(
    after
  ));
  if let Some(value) = changed {
    tracing::debug!(?value, "date picker change");
    on_change.emit(value);
  }
  closed_by(&before, &after)
}

fn closed_by(
  before: &PickerState,
  after: &PickerState
) -> bool {
  before.popup.is_open()
    && !after.popup.is_open()
}

/// Moves DOM focus back to the input
/// after the popup closed under it.
/// `refocusing` keeps the input's focus
/// handler from reopening the popup.
fn return_focus(
  input: &NodeRef,
  refocusing: &RefCell<bool>
) {
  let Some(input) =
    input.cast::<HtmlElement>()
  else {
    return;
  };
  *refocusing.borrow_mut() = true;
  if let Err(error) = input.focus() {
    tracing::trace!(?error, "could not focus date input");
  }
  *refocusing.borrow_mut() = false;
}

fn is_inside(
  container: &NodeRef,
  target: Option<&Node>
) -> bool {
  match (
    container.cast::<Element>(),
    target
  ) {
    | (Some(root), Some(node)) => {
      root.contains(Some(node))
    }
    | _ => false
  }
}

#[function_component(DatePicker)]
pub fn date_picker(
  props: &DatePickerProps
) -> Html {
  let today = props
    .today
    .unwrap_or_else(|| {
      Utc::now().date_naive()
    });
  let options = picker_options(props);
  let state = {
    let value =
      props.value.coerce(props.range);
    use_reducer(move || {
      PickerModel(PickerState::new(
        value, today
      ))
    })
  };
  let container = use_node_ref();
  let input = use_node_ref();
  let refocusing = use_mut_ref(|| false);

  {
    let state = state.clone();
    use_effect_with(
      (props.value, props.range),
      move |(value, range)| {
        state.dispatch(PickerAction::Sync {
          value: *value,
          range: *range
        });
      }
    );
  }

  {
    let state = state.clone();
    let container = container.clone();
    use_effect_with((), move |_| {
      let listener = web_sys::window()
        .and_then(|window| {
          window.document()
        })
        .map(|document| {
          EventListener::new(
            &document,
            "pointerdown",
            move |event| {
              let target = event
                .target()
                .and_then(|target| {
                  target
                    .dyn_into::<Node>()
                    .ok()
                });
              if !is_inside(
                &container,
                target.as_ref()
              ) {
                state.dispatch(
                  PickerAction::OutsidePointerDown
                );
              }
            }
          )
        });
      tracing::debug!(
        attached = listener.is_some(),
        "outside pointer listener"
      );
      move || drop(listener)
    });
  }

  let picker = HeadlessPicker::with_state(
    options.clone(),
    state.0
  );
  let is_open = picker.is_open();
  let focus = picker.focus();

  {
    let container = container.clone();
    use_effect_with(
      (is_open, focus),
      move |(is_open, focus)| {
        if *is_open
          && let Some(day) = *focus
          && let Some(root) =
            container.cast::<Element>()
          && let Ok(Some(cell)) = root
            .query_selector(&format!(
              "[data-date=\"{day}\"]"
            ))
          && let Ok(cell) =
            cell.dyn_into::<HtmlElement>()
          && let Err(error) = cell.focus()
        {
          tracing::trace!(%day, ?error, "could not focus day cell");
        }
      }
    );
  }

  let on_input_focus = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    let refocusing = refocusing.clone();
    Callback::from(
      move |_: FocusEvent| {
        if *refocusing.borrow() {
          return;
        }
        update(
          &state,
          &options,
          &on_change,
          |picker| {
            picker.focus_input(today);
            None
          }
        );
      }
    )
  };
  let on_input_click = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(
      move |_: MouseEvent| {
        update(
          &state,
          &options,
          &on_change,
          |picker| {
            picker.click_input(today);
            None
          }
        );
      }
    )
  };
  let on_input_key = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        let key =
          Key::from_dom(&event.key());
        if key == Key::Other {
          return;
        }
        event.prevent_default();
        update(
          &state,
          &options,
          &on_change,
          |picker| {
            picker.handle_key(key, today)
          }
        );
      }
    )
  };
  // Enter and Space reach the focused
  // day button as a native click.
  let on_popup_key = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    let input = input.clone();
    let refocusing = refocusing.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        let key =
          Key::from_dom(&event.key());
        if key == Key::Other
          || key.activates()
        {
          return;
        }
        event.prevent_default();
        event.stop_propagation();
        if update(
          &state,
          &options,
          &on_change,
          |picker| {
            picker.handle_key(key, today)
          }
        ) {
          return_focus(&input, &refocusing);
        }
      }
    )
  };
  let on_prev = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(move |()| {
      update(
        &state,
        &options,
        &on_change,
        |picker| {
          picker.prev_month();
          None
        }
      );
    })
  };
  let on_next = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(move |()| {
      update(
        &state,
        &options,
        &on_change,
        |picker| {
          picker.next_month();
          None
        }
      );
    })
  };
  let on_day_click = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    let input = input.clone();
    let refocusing = refocusing.clone();
    Callback::from(
      move |day: NaiveDate| {
        if update(
          &state,
          &options,
          &on_change,
          |picker| picker.click_day(day)
        ) {
          return_focus(&input, &refocusing);
        }
      }
    )
  };
  let on_day_hover = {
    let state = state.clone();
    let options = options.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(
      move |day: Option<NaiveDate>| {
        if !options.range {
          return;
        }
        update(
          &state,
          &options,
          &on_change,
          |picker| {
            picker.hover_day(day);
            None
          }
        );
      }
    )
  };

  let text = picker.display_text();

  html! {
    <div class="date-picker" ref={container}>
      <label class="date-picker-label">
        <span>{ props.label.clone() }</span>
        <input
          ref={input}
          class="date-picker-input"
          type="text"
          readonly=true
          value={text}
          placeholder={options.placeholder.clone()}
          aria-haspopup="dialog"
          aria-expanded={is_open.to_string()}
          onfocus={on_input_focus}
          onclick={on_input_click}
          onkeydown={on_input_key}
        />
      </label>
      if is_open {
        <CalendarPopup
          title={picker.view().title()}
          cells={picker.cells(today)}
          on_prev={on_prev}
          on_next={on_next}
          on_day_click={on_day_click}
          on_day_hover={on_day_hover}
          on_key={on_popup_key}
        />
      }
    </div>
  }
}
