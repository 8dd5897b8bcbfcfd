use chrono::{
  Datelike,
  NaiveDate,
  Utc,
  Weekday
};
use datepick_core::datetime::{
  parse_weekday_list,
  resolve_timezone,
  today_in
};
use datepick_core::{
  DateFormat,
  DateValue
};
use serde::Deserialize;
use yew::{
  AttrValue,
  Callback,
  Html,
  function_component,
  html,
  use_memo,
  use_state
};

use crate::components::DatePicker;

const PICKER_CONFIG_TOML: &str =
  include_str!("../assets/picker.toml");

#[derive(
  Debug, Clone, Default, Deserialize,
)]
struct DemoConfig {
  #[serde(default)]
  version:  u32,
  timezone: Option<String>,
  #[serde(default)]
  single:   PickerSection,
  #[serde(default)]
  range:    PickerSection
}

#[derive(
  Debug, Clone, Default, Deserialize,
)]
struct PickerSection {
  #[serde(default)]
  label:             String,
  placeholder:       Option<String>,
  #[serde(default)]
  format:            DateFormat,
  min:               Option<NaiveDate>,
  max:               Option<NaiveDate>,
  #[serde(default)]
  disabled_weekdays: String
}

fn load_demo_config() -> DemoConfig {
  match toml::from_str::<DemoConfig>(
    PICKER_CONFIG_TOML
  ) {
    | Ok(mut config) => {
      sanitize_demo_config(&mut config);
      tracing::info!(
        version = config.version,
        timezone = ?config.timezone,
        "loaded picker config"
      );
      config
    }
    | Err(error) => {
      tracing::error!(%error, "failed parsing picker config; using defaults");
      let mut config =
        DemoConfig::default();
      sanitize_demo_config(&mut config);
      config
    }
  }
}

fn sanitize_demo_config(
  config: &mut DemoConfig
) {
  if config.version == 0 {
    config.version = 1;
  }
  if config.single.label.trim().is_empty()
  {
    config.single.label =
      "Date".to_string();
  }
  if config.range.label.trim().is_empty()
  {
    config.range.label =
      "Dates".to_string();
  }

  for section in
    [&mut config.single, &mut config.range]
  {
    if let (Some(min), Some(max)) =
      (section.min, section.max)
      && min > max
    {
      tracing::warn!(%min, %max, "picker min is after max; dropping both");
      section.min = None;
      section.max = None;
    }
  }
}

fn weekday_predicate(
  raw: &str
) -> Option<Callback<NaiveDate, bool>>
{
  let weekdays: Vec<Weekday> =
    match parse_weekday_list(raw) {
      | Ok(weekdays) => weekdays,
      | Err(error) => {
        tracing::warn!(%error, "ignoring disabled_weekdays");
        return None;
      }
    };
  if weekdays.is_empty() {
    return None;
  }
  Some(Callback::from(
    move |day: NaiveDate| {
      weekdays.contains(&day.weekday())
    }
  ))
}

fn value_json(value: &DateValue) -> String {
  serde_json::to_string(value)
    .unwrap_or_else(|error| {
      format!("<{error}>")
    })
}

#[function_component(App)]
pub fn app() -> Html {
  let config = use_memo((), |_| {
    load_demo_config()
  });
  let today = {
    let tz = resolve_timezone(
      config.timezone.as_deref()
    );
    today_in(tz, Utc::now())
  };

  let single_value =
    use_state(|| DateValue::empty(false));
  let range_value =
    use_state(|| DateValue::empty(true));

  let on_single_change = {
    let single_value =
      single_value.clone();
    Callback::from(
      move |value: DateValue| {
        tracing::info!(?value, "single date changed");
        single_value.set(value);
      }
    )
  };
  let on_range_change = {
    let range_value =
      range_value.clone();
    Callback::from(
      move |value: DateValue| {
        tracing::info!(?value, "date range changed");
        range_value.set(value);
      }
    )
  };

  let single = &config.single;
  let range = &config.range;

  html! {
    <main class="datepick-demo">
      <h1>{ "datepick" }</h1>
      <p class="today">{ format!("Today: {today}") }</p>
      <section>
        <DatePicker
          value={*single_value}
          on_change={on_single_change}
          format={single.format}
          range={false}
          min_date={single.min}
          max_date={single.max}
          disabled_date={weekday_predicate(&single.disabled_weekdays)}
          label={AttrValue::from(single.label.clone())}
          placeholder={single.placeholder.clone().map(AttrValue::from)}
          today={today}
        />
        <pre>{ value_json(&single_value) }</pre>
      </section>
      <section>
        <DatePicker
          value={*range_value}
          on_change={on_range_change}
          format={range.format}
          range={true}
          min_date={range.min}
          max_date={range.max}
          disabled_date={weekday_predicate(&range.disabled_weekdays)}
          label={AttrValue::from(range.label.clone())}
          placeholder={range.placeholder.clone().map(AttrValue::from)}
          today={today}
        />
        <pre>{ value_json(&range_value) }</pre>
      </section>
    </main>
  }
}
