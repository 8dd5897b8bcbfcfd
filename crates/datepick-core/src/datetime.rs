use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;

use crate::format::{
  DateFormat,
  ensure_formattable
};
use crate::grid::{
  add_days,
  checked_add_days,
  checked_shift_date_by_months,
  first_day_of_month
};

const TIMEZONE_ENV_VAR: &str =
  "DATEPICK_TIMEZONE";

/// Timezone used to decide what "today"
/// is. The environment wins over the
/// config value; both fall back to UTC.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) = parse_timezone(
      &raw,
      TIMEZONE_ENV_VAR
    )
  {
    return tz;
  }

  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  chrono_tz::UTC
}

#[must_use]
pub fn today_in(
  tz: Tz,
  now: DateTime<Utc>
) -> NaiveDate {
  now.with_timezone(&tz).date_naive()
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "configured timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Resolves a date expression relative
/// to `today`.
///
/// Results outside the four-digit year
/// range are errors.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_date_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  resolve_date_expr(input, today)
    .and_then(ensure_formattable)
}

fn resolve_date_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" | "now" => return Ok(today),
    | "tomorrow" | "yesterday" => {
      let step =
        if lower == "tomorrow" { 1 } else { -1 };
      return checked_add_days(today, step)
        .ok_or_else(|| {
          anyhow!(
            "{token} is outside the \
             supported date range"
          )
        });
    }
    | _ => {}
  }

  if let Some(target) =
    parse_weekday_name(&lower)
  {
    return Ok(next_weekday_date(
      today, target
    ));
  }

  if let Some(month) =
    parse_month_name(&lower)
  {
    let mut year = today.year();
    if first_day_of_month(year, month)
      <= today
    {
      year = year.saturating_add(1);
    }
    return Ok(first_day_of_month(
      year, month
    ));
  }

  let rel_re = Regex::new(
    r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwmy])$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;

  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let negative = caps
      .name("sign")
      .is_some_and(|m| m.as_str() == "-");
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let num =
      if negative { -num } else { num };
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative unit")
      })?;

    let too_large = || {
      anyhow!(
        "relative offset too large: \
         {token}"
      )
    };
    let months = |n: i64| {
      i32::try_from(n).ok().and_then(|n| {
        checked_shift_date_by_months(
          today, n
        )
      })
    };

    let shifted = match unit {
      | "d" => checked_add_days(today, num),
      | "w" => {
        num.checked_mul(7).and_then(
          |days| {
            checked_add_days(today, days)
          }
        )
      }
      | "m" => months(num),
      | "y" => {
        num.checked_mul(12).and_then(months)
      }
      | _ => {
        return Err(anyhow!(
          "unknown relative unit: \
           {unit}"
        ));
      }
    };
    return shifted.ok_or_else(too_large);
  }

  for format in [
    DateFormat::Iso,
    DateFormat::DayMonthYear,
    DateFormat::MonthDayYear
  ] {
    if let Ok(date) = format.parse(token)
    {
      return Ok(date);
    }
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, \
     weekday names (e.g. monday), \
     month names (e.g. march), \
     +Nd/-Nw/+Nm/+Ny, YYYY-MM-DD, \
     DD.MM.YYYY, MM/DD/YYYY"
  })
}

/// A month given as `YYYY-MM`, or the
/// month of any date expression.
pub fn parse_month_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  if let Some((year, month)) =
    token.split_once('-')
    && year.len() == 4
    && (1..=2).contains(&month.len())
    && let (Ok(year), Ok(month)) =
      (year.parse::<i32>(), month.parse::<u32>())
  {
    return NaiveDate::from_ymd_opt(
      year, month, 1
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid month: {token}"
      )
    });
  }

  parse_date_expr(token, today)
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

/// Parses a comma separated weekday
/// list such as `sat,sun`.
pub fn parse_weekday_list(
  raw: &str
) -> anyhow::Result<Vec<Weekday>> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(|part| {
      parse_weekday_name(
        &part.to_ascii_lowercase()
      )
      .ok_or_else(|| {
        anyhow!(
          "unknown weekday: {part}"
        )
      })
    })
    .collect()
}

fn next_weekday_date(
  from: NaiveDate,
  target: Weekday
) -> NaiveDate {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  add_days(from, delta)
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    TimeZone,
    Utc,
    Weekday
  };

  use super::{
    parse_date_expr,
    parse_month_expr,
    parse_weekday_list,
    today_in
  };

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  // Tuesday.
  fn today() -> NaiveDate {
    date(2026, 2, 17)
  }

  #[test]
  fn parses_keywords() {
    assert_eq!(
      parse_date_expr("today", today())
        .expect("today"),
      today()
    );
    assert_eq!(
      parse_date_expr(
        "Tomorrow",
        today()
      )
      .expect("tomorrow"),
      date(2026, 2, 18)
    );
  }

  #[test]
  fn parses_weekday_name() {
    assert_eq!(
      parse_date_expr(
        "wednesday",
        today()
      )
      .expect("parse weekday"),
      date(2026, 2, 18)
    );
    assert_eq!(
      parse_date_expr("tue", today())
        .expect("parse weekday"),
      date(2026, 2, 24)
    );
  }

  #[test]
  fn parses_month_name() {
    assert_eq!(
      parse_date_expr("march", today())
        .expect("parse month"),
      date(2026, 3, 1)
    );
    assert_eq!(
      parse_date_expr("feb", today())
        .expect("parse month"),
      date(2027, 2, 1)
    );
  }

  #[test]
  fn parses_relative_offsets() {
    assert_eq!(
      parse_date_expr("+3d", today())
        .expect("days"),
      date(2026, 2, 20)
    );
    assert_eq!(
      parse_date_expr("-1w", today())
        .expect("weeks"),
      date(2026, 2, 10)
    );
    assert_eq!(
      parse_date_expr("+1m", today())
        .expect("months"),
      date(2026, 3, 17)
    );
    assert_eq!(
      parse_date_expr("+1y", today())
        .expect("years"),
      date(2027, 2, 17)
    );
  }

  #[test]
  fn oversized_offsets_are_errors() {
    for input in [
      "+999999999999999d",
      "-999999999999999d",
      "+2000000000000000000w",
      "+3200000m",
      "+9999999999m",
      "-2000000000000000000y",
      "+300000y"
    ] {
      let err = parse_date_expr(
        input,
        today()
      )
      .expect_err(input);
      assert!(
        format!("{err:#}")
          .contains("too large"),
        "{input}: {err:#}"
      );
    }
  }

  #[test]
  fn five_digit_years_are_rejected() {
    let err = parse_date_expr(
      "+1d",
      date(9999, 12, 31)
    )
    .expect_err("year 10000");
    assert!(
      format!("{err:#}")
        .contains("0000-9999")
    );
    assert!(
      parse_date_expr("+8000y", today())
        .is_err()
    );
    assert_eq!(
      parse_date_expr(
        "+7973y",
        today()
      )
      .expect("year 9999"),
      date(9999, 2, 17)
    );
  }

  #[test]
  fn relative_number_beyond_i64_is_an_error()
  {
    assert!(
      parse_date_expr(
        "+99999999999999999999d",
        today()
      )
      .is_err()
    );
  }

  #[test]
  fn tomorrow_past_the_last_date_fails() {
    assert!(
      parse_date_expr(
        "tomorrow",
        NaiveDate::MAX
      )
      .is_err()
    );
  }

  #[test]
  fn parses_all_display_formats() {
    for input in [
      "2024-03-05",
      "05.03.2024",
      "03/05/2024"
    ] {
      assert_eq!(
        parse_date_expr(input, today())
          .expect("parse date"),
        date(2024, 3, 5),
        "{input}"
      );
    }
  }

  #[test]
  fn rejects_garbage() {
    let err =
      parse_date_expr("soon", today())
        .expect_err("should fail");
    assert!(
      format!("{err:#}")
        .contains("supported formats")
    );
  }

  #[test]
  fn parses_month_expressions() {
    assert_eq!(
      parse_month_expr(
        "2024-03",
        today()
      )
      .expect("month"),
      date(2024, 3, 1)
    );
    assert!(
      parse_month_expr(
        "2024-13",
        today()
      )
      .is_err()
    );
    assert_eq!(
      parse_month_expr("june", today())
        .expect("month name"),
      date(2026, 6, 1)
    );
  }

  #[test]
  fn parses_weekday_lists() {
    assert_eq!(
      parse_weekday_list("Sat, sun,")
        .expect("weekdays"),
      vec![Weekday::Sat, Weekday::Sun]
    );
    assert!(
      parse_weekday_list("funday")
        .is_err()
    );
  }

  #[test]
  fn today_follows_timezone() {
    let now = Utc
      .with_ymd_and_hms(
        2026, 2, 17, 23, 30, 0
      )
      .single()
      .expect("valid now");
    assert_eq!(
      today_in(chrono_tz::UTC, now),
      date(2026, 2, 17)
    );
    assert_eq!(
      today_in(
        chrono_tz::Asia::Tokyo,
        now
      ),
      date(2026, 2, 18)
    );
  }
}
