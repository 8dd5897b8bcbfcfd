use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  NaiveDate
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::bounds::DateBounds;
use crate::datetime::{
  parse_date_expr,
  parse_weekday_list
};
use crate::format::DateFormat;
use crate::picker::PickerOptions;

const RC_ENV_VAR: &str = "DATEPICKRC";
const RC_FILE_NAME: &str = ".datepickrc";

/// Flat `key = value` settings merged
/// from defaults, rc files and
/// overrides.
#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    for (key, value) in [
      ("format", "dd.mm.yyyy"),
      ("range", "off"),
      ("label", "Date"),
      ("color", "on")
    ] {
      map.insert(
        key.to_string(),
        value.to_string()
      );
    }
    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading picker rc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no picker rc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn set(
    &mut self,
    key: &str,
    value: &str
  ) {
    self.map.insert(
      key.to_string(),
      value.to_string()
    );
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  fn get_nonempty(
    &self,
    key: &str
  ) -> Option<&str> {
    self
      .map
      .get(key)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  /// Builds picker options from the
  /// `format`, `range`, `min`, `max`,
  /// `disabled.*`, `label` and
  /// `placeholder` keys. Date values
  /// accept date expressions relative to
  /// `today`.
  #[tracing::instrument(skip(self))]
  pub fn picker_options(
    &self,
    today: NaiveDate
  ) -> anyhow::Result<PickerOptions> {
    let format = self
      .get_nonempty("format")
      .map(str::parse::<DateFormat>)
      .transpose()
      .context("invalid `format` setting")?
      .unwrap_or_default();
    let range = self
      .get_bool("range")
      .unwrap_or(false);

    let min = self
      .date_setting("min", today)?;
    let max = self
      .date_setting("max", today)?;
    if let (Some(min), Some(max)) =
      (min, max)
      && min > max
    {
      warn!(%min, %max, "min is after max; every day will be disabled");
    }

    let weekdays = self
      .get_nonempty("disabled.weekdays")
      .map(parse_weekday_list)
      .transpose()
      .context(
        "invalid `disabled.weekdays` \
         setting"
      )?
      .unwrap_or_default();
    let dates = self
      .get_nonempty("disabled.dates")
      .map(|raw| {
        raw
          .split(',')
          .map(str::trim)
          .filter(|part| !part.is_empty())
          .map(|part| {
            parse_date_expr(part, today)
          })
          .collect::<anyhow::Result<Vec<_>>>()
      })
      .transpose()
      .context(
        "invalid `disabled.dates` \
         setting"
      )?
      .unwrap_or_default();

    let mut bounds = DateBounds::new()
      .with_min(min)
      .with_max(max);
    if !weekdays.is_empty()
      || !dates.is_empty()
    {
      debug!(
        weekdays = ?weekdays,
        dates = dates.len(),
        "installing disabled-day predicate"
      );
      bounds =
        bounds.with_predicate(move |day| {
          weekdays.contains(&day.weekday())
            || dates.contains(&day)
        });
    }

    let label = self
      .get_nonempty("label")
      .unwrap_or("Date")
      .to_string();
    let placeholder = self
      .get_nonempty("placeholder")
      .map(str::to_string)
      .unwrap_or_else(|| {
        format.placeholder(range)
      });

    Ok(PickerOptions {
      format,
      range,
      bounds,
      label,
      placeholder
    })
  }

  fn date_setting(
    &self,
    key: &str,
    today: NaiveDate
  ) -> anyhow::Result<Option<NaiveDate>>
  {
    self
      .get_nonempty(key)
      .map(|raw| {
        parse_date_expr(raw, today)
          .with_context(|| {
            format!(
              "invalid `{key}` setting"
            )
          })
      })
      .transpose()
  }

  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    self.load_nested(path, &mut Vec::new())
  }

  /// `in_progress` holds the canonical
  /// paths of the files currently being
  /// read, outermost first.
  #[tracing::instrument(skip(
    self,
    in_progress
  ))]
  fn load_nested(
    &mut self,
    path: &Path,
    in_progress: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let canonical = fs::canonicalize(&path)
      .with_context(|| {
        format!(
          "failed to resolve {}",
          path.display()
        )
      })?;
    if in_progress.contains(&canonical) {
      warn!(include = %path.display(), "include cycle; skipping");
      return Ok(());
    }

    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          in_progress.push(canonical.clone());
          let loaded = self.load_nested(
            &include_path,
            in_progress
          );
          in_progress.pop();
          loaded?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping rc lookup"
    );
    return Ok(None);
  };
  let candidate = home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;

  use chrono::NaiveDate;
  use tempfile::tempdir;

  use super::Config;
  use crate::format::DateFormat;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn loads_rc_with_include_and_comments() {
    let dir = tempdir().expect("tempdir");
    fs::write(
      dir.path().join("extra.rc"),
      "max = 2024-12-31\n"
    )
    .expect("write include");
    let rc = dir.path().join("main.rc");
    fs::write(
      &rc,
      "# picker settings\nformat = iso\n\
       range = yes # trailing comment\n\
       include extra.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(rc.as_path()))
      .expect("load rc");
    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.get("format").as_deref(),
      Some("iso")
    );
    assert_eq!(
      cfg.get_bool("range"),
      Some(true)
    );
    assert_eq!(
      cfg.get("max").as_deref(),
      Some("2024-12-31")
    );
  }

  #[test]
  fn include_cycle_through_parent_dir_stops() {
    let dir = tempdir().expect("tempdir");
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).expect("mkdir");
    let rc = sub.join("main.rc");
    fs::write(
      &rc,
      "format = iso
include ../sub/main.rc
"
    )
    .expect("write rc");

    let cfg = Config::load(Some(rc.as_path()))
      .expect("load rc");
    assert_eq!(cfg.loaded_files.len(), 1);
    assert_eq!(
      cfg.get("format").as_deref(),
      Some("iso")
    );
  }

  #[test]
  fn shared_include_loads_each_time() {
    let dir = tempdir().expect("tempdir");
    fs::write(
      dir.path().join("common.rc"),
      "label = Common
"
    )
    .expect("write common");
    fs::write(
      dir.path().join("first.rc"),
      "include common.rc
label = First
"
    )
    .expect("write first");
    fs::write(
      dir.path().join("second.rc"),
      "include common.rc
"
    )
    .expect("write second");
    let rc = dir.path().join("main.rc");
    fs::write(
      &rc,
      "include first.rc
include second.rc
"
    )
    .expect("write rc");

    let cfg = Config::load(Some(rc.as_path()))
      .expect("load rc");
    assert_eq!(cfg.loaded_files.len(), 5);
    assert_eq!(
      cfg.get("label").as_deref(),
      Some("Common")
    );
  }

  #[test]
  fn rejects_lines_without_equals() {
    let dir = tempdir().expect("tempdir");
    let rc = dir.path().join("bad.rc");
    fs::write(&rc, "format iso\n")
      .expect("write rc");
    let err = Config::load(Some(rc.as_path()))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::default();
    cfg.apply_overrides([(
      "rc.format".to_string(),
      "mm/dd/yyyy".to_string()
    )]);
    assert_eq!(
      cfg.get("format").as_deref(),
      Some("mm/dd/yyyy")
    );
  }

  #[test]
  fn builds_picker_options() {
    let today = date(2024, 3, 14);
    let mut cfg = Config::default();
    cfg.set("format", "iso");
    cfg.set("range", "on");
    cfg.set("min", "today");
    cfg.set("max", "+1m");
    cfg.set("disabled.weekdays", "sat,sun");
    cfg.set(
      "disabled.dates",
      "2024-03-20, 2024-03-21"
    );

    let options = cfg
      .picker_options(today)
      .expect("options");
    assert_eq!(
      options.format,
      DateFormat::Iso
    );
    assert!(options.range);
    assert_eq!(
      options.placeholder,
      "iso – iso"
    );
    let bounds = &options.bounds;
    assert!(bounds.is_disabled(date(2024, 3, 13)));
    assert!(!bounds.is_disabled(today));
    assert!(bounds.is_disabled(date(2024, 3, 16)));
    assert!(bounds.is_disabled(date(2024, 3, 20)));
    assert!(!bounds.is_disabled(date(2024, 3, 22)));
    assert!(bounds.is_disabled(date(2024, 4, 15)));
  }

  #[test]
  fn reports_bad_settings_with_key() {
    let mut cfg = Config::default();
    cfg.set("min", "someday");
    let err = cfg
      .picker_options(date(2024, 3, 14))
      .expect_err("should fail");
    assert!(
      format!("{err:#}")
        .contains("invalid `min` setting")
    );
  }
}
