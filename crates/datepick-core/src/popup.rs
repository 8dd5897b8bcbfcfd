use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{
  Deserialize,
  Serialize
};

/// Keys the picker reacts to. Anything
/// else maps to [`Key::Other`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Key {
  ArrowUp,
  ArrowDown,
  ArrowLeft,
  ArrowRight,
  PageUp,
  PageDown,
  Home,
  End,
  Enter,
  Space,
  Escape,
  Other
}

impl Key {
  /// Maps a DOM `KeyboardEvent.key`
  /// value.
  #[must_use]
  pub fn from_dom(key: &str) -> Self {
    match key {
      | "ArrowUp" | "Up" => Self::ArrowUp,
      | "ArrowDown" | "Down" => {
        Self::ArrowDown
      }
      | "ArrowLeft" | "Left" => {
        Self::ArrowLeft
      }
      | "ArrowRight" | "Right" => {
        Self::ArrowRight
      }
      | "PageUp" => Self::PageUp,
      | "PageDown" => Self::PageDown,
      | "Home" => Self::Home,
      | "End" => Self::End,
      | "Enter" => Self::Enter,
      | " " | "Spacebar" => Self::Space,
      | "Escape" | "Esc" => Self::Escape,
      | _ => Self::Other
    }
  }

  /// Keys that open a closed popup.
  #[must_use]
  pub fn opens_popup(self) -> bool {
    matches!(
      self,
      Self::ArrowDown
        | Self::Enter
        | Self::Space
    )
  }

  #[must_use]
  pub fn activates(self) -> bool {
    matches!(
      self,
      Self::Enter | Self::Space
    )
  }
}

impl FromStr for Key {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let key = match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "up" | "arrowup" => Self::ArrowUp,
      | "down" | "arrowdown" => {
        Self::ArrowDown
      }
      | "left" | "arrowleft" => {
        Self::ArrowLeft
      }
      | "right" | "arrowright" => {
        Self::ArrowRight
      }
      | "pageup" | "pgup" => Self::PageUp,
      | "pagedown" | "pgdn" => {
        Self::PageDown
      }
      | "home" => Self::Home,
      | "end" => Self::End,
      | "enter" | "return" => Self::Enter,
      | "space" => Self::Space,
      | "escape" | "esc" => Self::Escape,
      | other => {
        return Err(anyhow!(
          "unknown key: {other}"
        ));
      }
    };
    Ok(key)
  }
}

/// Popup visibility.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PopupState {
  #[default]
  Closed,
  Open
}

/// Things that can open or close the
/// popup.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum PopupEvent {
  InputFocus,
  InputClick,
  Key(Key),
  /// Pointer-down outside the picker's
  /// container.
  OutsidePointerDown,
  /// A selection that finishes the
  /// interaction: a single date, or the
  /// second end of a range.
  SelectionFinished
}

impl PopupState {
  #[must_use]
  pub fn is_open(self) -> bool {
    self == Self::Open
  }

  #[must_use]
  pub fn transition(
    self,
    event: PopupEvent
  ) -> Self {
    match (self, event) {
      | (
        Self::Closed,
        PopupEvent::InputFocus
        | PopupEvent::InputClick
      ) => Self::Open,
      | (
        Self::Closed,
        PopupEvent::Key(key)
      ) if key.opens_popup() => {
        Self::Open
      }
      | (
        Self::Open,
        PopupEvent::OutsidePointerDown
        | PopupEvent::SelectionFinished
        | PopupEvent::Key(Key::Escape)
      ) => Self::Closed,
      | (state, _) => state
    }
  }
}

impl fmt::Display for PopupState {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(match self {
      | Self::Closed => "closed",
      | Self::Open => "open"
    })
  }
}

#[cfg(test)]
mod tests {
  use super::{
    Key,
    PopupEvent,
    PopupState
  };

  #[test]
  fn opens_on_focus_click_and_entry_keys()
  {
    for event in [
      PopupEvent::InputFocus,
      PopupEvent::InputClick,
      PopupEvent::Key(Key::ArrowDown),
      PopupEvent::Key(Key::Enter),
      PopupEvent::Key(Key::Space)
    ] {
      assert_eq!(
        PopupState::Closed
          .transition(event),
        PopupState::Open,
        "{event:?}"
      );
    }
  }

  #[test]
  fn other_keys_keep_it_closed() {
    for key in [
      Key::ArrowUp,
      Key::ArrowLeft,
      Key::Escape,
      Key::Other
    ] {
      assert_eq!(
        PopupState::Closed.transition(
          PopupEvent::Key(key)
        ),
        PopupState::Closed
      );
    }
  }

  #[test]
  fn closes_on_outside_selection_and_escape()
  {
    for event in [
      PopupEvent::OutsidePointerDown,
      PopupEvent::SelectionFinished,
      PopupEvent::Key(Key::Escape)
    ] {
      assert_eq!(
        PopupState::Open.transition(event),
        PopupState::Closed
      );
    }
    assert_eq!(
      PopupState::Open.transition(
        PopupEvent::Key(Key::ArrowDown)
      ),
      PopupState::Open
    );
  }

  #[test]
  fn maps_dom_key_names() {
    assert_eq!(Key::from_dom(" "), Key::Space);
    assert_eq!(
      Key::from_dom("Esc"),
      Key::Escape
    );
    assert_eq!(
      Key::from_dom("Tab"),
      Key::Other
    );
    assert_eq!(
      "pgdn".parse::<Key>().expect("key"),
      Key::PageDown
    );
  }
}
