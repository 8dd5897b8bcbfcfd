mod calendar_popup;
mod date_picker;

pub use calendar_popup::CalendarPopup;
pub use date_picker::DatePicker;
