use chrono::{
  DateTime,
  Utc
};

use crate::datetime::Zone;
use crate::task::TaskStatus;

/// `17 Oct 2026`
pub fn format_date(
  instant: DateTime<Utc>,
  zone: &Zone
) -> String {
  zone
    .localize(instant)
    .format("%d %b %Y")
    .to_string()
}

/// `17 Oct 2026 03:00 PM`
pub fn format_date_time(
  instant: DateTime<Utc>,
  zone: &Zone
) -> String {
  zone
    .localize(instant)
    .format("%d %b %Y %I:%M %p")
    .to_string()
}

pub fn note_or_dash(
  note: Option<&str>
) -> &str {
  match note.map(str::trim) {
    | Some(text) if !text.is_empty() => {
      text
    }
    | _ => "-"
  }
}

pub fn status_toggle_label(
  status: TaskStatus
) -> String {
  format!(
    "Change Status to {}",
    status.toggled().label()
  )
}
