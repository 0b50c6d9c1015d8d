use std::fmt;
use std::str::FromStr;

use chrono::{
  DateTime,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};

use crate::datetime::wire_time;

pub type TaskId = u64;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
  #[default]
  Open,
  Closed
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 2] =
    [TaskStatus::Open, TaskStatus::Closed];

  #[must_use]
  pub fn toggled(self) -> Self {
    match self {
      | TaskStatus::Open => {
        TaskStatus::Closed
      }
      | TaskStatus::Closed => {
        TaskStatus::Open
      }
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      | TaskStatus::Open => "open",
      | TaskStatus::Closed => "closed"
    }
  }

  /// Capitalized form used on buttons.
  pub fn label(&self) -> &'static str {
    match self {
      | TaskStatus::Open => "Open",
      | TaskStatus::Closed => "Closed"
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, thiserror::Error)]
#[error(
  "unknown task status `{0}` \
   (expected open or closed)"
)]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
  type Err = UnknownStatus;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "open" => Ok(TaskStatus::Open),
      | "closed" => {
        Ok(TaskStatus::Closed)
      }
      | _ => {
        Err(UnknownStatus(s.to_string()))
      }
    }
  }
}

/// A task record as returned by the
/// remote task API.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Task {
  pub id:             TaskId,
  #[serde(with = "wire_time")]
  pub date_created:   DateTime<Utc>,
  pub entity_name:    String,
  pub task_type:      String,
  #[serde(with = "wire_time")]
  pub task_time:      DateTime<Utc>,
  pub contact_person: String,
  #[serde(default)]
  pub note:           Option<String>,
  #[serde(default)]
  pub status:         TaskStatus
}

/// Body of a create or full update
/// request. The collaborator assigns
/// `id` and `date_created`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskPayload {
  pub entity_name:    String,
  pub task_type:      String,
  #[serde(with = "wire_time")]
  pub task_time:      DateTime<Utc>,
  pub contact_person: String,
  pub note:           String,
  pub status:         TaskStatus
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct StatusPatch {
  pub status: TaskStatus
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn decodes_reference_backend_record()
  {
    let raw = r#"{
      "id": 7,
      "date_created": "2026-10-01T08:30:00.123456",
      "entity_name": "Acme",
      "task_type": "Call",
      "task_time": "2026-10-20T15:00:00",
      "contact_person": "Dana",
      "note": null,
      "status": "closed"
    }"#;

    let task: Task =
      serde_json::from_str(raw)
        .expect("decode task");
    assert_eq!(task.id, 7);
    assert_eq!(task.note, None);
    assert_eq!(
      task.status,
      TaskStatus::Closed
    );
    assert_eq!(
      task.task_time,
      Utc
        .with_ymd_and_hms(
          2026, 10, 20, 15, 0, 0
        )
        .single()
        .expect("valid time")
    );
  }

  #[test]
  fn payload_sends_utc_timestamp() {
    let payload = TaskPayload {
      entity_name:    "Acme".into(),
      task_type:      "Meeting".into(),
      task_time:      Utc
        .with_ymd_and_hms(
          2026, 11, 2, 9, 15, 0
        )
        .single()
        .expect("valid time"),
      contact_person: "Lee".into(),
      note:           String::new(),
      status:         TaskStatus::Open
    };

    let value =
      serde_json::to_value(&payload)
        .expect("encode payload");
    assert_eq!(
      value["task_time"],
      "2026-11-02T09:15:00Z"
    );
    assert_eq!(value["status"], "open");
  }

  #[test]
  fn status_toggles_and_parses() {
    assert_eq!(
      TaskStatus::Open.toggled(),
      TaskStatus::Closed
    );
    assert_eq!(
      " Closed ".parse::<TaskStatus>()
        .expect("parse"),
      TaskStatus::Closed
    );
    assert!(
      "done".parse::<TaskStatus>().is_err()
    );
  }
}
