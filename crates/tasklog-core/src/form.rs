use std::fmt;
use std::str::FromStr;

use chrono::{
  DateTime,
  Utc
};

use crate::clock::{
  ClockError,
  ClockParts,
  Hour12,
  Meridiem,
  Minute,
  compose,
  decompose,
  ensure_not_past,
  parse_date
};
use crate::datetime::Zone;
use crate::task::{
  Task,
  TaskPayload,
  TaskStatus
};

#[derive(
  Debug, Clone, PartialEq, Eq, thiserror::Error,
)]
pub enum FormError {
  #[error("Entity name is required")]
  EntityNameRequired,
  #[error("Task type is required")]
  TaskTypeRequired,
  #[error("Date is required")]
  DateRequired,
  #[error("Time is required")]
  TimeRequired,
  #[error("Contact person is required")]
  ContactPersonRequired,
  #[error(transparent)]
  Clock(#[from] ClockError)
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FormField {
  EntityName,
  TaskType,
  TaskDate,
  Hour,
  Minute,
  Meridiem,
  ContactPerson,
  Note
}

impl FormField {
  pub fn as_str(&self) -> &'static str {
    match self {
      | FormField::EntityName => {
        "entity_name"
      }
      | FormField::TaskType => "task_type",
      | FormField::TaskDate => "task_date",
      | FormField::Hour => "task_time_hour",
      | FormField::Minute => {
        "task_time_minute"
      }
      | FormField::Meridiem => {
        "task_time_ampm"
      }
      | FormField::ContactPerson => {
        "contact_person"
      }
      | FormField::Note => "note"
    }
  }
}

impl fmt::Display for FormField {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// In-progress contents of the
/// create/edit form, kept as the raw
/// text of each input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
  pub entity_name:    String,
  pub task_type:      String,
  pub task_date:      String,
  pub hour:           String,
  pub minute:         String,
  pub meridiem:       String,
  pub contact_person: String,
  pub note:           String,
  pub status:         TaskStatus
}

impl Default for TaskForm {
  fn default() -> Self {
    Self {
      entity_name:    String::new(),
      task_type:      String::new(),
      task_date:      String::new(),
      hour:           Hour12::TWELVE
        .to_string(),
      minute:         Minute::ZERO
        .to_string(),
      meridiem:       Meridiem::Pm
        .to_string(),
      contact_person: String::new(),
      note:           String::new(),
      status:         TaskStatus::Open
    }
  }
}

impl TaskForm {
  /// Form for editing `task`, with its
  /// time split back into the pickers.
  pub fn from_task(
    task: &Task,
    zone: &Zone
  ) -> Self {
    let parts =
      decompose(zone, task.task_time);
    Self {
      entity_name:    task
        .entity_name
        .clone(),
      task_type:      task.task_type.clone(),
      task_date:      parts
        .date
        .format("%Y-%m-%d")
        .to_string(),
      hour:           parts.hour.to_string(),
      minute:         parts
        .minute
        .to_string(),
      meridiem:       parts
        .meridiem
        .to_string(),
      contact_person: task
        .contact_person
        .clone(),
      note:           task
        .note
        .clone()
        .unwrap_or_default(),
      status:         task.status
    }
  }

  /// Like [`TaskForm::from_task`] but
  /// for creating a copy, which always
  /// starts open.
  pub fn duplicate_of(
    task: &Task,
    zone: &Zone
  ) -> Self {
    Self {
      status: TaskStatus::Open,
      ..Self::from_task(task, zone)
    }
  }

  pub fn field(
    &self,
    field: FormField
  ) -> &str {
    match field {
      | FormField::EntityName => {
        &self.entity_name
      }
      | FormField::TaskType => {
        &self.task_type
      }
      | FormField::TaskDate => {
        &self.task_date
      }
      | FormField::Hour => &self.hour,
      | FormField::Minute => &self.minute,
      | FormField::Meridiem => {
        &self.meridiem
      }
      | FormField::ContactPerson => {
        &self.contact_person
      }
      | FormField::Note => &self.note
    }
  }

  pub fn set(
    &mut self,
    field: FormField,
    value: String
  ) {
    let slot = match field {
      | FormField::EntityName => {
        &mut self.entity_name
      }
      | FormField::TaskType => {
        &mut self.task_type
      }
      | FormField::TaskDate => {
        &mut self.task_date
      }
      | FormField::Hour => &mut self.hour,
      | FormField::Minute => {
        &mut self.minute
      }
      | FormField::Meridiem => {
        &mut self.meridiem
      }
      | FormField::ContactPerson => {
        &mut self.contact_person
      }
      | FormField::Note => &mut self.note
    };
    *slot = value;
  }

  /// Checks required fields, composes
  /// the task time and refuses past
  /// times. Nothing is sent unless this
  /// succeeds.
  #[tracing::instrument(
    skip(self, zone),
    fields(zone = %zone)
  )]
  pub fn validate(
    &self,
    zone: &Zone,
    now: DateTime<Utc>
  ) -> Result<TaskPayload, FormError> {
    let entity_name =
      required(&self.entity_name).ok_or(
        FormError::EntityNameRequired
      )?;
    let task_type =
      required(&self.task_type)
        .ok_or(FormError::TaskTypeRequired)?;
    let task_date =
      required(&self.task_date)
        .ok_or(FormError::DateRequired)?;
    let (hour, minute, meridiem) = match (
      required(&self.hour),
      required(&self.minute),
      required(&self.meridiem)
    ) {
      | (Some(h), Some(m), Some(ap)) => {
        (h, m, ap)
      }
      | _ => {
        return Err(
          FormError::TimeRequired
        );
      }
    };
    let contact_person =
      required(&self.contact_person).ok_or(
        FormError::ContactPersonRequired
      )?;

    let parts = ClockParts {
      date:     parse_date(task_date)?,
      hour:     Hour12::from_str(hour)?,
      minute:   Minute::from_str(minute)?,
      meridiem: Meridiem::from_str(
        meridiem
      )?
    };
    let task_time = compose(zone, parts)?;
    ensure_not_past(task_time, now)?;

    Ok(TaskPayload {
      entity_name: entity_name.to_string(),
      task_type: task_type.to_string(),
      task_time,
      contact_person: contact_person
        .to_string(),
      note: self.note.trim().to_string(),
      status: self.status
    })
  }
}

fn required(value: &str) -> Option<&str> {
  let trimmed = value.trim();
  (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 10, 17, 12, 0, 0
      )
      .single()
      .expect("valid now")
  }

  fn filled() -> TaskForm {
    TaskForm {
      entity_name: "  Acme Ltd ".into(),
      task_type: "Call".into(),
      task_date: "2026-10-20".into(),
      hour: "03".into(),
      minute: "30".into(),
      meridiem: "PM".into(),
      contact_person: "Dana".into(),
      note: "  bring samples  ".into(),
      ..TaskForm::default()
    }
  }

  #[test]
  fn defaults_match_the_blank_form() {
    let form = TaskForm::default();
    assert_eq!(form.hour, "12");
    assert_eq!(form.minute, "00");
    assert_eq!(form.meridiem, "PM");
    assert_eq!(
      form.status,
      TaskStatus::Open
    );
  }

  #[test]
  fn valid_form_builds_trimmed_payload()
  {
    let zone =
      Zone::Named(chrono_tz::UTC);
    let payload = filled()
      .validate(&zone, now())
      .expect("valid form");
    assert_eq!(
      payload.entity_name,
      "Acme Ltd"
    );
    assert_eq!(
      payload.note,
      "bring samples"
    );
    assert_eq!(
      payload.task_time,
      Utc
        .with_ymd_and_hms(
          2026, 10, 20, 15, 30, 0
        )
        .single()
        .expect("valid")
    );
  }

  #[test]
  fn required_fields_are_checked_in_order()
  {
    let zone = Zone::Local;
    let mut form = TaskForm::default();
    assert_eq!(
      form.validate(&zone, now()),
      Err(FormError::EntityNameRequired)
    );
    form.entity_name = "Acme".into();
    assert_eq!(
      form.validate(&zone, now()),
      Err(FormError::TaskTypeRequired)
    );
    form.task_type = "Visit".into();
    assert_eq!(
      form.validate(&zone, now()),
      Err(FormError::DateRequired)
    );
    form.task_date = "2030-01-01".into();
    form.minute = " ".into();
    assert_eq!(
      form.validate(&zone, now()),
      Err(FormError::TimeRequired)
    );
    form.minute = "15".into();
    assert_eq!(
      form.validate(&zone, now()),
      Err(
        FormError::ContactPersonRequired
      )
    );
  }

  #[test]
  fn past_time_is_refused() {
    let zone =
      Zone::Named(chrono_tz::UTC);
    let form = TaskForm {
      task_date: "2026-10-17".into(),
      hour: "11".into(),
      minute: "45".into(),
      meridiem: "AM".into(),
      ..filled()
    };
    assert_eq!(
      form.validate(&zone, now()),
      Err(FormError::Clock(
        ClockError::InPast
      ))
    );
    assert_eq!(
      FormError::Clock(ClockError::InPast)
        .to_string(),
      "Task due time cannot be in the past"
    );
  }

  #[test]
  fn edit_form_splits_task_time() {
    let zone = Zone::Named(
      chrono_tz::America::Chicago
    );
    let task = Task {
      id:             3,
      date_created:   now(),
      entity_name:    "Acme".into(),
      task_type:      "Call".into(),
      task_time:      Utc
        .with_ymd_and_hms(
          2026, 10, 21, 4, 15, 0
        )
        .single()
        .expect("valid"),
      contact_person: "Dana".into(),
      note:           None,
      status:         TaskStatus::Closed
    };

    let form =
      TaskForm::from_task(&task, &zone);
    // 04:15 UTC is 23:15 the previous
    // evening in Chicago.
    assert_eq!(form.task_date, "2026-10-20");
    assert_eq!(form.hour, "11");
    assert_eq!(form.minute, "15");
    assert_eq!(form.meridiem, "PM");
    assert_eq!(form.note, "");
    assert_eq!(
      form.status,
      TaskStatus::Closed
    );

    let copy =
      TaskForm::duplicate_of(&task, &zone);
    assert_eq!(
      copy.status,
      TaskStatus::Open
    );
    assert_eq!(
      copy.task_date,
      form.task_date
    );
  }
}
