//! State of the task list screen and
//! the transitions that drive it.
//!
//! [`Session::update`] never performs
//! I/O. It mutates the state and returns
//! the [`Effect`]s the caller has to
//! carry out; their outcomes come back
//! as further [`Msg`]s.

use std::time::Duration;

use chrono::{
  DateTime,
  Utc
};
use tracing::{
  debug,
  error,
  info,
  warn
};

use crate::api::ApiError;
use crate::datetime::Zone;
use crate::filter::{
  FilterField,
  TaskFilters
};
use crate::form::{
  FormField,
  TaskForm
};
use crate::task::{
  Task,
  TaskId,
  TaskPayload,
  TaskStatus
};

pub const ALERT_DISMISS_DELAY: Duration =
  Duration::from_secs(5);

pub const DELETE_PROMPT: &str =
  "Are you sure you want to delete this \
   task?";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum AlertKind {
  Success,
  Error
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
  pub id:      u64,
  pub kind:    AlertKind,
  pub message: String
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum EditorMode {
  Create,
  Edit(TaskId)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
  pub mode: EditorMode,
  pub form: TaskForm,
  /// Sequence number of the save this
  /// form has in flight.
  pub saving: Option<u64>
}

impl Editor {
  fn new(
    mode: EditorMode,
    form: TaskForm
  ) -> Self {
    Self {
      mode,
      form,
      saving: None
    }
  }

  pub fn busy(&self) -> bool {
    self.saving.is_some()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
  /// Screen opened: load the list and
  /// both lookups.
  Init,
  Reload,
  SetFilter {
    field: FilterField,
    value: String
  },
  ClearFilter(FilterField),
  ClearFilters,
  TasksLoaded {
    seq:    u64,
    result: Result<Vec<Task>, ApiError>
  },
  TaskTypesLoaded(
    Result<Vec<String>, ApiError>
  ),
  ContactPersonsLoaded(
    Result<Vec<String>, ApiError>
  ),
  OpenCreate,
  OpenEdit(TaskId),
  Duplicate(TaskId),
  CloseModal,
  EditForm {
    field: FormField,
    value: String
  },
  SetFormStatus(TaskStatus),
  Submit,
  TaskSaved {
    seq:    u64,
    mode:   EditorMode,
    result: Result<Task, ApiError>
  },
  ToggleStatus(TaskId),
  StatusChanged {
    id:     TaskId,
    status: TaskStatus,
    result: Result<Task, ApiError>
  },
  RequestDelete(TaskId),
  DeleteConfirmed(TaskId),
  DeleteCancelled,
  TaskDeleted {
    id:     TaskId,
    result: Result<(), ApiError>
  },
  AlertExpired(u64)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
  FetchTasks {
    seq:   u64,
    query: Vec<(String, String)>
  },
  FetchTaskTypes,
  FetchContactPersons,
  CreateTask {
    seq:     u64,
    payload: TaskPayload
  },
  UpdateTask {
    seq:     u64,
    id:      TaskId,
    payload: TaskPayload
  },
  PatchStatus {
    id:     TaskId,
    status: TaskStatus
  },
  DeleteTask(TaskId),
  /// Ask the user before deleting; the
  /// answer comes back as
  /// `DeleteConfirmed` or
  /// `DeleteCancelled`.
  ConfirmDelete {
    id:     TaskId,
    prompt: String
  },
  DismissAlertAfter {
    alert_id: u64,
    delay:    Duration
  }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
  zone:            Zone,
  filters:         TaskFilters,
  tasks:           Vec<Task>,
  task_types:      Vec<String>,
  contact_persons: Vec<String>,
  loading:         bool,
  editor:          Option<Editor>,
  pending_delete:  Option<TaskId>,
  alert:           Option<Alert>,
  load_seq:        u64,
  save_seq:        u64,
  alert_seq:       u64
}

impl Session {
  pub fn new(zone: Zone) -> Self {
    Self {
      zone,
      ..Self::default()
    }
  }

  pub fn with_filters(
    mut self,
    filters: TaskFilters
  ) -> Self {
    self.filters = filters;
    self
  }

  pub fn zone(&self) -> &Zone {
    &self.zone
  }

  pub fn filters(&self) -> &TaskFilters {
    &self.filters
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  /// Rows to render; empty while a load
  /// is in flight.
  pub fn visible_tasks(&self) -> &[Task] {
    if self.loading {
      &[]
    } else {
      &self.tasks
    }
  }

  pub fn task(
    &self,
    id: TaskId
  ) -> Option<&Task> {
    self.tasks.iter().find(|task| {
      task.id == id
    })
  }

  pub fn task_types(&self) -> &[String] {
    &self.task_types
  }

  pub fn contact_persons(
    &self
  ) -> &[String] {
    &self.contact_persons
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn editor(&self) -> Option<&Editor> {
    self.editor.as_ref()
  }

  pub fn pending_delete(
    &self
  ) -> Option<TaskId> {
    self.pending_delete
  }

  pub fn alert(&self) -> Option<&Alert> {
    self.alert.as_ref()
  }

  #[tracing::instrument(
    skip(self, msg, now),
    fields(msg = msg_name(&msg))
  )]
  pub fn update(
    &mut self,
    msg: Msg,
    now: DateTime<Utc>
  ) -> Vec<Effect> {
    match msg {
      | Msg::Init => {
        let mut effects = self.load();
        effects.extend(
          self.refresh_lookups()
        );
        effects
      }
      | Msg::Reload => self.load(),
      | Msg::SetFilter {
        field,
        value
      } => {
        match self
          .filters
          .set(field, &value)
        {
          | Ok(()) => self.load(),
          | Err(err) => {
            self.raise(
              AlertKind::Error,
              err.to_string()
            )
          }
        }
      }
      | Msg::ClearFilter(field) => {
        debug!(field = %field, "clearing filter");
        self.filters.clear(field);
        self.load()
      }
      | Msg::ClearFilters => {
        self.filters.reset();
        self.load()
      }
      | Msg::TasksLoaded {
        seq,
        result
      } => self.tasks_loaded(seq, result),
      | Msg::TaskTypesLoaded(result) => {
        match result {
          | Ok(types) => {
            self.task_types = types
          }
          | Err(err) => {
            error!(error = %err, "failed loading task types")
          }
        }
        vec![]
      }
      | Msg::ContactPersonsLoaded(
        result
      ) => {
        match result {
          | Ok(persons) => {
            self.contact_persons = persons
          }
          | Err(err) => {
            error!(error = %err, "failed loading contact persons")
          }
        }
        vec![]
      }
      | Msg::OpenCreate => {
        self.editor = Some(Editor::new(
          EditorMode::Create,
          TaskForm::default()
        ));
        vec![]
      }
      | Msg::OpenEdit(id) => {
        self.open_from_task(id, false)
      }
      | Msg::Duplicate(id) => {
        self.open_from_task(id, true)
      }
      | Msg::CloseModal => {
        self.editor = None;
        vec![]
      }
      | Msg::EditForm {
        field,
        value
      } => {
        if let Some(editor) =
          self.editor.as_mut()
        {
          editor.form.set(field, value);
        }
        vec![]
      }
      | Msg::SetFormStatus(status) => {
        if let Some(editor) =
          self.editor.as_mut()
        {
          editor.form.status = status;
        }
        vec![]
      }
      | Msg::Submit => self.submit(now),
      | Msg::TaskSaved {
        seq,
        mode,
        result
      } => self.task_saved(seq, mode, result),
      | Msg::ToggleStatus(id) => {
        let Some(task) = self.task(id)
        else {
          return self.missing_task(id);
        };
        let status = task.status.toggled();
        info!(id, status = %status, "toggling task status");
        vec![Effect::PatchStatus {
          id,
          status
        }]
      }
      | Msg::StatusChanged {
        id,
        status,
        result
      } => {
        match result {
          | Ok(_) => {
            let mut effects = self.raise(
              AlertKind::Success,
              format!(
                "Task status changed to \
                 {status}"
              )
            );
            effects.extend(self.load());
            effects
          }
          | Err(err) => {
            warn!(id, error = %err, "status change failed");
            self.raise(
              AlertKind::Error,
              format!(
                "Error updating task \
                 status: {err}"
              )
            )
          }
        }
      }
      | Msg::RequestDelete(id) => {
        self.pending_delete = Some(id);
        vec![Effect::ConfirmDelete {
          id,
          prompt: DELETE_PROMPT
            .to_string()
        }]
      }
      | Msg::DeleteConfirmed(id) => {
        if self.pending_delete != Some(id)
        {
          warn!(
            id,
            pending = ?self.pending_delete,
            "ignoring unrequested delete confirmation"
          );
          return vec![];
        }
        self.pending_delete = None;
        info!(id, "deleting task");
        vec![Effect::DeleteTask(id)]
      }
      | Msg::DeleteCancelled => {
        self.pending_delete = None;
        vec![]
      }
      | Msg::TaskDeleted {
        id,
        result
      } => {
        match result {
          | Ok(()) => {
            let mut effects = self.raise(
              AlertKind::Success,
              "Task deleted successfully"
                .to_string()
            );
            effects.extend(self.load());
            effects
          }
          | Err(err) => {
            warn!(id, error = %err, "delete failed");
            self.raise(
              AlertKind::Error,
              format!(
                "Error deleting task: {err}"
              )
            )
          }
        }
      }
      | Msg::AlertExpired(alert_id) => {
        if self
          .alert
          .as_ref()
          .is_some_and(|alert| {
            alert.id == alert_id
          })
        {
          self.alert = None;
        }
        vec![]
      }
    }
  }

  fn load(&mut self) -> Vec<Effect> {
    self.load_seq += 1;
    self.loading = true;
    let query = self.filters.to_query();
    debug!(
      seq = self.load_seq,
      ?query,
      "issuing task list load"
    );
    vec![Effect::FetchTasks {
      seq: self.load_seq,
      query
    }]
  }

  fn refresh_lookups(
    &self
  ) -> Vec<Effect> {
    vec![
      Effect::FetchTaskTypes,
      Effect::FetchContactPersons,
    ]
  }

  fn tasks_loaded(
    &mut self,
    seq: u64,
    result: Result<Vec<Task>, ApiError>
  ) -> Vec<Effect> {
    if seq != self.load_seq {
      debug!(
        seq,
        latest = self.load_seq,
        "discarding superseded task list"
      );
      return vec![];
    }

    self.loading = false;
    match result {
      | Ok(tasks) => {
        info!(
          count = tasks.len(),
          "task list loaded"
        );
        self.tasks = tasks;
        vec![]
      }
      | Err(err) => {
        self.raise(
          AlertKind::Error,
          format!(
            "Error loading tasks: {err}"
          )
        )
      }
    }
  }

  fn open_from_task(
    &mut self,
    id: TaskId,
    duplicate: bool
  ) -> Vec<Effect> {
    let Some(task) = self.task(id) else {
      return self.missing_task(id);
    };

    let editor = if duplicate {
      Editor::new(
        EditorMode::Create,
        TaskForm::duplicate_of(
          task, &self.zone
        )
      )
    } else {
      Editor::new(
        EditorMode::Edit(id),
        TaskForm::from_task(
          task, &self.zone
        )
      )
    };
    self.editor = Some(editor);
    vec![]
  }

  fn submit(
    &mut self,
    now: DateTime<Utc>
  ) -> Vec<Effect> {
    let Some(editor) = self.editor.as_mut()
    else {
      debug!("submit without an open form");
      return vec![];
    };
    if editor.busy() {
      debug!("save already in flight");
      return vec![];
    }

    let payload = match editor
      .form
      .validate(&self.zone, now)
    {
      | Ok(payload) => payload,
      | Err(err) => {
        debug!(error = %err, "form rejected");
        return self.raise(
          AlertKind::Error,
          err.to_string()
        );
      }
    };

    self.save_seq += 1;
    let seq = self.save_seq;
    editor.saving = Some(seq);
    match editor.mode {
      | EditorMode::Create => {
        vec![Effect::CreateTask {
          seq,
          payload
        }]
      }
      | EditorMode::Edit(id) => {
        vec![Effect::UpdateTask {
          seq,
          id,
          payload
        }]
      }
    }
  }

  fn task_saved(
    &mut self,
    seq: u64,
    mode: EditorMode,
    result: Result<Task, ApiError>
  ) -> Vec<Effect> {
    // The form may have been closed or
    // replaced while the save ran.
    let same_editor =
      self.editor.as_ref().is_some_and(
        |editor| editor.saving == Some(seq)
      );
    if !same_editor {
      debug!(seq, "save result for a form no longer open");
    }

    match result {
      | Ok(task) => {
        info!(id = task.id, ?mode, "task saved");
        if same_editor {
          self.editor = None;
        }
        let message = match mode {
          | EditorMode::Create => {
            "Task created successfully"
          }
          | EditorMode::Edit(_) => {
            "Task updated successfully"
          }
        };
        let mut effects = self.raise(
          AlertKind::Success,
          message.to_string()
        );
        effects.extend(self.load());
        if mode == EditorMode::Create {
          effects.extend(
            self.refresh_lookups()
          );
        }
        effects
      }
      | Err(err) => {
        warn!(?mode, error = %err, "save failed");
        if same_editor
          && let Some(editor) =
            self.editor.as_mut()
        {
          editor.saving = None;
        }
        let verb = match mode {
          | EditorMode::Create => {
            "creating"
          }
          | EditorMode::Edit(_) => {
            "updating"
          }
        };
        self.raise(
          AlertKind::Error,
          format!(
            "Error {verb} task: {err}"
          )
        )
      }
    }
  }

  fn missing_task(
    &mut self,
    id: TaskId
  ) -> Vec<Effect> {
    warn!(id, "task is not in the loaded list");
    self.raise(
      AlertKind::Error,
      format!(
        "Task #{id} is no longer listed"
      )
    )
  }

  fn raise(
    &mut self,
    kind: AlertKind,
    message: String
  ) -> Vec<Effect> {
    self.alert_seq += 1;
    debug!(
      alert_id = self.alert_seq,
      ?kind,
      message = %message,
      "raising alert"
    );
    self.alert = Some(Alert {
      id: self.alert_seq,
      kind,
      message
    });
    vec![Effect::DismissAlertAfter {
      alert_id: self.alert_seq,
      delay:    ALERT_DISMISS_DELAY
    }]
  }
}

fn msg_name(msg: &Msg) -> &'static str {
  match msg {
    | Msg::Init => "init",
    | Msg::Reload => "reload",
    | Msg::SetFilter { .. } => {
      "set_filter"
    }
    | Msg::ClearFilter(_) => {
      "clear_filter"
    }
    | Msg::ClearFilters => "clear_filters",
    | Msg::TasksLoaded { .. } => {
      "tasks_loaded"
    }
    | Msg::TaskTypesLoaded(_) => {
      "task_types_loaded"
    }
    | Msg::ContactPersonsLoaded(_) => {
      "contact_persons_loaded"
    }
    | Msg::OpenCreate => "open_create",
    | Msg::OpenEdit(_) => "open_edit",
    | Msg::Duplicate(_) => "duplicate",
    | Msg::CloseModal => "close_modal",
    | Msg::EditForm { .. } => "edit_form",
    | Msg::SetFormStatus(_) => {
      "set_form_status"
    }
    | Msg::Submit => "submit",
    | Msg::TaskSaved { .. } => {
      "task_saved"
    }
    | Msg::ToggleStatus(_) => {
      "toggle_status"
    }
    | Msg::StatusChanged { .. } => {
      "status_changed"
    }
    | Msg::RequestDelete(_) => {
      "request_delete"
    }
    | Msg::DeleteConfirmed(_) => {
      "delete_confirmed"
    }
    | Msg::DeleteCancelled => {
      "delete_cancelled"
    }
    | Msg::TaskDeleted { .. } => {
      "task_deleted"
    }
    | Msg::AlertExpired(_) => {
      "alert_expired"
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::filter::SortOrder;

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 10, 17, 12, 0, 0
      )
      .single()
      .expect("valid now")
  }

  fn task(
    id: TaskId,
    status: TaskStatus
  ) -> Task {
    Task {
      id,
      date_created: now(),
      entity_name: format!("Entity {id}"),
      task_type: "Call".into(),
      task_time: now()
        + chrono::Duration::days(3),
      contact_person: "Dana".into(),
      note: Some("first contact".into()),
      status
    }
  }

  fn session() -> Session {
    Session::new(Zone::Named(
      chrono_tz::UTC
    ))
  }

  fn fetch_seq(
    effects: &[Effect]
  ) -> Option<u64> {
    effects.iter().find_map(|effect| {
      match effect {
        | Effect::FetchTasks {
          seq, ..
        } => Some(*seq),
        | _ => None
      }
    })
  }

  fn loaded(
    session: &mut Session,
    tasks: Vec<Task>
  ) {
    let effects =
      session.update(Msg::Reload, now());
    let seq =
      fetch_seq(&effects).expect("fetch");
    session.update(
      Msg::TasksLoaded {
        seq,
        result: Ok(tasks)
      },
      now()
    );
  }

  #[test]
  fn init_loads_list_and_lookups() {
    let mut session = session();
    let effects =
      session.update(Msg::Init, now());
    assert_eq!(
      effects,
      vec![
        Effect::FetchTasks {
          seq:   1,
          query: vec![(
            "sort_by".to_string(),
            "date_created".to_string()
          )]
        },
        Effect::FetchTaskTypes,
        Effect::FetchContactPersons,
      ]
    );
    assert!(session.is_loading());
    assert!(
      session.visible_tasks().is_empty()
    );
  }

  #[test]
  fn successful_load_replaces_list_and_clears_loading()
  {
    let mut session = session();
    loaded(
      &mut session,
      vec![
        task(1, TaskStatus::Open),
        task(2, TaskStatus::Closed),
        task(3, TaskStatus::Open),
      ]
    );
    assert!(!session.is_loading());
    assert_eq!(
      session.visible_tasks().len(),
      3
    );
  }

  #[test]
  fn failed_load_keeps_previous_rows() {
    let mut session = session();
    loaded(&mut session, vec![task(
      1,
      TaskStatus::Open
    )]);

    let effects =
      session.update(Msg::Reload, now());
    let seq =
      fetch_seq(&effects).expect("fetch");
    let effects = session.update(
      Msg::TasksLoaded {
        seq,
        result: Err(ApiError::Transport(
          "connection refused".into()
        ))
      },
      now()
    );

    assert!(!session.is_loading());
    assert_eq!(session.tasks().len(), 1);
    let alert =
      session.alert().expect("alert");
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(
      alert.message,
      "Error loading tasks: connection \
       refused"
    );
    assert_eq!(effects, vec![
      Effect::DismissAlertAfter {
        alert_id: alert.id,
        delay:    ALERT_DISMISS_DELAY
      }
    ]);
  }

  #[test]
  fn superseded_load_is_discarded() {
    let mut session = session();
    let first = fetch_seq(
      &session.update(Msg::Reload, now())
    )
    .expect("first");
    let second = fetch_seq(
      &session.update(
        Msg::SetFilter {
          field: FilterField::Status,
          value: "closed".into()
        },
        now()
      )
    )
    .expect("second");

    session.update(
      Msg::TasksLoaded {
        seq:    second,
        result: Ok(vec![task(
          2,
          TaskStatus::Closed
        )])
      },
      now()
    );
    session.update(
      Msg::TasksLoaded {
        seq:    first,
        result: Ok(vec![
          task(1, TaskStatus::Open),
          task(2, TaskStatus::Closed),
        ])
      },
      now()
    );

    assert_eq!(session.tasks().len(), 1);
    assert_eq!(session.tasks()[0].id, 2);
    assert!(!session.is_loading());
  }

  #[test]
  fn clearing_one_filter_reloads_with_the_rest()
  {
    let mut session = session()
      .with_filters(TaskFilters {
        entity_name: "Acme".into(),
        status: "open".into(),
        sort_order: Some(SortOrder::Asc),
        ..TaskFilters::default()
      });

    let effects = session.update(
      Msg::ClearFilter(
        FilterField::EntityName
      ),
      now()
    );

    assert_eq!(
      session.filters().entity_name,
      ""
    );
    assert_eq!(
      session.filters().status,
      "open"
    );
    assert_eq!(
      session.filters().sort_order,
      Some(SortOrder::Asc)
    );
    assert_eq!(effects, vec![
      Effect::FetchTasks {
        seq:   1,
        query: vec![
          (
            "status".to_string(),
            "open".to_string()
          ),
          (
            "sort_by".to_string(),
            "date_created".to_string()
          ),
          (
            "sort_order".to_string(),
            "asc".to_string()
          ),
        ]
      }
    ]);
  }

  #[test]
  fn clear_all_restores_defaults_and_reloads()
  {
    let mut session = session()
      .with_filters(TaskFilters {
        task_type: "Visit".into(),
        sort_order: Some(SortOrder::Desc),
        ..TaskFilters::default()
      });
    let effects = session
      .update(Msg::ClearFilters, now());
    assert_eq!(
      session.filters(),
      &TaskFilters::default()
    );
    assert!(fetch_seq(&effects).is_some());
  }

  #[test]
  fn bad_sort_key_alerts_without_loading()
  {
    let mut session = session();
    let effects = session.update(
      Msg::SetFilter {
        field: FilterField::SortBy,
        value: "colour".into()
      },
      now()
    );
    assert!(fetch_seq(&effects).is_none());
    assert_eq!(
      session.alert().map(|a| a.kind),
      Some(AlertKind::Error)
    );
  }

  #[test]
  fn past_submission_sends_nothing() {
    let mut session = session();
    session.update(Msg::OpenCreate, now());
    for (field, value) in [
      (FormField::EntityName, "Acme"),
      (FormField::TaskType, "Call"),
      (FormField::TaskDate, "2026-10-16"),
      (FormField::ContactPerson, "Dana"),
    ] {
      session.update(
        Msg::EditForm {
          field,
          value: value.into()
        },
        now()
      );
    }

    let effects =
      session.update(Msg::Submit, now());
    assert!(effects.iter().all(|e| {
      matches!(
        e,
        Effect::DismissAlertAfter { .. }
      )
    }));
    assert_eq!(
      session
        .alert()
        .map(|a| a.message.as_str()),
      Some(
        "Task due time cannot be in the \
         past"
      )
    );
    let editor =
      session.editor().expect("still open");
    assert!(!editor.busy());
  }

  #[test]
  fn create_success_closes_form_and_refreshes()
  {
    let mut session = session();
    session.update(Msg::OpenCreate, now());
    for (field, value) in [
      (FormField::EntityName, "Acme"),
      (FormField::TaskType, "Call"),
      (FormField::TaskDate, "2026-10-18"),
      (FormField::Hour, "09"),
      (FormField::Minute, "15"),
      (FormField::Meridiem, "AM"),
      (FormField::ContactPerson, "Dana"),
    ] {
      session.update(
        Msg::EditForm {
          field,
          value: value.into()
        },
        now()
      );
    }

    let effects =
      session.update(Msg::Submit, now());
    let [Effect::CreateTask { seq, payload }] =
      effects.as_slice()
    else {
      panic!("expected create, got {effects:?}");
    };
    assert_eq!(
      payload.task_time,
      Utc
        .with_ymd_and_hms(
          2026, 10, 18, 9, 15, 0
        )
        .single()
        .expect("valid")
    );
    assert!(
      session.editor().expect("open").busy()
    );
    let seq = *seq;

    let effects = session.update(
      Msg::TaskSaved {
        seq,
        mode:   EditorMode::Create,
        result: Ok(task(
          10,
          TaskStatus::Open
        ))
      },
      now()
    );
    assert!(session.editor().is_none());
    assert!(fetch_seq(&effects).is_some());
    assert!(
      effects
        .contains(&Effect::FetchTaskTypes)
    );
    assert!(effects.contains(
      &Effect::FetchContactPersons
    ));
    assert_eq!(
      session
        .alert()
        .map(|a| a.message.as_str()),
      Some("Task created successfully")
    );
  }

  #[test]
  fn failed_update_keeps_form_open() {
    let mut session = session();
    loaded(&mut session, vec![task(
      4,
      TaskStatus::Open
    )]);
    session
      .update(Msg::OpenEdit(4), now());
    let effects =
      session.update(Msg::Submit, now());
    let [Effect::UpdateTask {
      seq,
      id: 4,
      ..
    }] = effects.as_slice()
    else {
      panic!("expected update, got {effects:?}");
    };
    let seq = *seq;

    let effects = session.update(
      Msg::TaskSaved {
        seq,
        mode:   EditorMode::Edit(4),
        result: Err(ApiError::Status {
          status:  500,
          message: "boom".into()
        })
      },
      now()
    );
    assert!(fetch_seq(&effects).is_none());
    let editor =
      session.editor().expect("still open");
    assert!(!editor.busy());
    assert_eq!(
      session
        .alert()
        .map(|a| a.message.as_str()),
      Some(
        "Error updating task: boom (HTTP \
         500)"
      )
    );
  }

  fn submit_filled_create(
    session: &mut Session
  ) -> u64 {
    session.update(Msg::OpenCreate, now());
    for (field, value) in [
      (FormField::EntityName, "Acme"),
      (FormField::TaskType, "Call"),
      (FormField::TaskDate, "2026-10-18"),
      (FormField::Hour, "09"),
      (FormField::Minute, "15"),
      (FormField::Meridiem, "AM"),
      (FormField::ContactPerson, "Dana"),
    ] {
      session.update(
        Msg::EditForm {
          field,
          value: value.into()
        },
        now()
      );
    }
    let effects =
      session.update(Msg::Submit, now());
    match effects.as_slice() {
      | [Effect::CreateTask { seq, .. }] => {
        *seq
      }
      | other => {
        panic!("expected create, got {other:?}")
      }
    }
  }

  #[test]
  fn late_save_leaves_newer_form_alone() {
    let mut session = session();
    let first =
      submit_filled_create(&mut session);
    session.update(Msg::CloseModal, now());
    session.update(Msg::OpenCreate, now());
    session.update(
      Msg::EditForm {
        field: FormField::EntityName,
        value: "half typed".into()
      },
      now()
    );

    let effects = session.update(
      Msg::TaskSaved {
        seq:    first,
        mode:   EditorMode::Create,
        result: Ok(task(
          11,
          TaskStatus::Open
        ))
      },
      now()
    );
    let editor = session
      .editor()
      .expect("newer form stays open");
    assert_eq!(
      editor.form.entity_name,
      "half typed"
    );
    assert!(!editor.busy());
    assert!(fetch_seq(&effects).is_some());
    assert_eq!(
      session
        .alert()
        .map(|a| a.message.as_str()),
      Some("Task created successfully")
    );
  }

  #[test]
  fn late_failure_keeps_newer_save_busy() {
    let mut session = session();
    let first =
      submit_filled_create(&mut session);
    session.update(Msg::CloseModal, now());
    let second =
      submit_filled_create(&mut session);
    assert_ne!(first, second);

    session.update(
      Msg::TaskSaved {
        seq:    first,
        mode:   EditorMode::Create,
        result: Err(ApiError::Transport(
          "offline".into()
        ))
      },
      now()
    );
    assert_eq!(
      session
        .editor()
        .and_then(|editor| editor.saving),
      Some(second)
    );

    session.update(
      Msg::TaskSaved {
        seq:    second,
        mode:   EditorMode::Create,
        result: Ok(task(
          12,
          TaskStatus::Open
        ))
      },
      now()
    );
    assert!(session.editor().is_none());
  }

  #[test]
  fn duplicate_opens_create_form() {
    let mut session = session();
    loaded(&mut session, vec![task(
      5,
      TaskStatus::Closed
    )]);
    session
      .update(Msg::Duplicate(5), now());
    let editor =
      session.editor().expect("open");
    assert_eq!(
      editor.mode,
      EditorMode::Create
    );
    assert_eq!(
      editor.form.status,
      TaskStatus::Open
    );
    assert_eq!(
      editor.form.entity_name,
      "Entity 5"
    );
  }

  #[test]
  fn toggle_flips_status_and_reloads() {
    let mut session = session();
    loaded(&mut session, vec![task(
      6,
      TaskStatus::Open
    )]);
    let effects = session
      .update(Msg::ToggleStatus(6), now());
    assert_eq!(effects, vec![
      Effect::PatchStatus {
        id:     6,
        status: TaskStatus::Closed
      }
    ]);

    let effects = session.update(
      Msg::StatusChanged {
        id:     6,
        status: TaskStatus::Closed,
        result: Ok(task(
          6,
          TaskStatus::Closed
        ))
      },
      now()
    );
    assert!(fetch_seq(&effects).is_some());
    assert_eq!(
      session
        .alert()
        .map(|a| a.message.as_str()),
      Some("Task status changed to closed")
    );
  }

  #[test]
  fn delete_requires_matching_confirmation()
  {
    let mut session = session();
    loaded(&mut session, vec![
      task(7, TaskStatus::Open),
      task(8, TaskStatus::Open),
    ]);

    assert!(
      session
        .update(Msg::DeleteConfirmed(7), now())
        .is_empty()
    );

    let effects = session
      .update(Msg::RequestDelete(7), now());
    assert_eq!(effects, vec![
      Effect::ConfirmDelete {
        id:     7,
        prompt: DELETE_PROMPT.to_string()
      }
    ]);
    assert!(
      session
        .update(Msg::DeleteConfirmed(8), now())
        .is_empty()
    );

    let effects = session.update(
      Msg::DeleteConfirmed(7),
      now()
    );
    assert_eq!(effects, vec![
      Effect::DeleteTask(7)
    ]);
    assert_eq!(
      session.pending_delete(),
      None
    );

    let effects = session.update(
      Msg::TaskDeleted {
        id:     7,
        result: Ok(())
      },
      now()
    );
    assert!(fetch_seq(&effects).is_some());
  }

  #[test]
  fn cancelled_delete_sends_nothing() {
    let mut session = session();
    session
      .update(Msg::RequestDelete(3), now());
    session
      .update(Msg::DeleteCancelled, now());
    assert!(
      session
        .update(Msg::DeleteConfirmed(3), now())
        .is_empty()
    );
  }

  #[test]
  fn stale_alert_timer_keeps_newer_alert()
  {
    let mut session = session();
    session.update(
      Msg::StatusChanged {
        id:     1,
        status: TaskStatus::Open,
        result: Err(ApiError::Transport(
          "offline".into()
        ))
      },
      now()
    );
    let first =
      session.alert().expect("first").id;
    session.update(Msg::Reload, now());
    session.update(
      Msg::TaskDeleted {
        id:     1,
        result: Err(ApiError::Transport(
          "offline".into()
        ))
      },
      now()
    );
    let second =
      session.alert().expect("second").id;
    assert_ne!(first, second);

    session.update(
      Msg::AlertExpired(first),
      now()
    );
    assert_eq!(
      session.alert().map(|a| a.id),
      Some(second)
    );
    session.update(
      Msg::AlertExpired(second),
      now()
    );
    assert!(session.alert().is_none());
  }

  #[test]
  fn lookup_failure_keeps_old_values() {
    let mut session = session();
    session.update(
      Msg::TaskTypesLoaded(Ok(vec![
        "Call".into(),
        "Meeting".into(),
      ])),
      now()
    );
    session.update(
      Msg::TaskTypesLoaded(Err(
        ApiError::Transport(
          "offline".into()
        )
      )),
      now()
    );
    assert_eq!(session.task_types().len(), 2);
    assert!(session.alert().is_none());
  }
}
