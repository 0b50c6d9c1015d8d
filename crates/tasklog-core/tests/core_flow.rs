use std::cell::{
  Cell,
  RefCell
};
use std::fs;

use chrono::{
  TimeZone,
  Utc
};
use tasklog_core::api::{
  ApiError,
  Endpoint,
  TaskApi
};
use tasklog_core::config::{
  Config,
  Settings
};
use tasklog_core::driver::{
  AutoConfirm,
  Driver
};
use tasklog_core::filter::FilterField;
use tasklog_core::form::FormField;
use tasklog_core::session::{
  AlertKind,
  Effect,
  Msg,
  Session
};
use tasklog_core::task::{
  Task,
  TaskId,
  TaskPayload,
  TaskStatus
};
use tasklog_core::Zone;
use tempfile::tempdir;

#[derive(Default)]
struct MemoryApi {
  tasks:    RefCell<Vec<Task>>,
  next_id:  Cell<TaskId>,
  calls:    RefCell<Vec<String>>,
  offline:  Cell<bool>
}

impl MemoryApi {
  fn seeded(tasks: Vec<Task>) -> Self {
    let next = tasks
      .iter()
      .map(|task| task.id)
      .max()
      .unwrap_or(0);
    Self {
      tasks: RefCell::new(tasks),
      next_id: Cell::new(next),
      ..Self::default()
    }
  }

  fn record(
    &self,
    endpoint: Endpoint
  ) -> Result<(), ApiError> {
    self
      .calls
      .borrow_mut()
      .push(endpoint.to_string());
    if self.offline.get() {
      return Err(ApiError::Transport(
        "connection refused".into()
      ));
    }
    Ok(())
  }

  fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  fn store(
    &self,
    id: TaskId,
    payload: &TaskPayload
  ) -> Task {
    Task {
      id,
      date_created: Utc::now(),
      entity_name: payload
        .entity_name
        .clone(),
      task_type: payload.task_type.clone(),
      task_time: payload.task_time,
      contact_person: payload
        .contact_person
        .clone(),
      note: Some(payload.note.clone()),
      status: payload.status
    }
  }
}

impl TaskApi for MemoryApi {
  async fn list_tasks(
    &self,
    query: &[(String, String)]
  ) -> Result<Vec<Task>, ApiError> {
    self.record(Endpoint::list_tasks())?;
    let wanted = |key: &str| {
      query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
    };
    let status = wanted("status");
    let entity = wanted("entity_name");

    Ok(
      self
        .tasks
        .borrow()
        .iter()
        .filter(|task| {
          status.as_deref().is_none_or(
            |s| task.status.as_str() == s
          )
        })
        .filter(|task| {
          entity.as_deref().is_none_or(
            |e| task.entity_name.contains(e)
          )
        })
        .cloned()
        .collect()
    )
  }

  async fn create_task(
    &self,
    payload: &TaskPayload
  ) -> Result<Task, ApiError> {
    self.record(Endpoint::create_task())?;
    let id = self.next_id.get() + 1;
    self.next_id.set(id);
    let task = self.store(id, payload);
    self
      .tasks
      .borrow_mut()
      .push(task.clone());
    Ok(task)
  }

  async fn update_task(
    &self,
    id: TaskId,
    payload: &TaskPayload
  ) -> Result<Task, ApiError> {
    self.record(Endpoint::update_task(id))?;
    let updated = self.store(id, payload);
    let mut tasks = self.tasks.borrow_mut();
    let slot = tasks
      .iter_mut()
      .find(|task| task.id == id)
      .ok_or_else(|| {
        ApiError::from_response(404, "")
      })?;
    *slot = updated.clone();
    Ok(updated)
  }

  async fn update_task_status(
    &self,
    id: TaskId,
    status: TaskStatus
  ) -> Result<Task, ApiError> {
    self.record(
      Endpoint::update_task_status(id)
    )?;
    let mut tasks = self.tasks.borrow_mut();
    let task = tasks
      .iter_mut()
      .find(|task| task.id == id)
      .ok_or_else(|| {
        ApiError::from_response(404, "")
      })?;
    task.status = status;
    Ok(task.clone())
  }

  async fn delete_task(
    &self,
    id: TaskId
  ) -> Result<(), ApiError> {
    self.record(Endpoint::delete_task(id))?;
    self
      .tasks
      .borrow_mut()
      .retain(|task| task.id != id);
    Ok(())
  }

  async fn task_types(
    &self
  ) -> Result<Vec<String>, ApiError> {
    self.record(Endpoint::task_types())?;
    let mut types: Vec<String> = self
      .tasks
      .borrow()
      .iter()
      .map(|task| task.task_type.clone())
      .collect();
    types.sort();
    types.dedup();
    Ok(types)
  }

  async fn contact_persons(
    &self
  ) -> Result<Vec<String>, ApiError> {
    self.record(
      Endpoint::contact_persons()
    )?;
    let mut persons: Vec<String> = self
      .tasks
      .borrow()
      .iter()
      .map(|task| {
        task.contact_person.clone()
      })
      .collect();
    persons.sort();
    persons.dedup();
    Ok(persons)
  }
}

fn seed(
  id: TaskId,
  entity: &str,
  status: TaskStatus
) -> Task {
  let created = Utc
    .with_ymd_and_hms(
      2026, 10, 1, 9, 0, 0
    )
    .single()
    .expect("valid created");
  Task {
    id,
    date_created: created,
    entity_name: entity.to_string(),
    task_type: "Call".to_string(),
    task_time: Utc
      .with_ymd_and_hms(
        2099, 5, 4, 10, 30, 0
      )
      .single()
      .expect("valid task time"),
    contact_person: "Dana".to_string(),
    note: None,
    status
  }
}

fn driver(
  api: MemoryApi,
  confirm: bool
) -> Driver<MemoryApi, AutoConfirm> {
  Driver::new(
    Session::new(Zone::Named(
      chrono_tz::UTC
    )),
    api,
    AutoConfirm(confirm)
  )
}

async fn fill_form(
  driver: &mut Driver<
    MemoryApi,
    AutoConfirm
  >,
  date: &str
) {
  for (field, value) in [
    (FormField::EntityName, "Globex"),
    (FormField::TaskType, "Meeting"),
    (FormField::TaskDate, date),
    (FormField::Hour, "10"),
    (FormField::Minute, "45"),
    (FormField::Meridiem, "AM"),
    (FormField::ContactPerson, "Hank"),
    (FormField::Note, "  demo  "),
  ] {
    driver
      .dispatch(Msg::EditForm {
        field,
        value: value.to_string()
      })
      .await;
  }
}

#[tokio::test]
async fn init_loads_everything() {
  let api = MemoryApi::seeded(vec![
    seed(1, "Acme", TaskStatus::Open),
    seed(2, "Initech", TaskStatus::Closed),
  ]);
  let mut driver = driver(api, true);

  let dispatched =
    driver.dispatch(Msg::Init).await;

  assert!(dispatched.timers.is_empty());
  assert!(dispatched.alerts.is_empty());
  let session = driver.session();
  assert!(!session.is_loading());
  assert_eq!(
    session.visible_tasks().len(),
    2
  );
  assert_eq!(
    session.task_types(),
    ["Call".to_string()]
  );
  assert_eq!(
    session.contact_persons(),
    ["Dana".to_string()]
  );
}

#[tokio::test]
async fn create_reloads_list_and_lookups() {
  let mut driver =
    driver(MemoryApi::default(), true);
  driver.dispatch(Msg::Init).await;
  driver.dispatch(Msg::OpenCreate).await;
  fill_form(&mut driver, "2099-01-02")
    .await;

  let timers =
    driver.dispatch(Msg::Submit).await;

  assert!(matches!(
    timers.timers.as_slice(),
    [Effect::DismissAlertAfter { .. }]
  ));
  let session = driver.session();
  assert!(session.editor().is_none());
  assert_eq!(session.tasks().len(), 1);
  let created = &session.tasks()[0];
  assert_eq!(created.note.as_deref(), Some("demo"));
  assert_eq!(
    created.task_time,
    Utc
      .with_ymd_and_hms(
        2099, 1, 2, 10, 45, 0
      )
      .single()
      .expect("valid")
  );
  assert_eq!(
    session.task_types(),
    ["Meeting".to_string()]
  );
  assert_eq!(
    driver.api().calls()[3..],
    [
      "POST /tasks".to_string(),
      "GET /tasks".to_string(),
      "GET /task-types".to_string(),
      "GET /contact-persons".to_string(),
    ]
  );
}

#[tokio::test]
async fn past_submission_never_reaches_the_api()
{
  let mut driver =
    driver(MemoryApi::default(), true);
  driver.dispatch(Msg::OpenCreate).await;
  fill_form(&mut driver, "2001-01-01")
    .await;

  driver.dispatch(Msg::Submit).await;

  assert!(driver.api().calls().is_empty());
  let session = driver.session();
  assert!(session.editor().is_some());
  assert_eq!(
    session.alert().map(|a| a.kind),
    Some(AlertKind::Error)
  );
}

#[tokio::test]
async fn confirmed_delete_removes_and_reloads()
{
  let api = MemoryApi::seeded(vec![
    seed(1, "Acme", TaskStatus::Open),
    seed(2, "Initech", TaskStatus::Open),
  ]);
  let mut driver = driver(api, true);
  driver.dispatch(Msg::Reload).await;

  driver
    .dispatch(Msg::RequestDelete(2))
    .await;

  assert_eq!(
    driver.api().calls(),
    [
      "GET /tasks".to_string(),
      "DELETE /tasks/2".to_string(),
      "GET /tasks".to_string(),
    ]
  );
  let ids: Vec<TaskId> = driver
    .session()
    .tasks()
    .iter()
    .map(|task| task.id)
    .collect();
  assert_eq!(ids, [1]);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
  let api = MemoryApi::seeded(vec![seed(
    1,
    "Acme",
    TaskStatus::Open
  )]);
  let mut driver = driver(api, false);
  driver
    .dispatch(Msg::RequestDelete(1))
    .await;
  assert!(driver.api().calls().is_empty());
  assert_eq!(
    driver.session().pending_delete(),
    None
  );
}

#[tokio::test]
async fn toggle_and_filter_round_trip() {
  let api = MemoryApi::seeded(vec![
    seed(1, "Acme", TaskStatus::Open),
    seed(2, "Initech", TaskStatus::Open),
  ]);
  let mut driver = driver(api, true);
  driver.dispatch(Msg::Reload).await;
  driver
    .dispatch(Msg::ToggleStatus(1))
    .await;

  driver
    .dispatch(Msg::SetFilter {
      field: FilterField::Status,
      value: "closed".to_string()
    })
    .await;
  let ids: Vec<TaskId> = driver
    .session()
    .tasks()
    .iter()
    .map(|task| task.id)
    .collect();
  assert_eq!(ids, [1]);

  driver
    .dispatch(Msg::ClearFilter(
      FilterField::Status
    ))
    .await;
  assert_eq!(
    driver.session().tasks().len(),
    2
  );
}

#[tokio::test]
async fn offline_load_keeps_rows_and_alerts()
{
  let api = MemoryApi::seeded(vec![seed(
    1,
    "Acme",
    TaskStatus::Open
  )]);
  let mut driver = driver(api, true);
  driver.dispatch(Msg::Reload).await;
  driver.api().offline.set(true);

  driver.dispatch(Msg::Reload).await;

  let session = driver.session();
  assert!(!session.is_loading());
  assert_eq!(session.tasks().len(), 1);
  assert_eq!(
    session.alert().map(|a| a.message.clone()),
    Some(
      "Error loading tasks: connection \
       refused"
        .to_string()
    )
  );
}

#[test]
fn rc_file_with_include_resolves_settings()
{
  let temp = tempdir().expect("tempdir");
  let extra = temp.path().join("extra.rc");
  fs::write(
    &extra,
    "timezone = America/Chicago\n"
  )
  .expect("write include");
  let rc = temp.path().join("tasklogrc");
  fs::write(
    &rc,
    "# local dev server\napi.url = \
     http://127.0.0.1:8080/api  # trailing \
     comment\napi.timeout = 5\ninclude \
     extra.rc\n"
  )
  .expect("write rc");

  let mut cfg = Config::load(Some(rc.as_path()))
    .expect("load rc");
  assert_eq!(cfg.loaded_files.len(), 2);
  cfg.apply_overrides([(
    "rc.color".to_string(),
    "off".to_string()
  )]);

  let settings = Settings::from_config(
    &cfg
  )
  .expect("settings");
  assert_eq!(
    settings.api_url,
    "http://127.0.0.1:8080/api"
  );
  assert_eq!(
    settings.timeout.as_secs(),
    5
  );
  assert!(!settings.color);
  if std::env::var(
    tasklog_core::config::TIMEZONE_ENV_VAR
  )
  .is_err()
  {
    assert_eq!(
      settings.zone,
      Zone::Named(
        chrono_tz::America::Chicago
      )
    );
  }
}

#[test]
fn malformed_rc_line_is_an_error() {
  let temp = tempdir().expect("tempdir");
  let rc = temp.path().join("tasklogrc");
  fs::write(&rc, "api.url\n")
    .expect("write rc");
  assert!(Config::load(Some(rc.as_path())).is_err());
}

#[test]
fn self_including_rc_is_an_error() {
  let temp = tempdir().expect("tempdir");
  let rc = temp.path().join("tasklogrc");
  fs::write(
    &rc,
    "api.timeout = 5\ninclude tasklogrc\n"
  )
  .expect("write rc");

  let err = Config::load(Some(rc.as_path()))
    .expect_err("cycle rejected");
  assert!(
    format!("{err:#}")
      .contains("include cycle"),
    "unexpected error: {err:#}"
  );
}

#[test]
fn indirect_include_cycle_is_an_error() {
  let temp = tempdir().expect("tempdir");
  let rc = temp.path().join("tasklogrc");
  let extra = temp.path().join("extra.rc");
  fs::write(&rc, "include extra.rc\n")
    .expect("write rc");
  fs::write(
    &extra,
    "color = off\ninclude tasklogrc\n"
  )
  .expect("write include");

  assert!(Config::load(Some(rc.as_path())).is_err());
}

#[test]
fn same_file_included_twice_loads() {
  let temp = tempdir().expect("tempdir");
  let rc = temp.path().join("tasklogrc");
  let shared = temp.path().join("shared.rc");
  fs::write(&shared, "api.timeout = 7\n")
    .expect("write include");
  fs::write(
    &rc,
    "include shared.rc\ninclude shared.rc\n"
  )
  .expect("write rc");

  let cfg = Config::load(Some(rc.as_path()))
    .expect("repeat include is not a cycle");
  assert_eq!(cfg.loaded_files.len(), 3);
  assert_eq!(
    cfg.get("api.timeout").as_deref(),
    Some("7")
  );
}
