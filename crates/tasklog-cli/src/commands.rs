use anyhow::{
  Context,
  anyhow
};
use tasklog_core::api::TaskApi;
use tasklog_core::config::Settings;
use tasklog_core::driver::{
  Confirm,
  Driver
};
use tasklog_core::filter::TaskFilters;
use tasklog_core::form::FormField;
use tasklog_core::session::{
  Alert,
  AlertKind,
  Msg,
  Session
};
use tasklog_core::task::{
  TaskId,
  TaskStatus
};
use tracing::{
  debug,
  info,
  warn
};

use crate::cli::{
  Command,
  ListArgs,
  ScheduleArgs,
  TaskFields
};
use crate::http::HttpTaskApi;
use crate::prompt::StdinConfirm;
use crate::render::Renderer;

#[tracing::instrument(skip(
  command, settings
))]
pub async fn execute(
  command: Command,
  settings: &Settings
) -> anyhow::Result<()> {
  let api = HttpTaskApi::new(settings)?;
  let renderer = Renderer::new(
    settings.color,
    settings.zone
  );

  match command {
    | Command::Types => {
      let types = api
        .task_types()
        .await
        .context(
          "failed to load task types"
        )?;
      renderer.print_names(&types)
    }
    | Command::Contacts => {
      let persons = api
        .contact_persons()
        .await
        .context(
          "failed to load contact persons"
        )?;
      renderer.print_names(&persons)
    }
    | Command::List(args) => {
      let mut driver = Driver::new(
        session_for(settings, &args)?,
        api,
        StdinConfirm::new(false)
      );
      list(&mut driver, &renderer).await
    }
    | Command::Add(args) => {
      let mut driver =
        plain_driver(settings, api, false);
      let alert = add(
        &mut driver,
        &renderer,
        &TaskFields::from(args)
      )
      .await?;
      report(&renderer, alert)
    }
    | Command::Edit { id, fields } => {
      let mut driver =
        plain_driver(settings, api, false);
      let alert = edit(
        &mut driver,
        &renderer,
        id,
        &fields
      )
      .await?;
      report(&renderer, alert)
    }
    | Command::Duplicate {
      id,
      schedule
    } => {
      let mut driver =
        plain_driver(settings, api, false);
      let alert = duplicate(
        &mut driver,
        &renderer,
        id,
        &schedule
      )
      .await?;
      report(&renderer, alert)
    }
    | Command::Toggle { id } => {
      let mut driver =
        plain_driver(settings, api, false);
      let alert =
        toggle(&mut driver, &renderer, id)
          .await?;
      report(&renderer, alert)
    }
    | Command::Delete { id, yes } => {
      let mut driver =
        plain_driver(settings, api, yes);
      match delete(&mut driver, &renderer, id)
        .await?
      {
        | Some(alert) => {
          renderer.print_alert(&alert)
        }
        | None => {
          println!("Deletion cancelled.");
          Ok(())
        }
      }
    }
  }
}

fn session_for(
  settings: &Settings,
  args: &ListArgs
) -> anyhow::Result<Session> {
  let filters: TaskFilters = args
    .to_filters()
    .context("invalid list filters")?;
  Ok(
    Session::new(settings.zone)
      .with_filters(filters)
  )
}

fn plain_driver(
  settings: &Settings,
  api: HttpTaskApi,
  assume_yes: bool
) -> Driver<HttpTaskApi, StdinConfirm> {
  Driver::new(
    Session::new(settings.zone),
    api,
    StdinConfirm::new(assume_yes)
  )
}

fn report(
  renderer: &Renderer,
  alert: Option<Alert>
) -> anyhow::Result<()> {
  match alert {
    | Some(alert) => {
      renderer.print_alert(&alert)
    }
    | None => Ok(())
  }
}

/// Dispatches `msg`. The first alert it
/// raises is the message's own outcome: an
/// error becomes an `Err`, a success is
/// handed back. Errors raised after it come
/// from follow-up reloads and are only
/// printed as warnings.
async fn settle<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  msg: Msg
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  let dispatched = driver.dispatch(msg).await;
  debug!(
    timers = dispatched.timers.len(),
    "dropping alert timers"
  );

  let mut alerts = dispatched.alerts.into_iter();
  let Some(outcome) = alerts.next() else {
    return Ok(None);
  };
  for later in alerts {
    if later.kind == AlertKind::Error {
      warn!(message = %later.message, "follow-up request failed");
      renderer.print_warning(&later)?;
    }
  }

  match outcome.kind {
    | AlertKind::Error => {
      Err(anyhow!("{}", outcome.message))
    }
    | AlertKind::Success => Ok(Some(outcome))
  }
}

async fn list<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer
) -> anyhow::Result<()>
where
  A: TaskApi,
  C: Confirm
{
  settle(driver, renderer, Msg::Reload)
    .await?;
  let session = driver.session();
  renderer.print_active_filters(
    &session.filters().active_badges()
  )?;
  renderer
    .print_task_table(session.visible_tasks())
}

async fn fill_and_submit<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  edits: Vec<(FormField, String)>,
  status: Option<TaskStatus>
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  for (field, value) in edits {
    settle(
      driver,
      renderer,
      Msg::EditForm { field, value }
    )
    .await?;
  }
  if let Some(status) = status {
    settle(
      driver,
      renderer,
      Msg::SetFormStatus(status)
    )
    .await?;
  }
  settle(driver, renderer, Msg::Submit)
    .await
}

async fn add<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  fields: &TaskFields
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  settle(driver, renderer, Msg::OpenCreate)
    .await?;
  fill_and_submit(
    driver,
    renderer,
    fields.form_edits(),
    fields.status
  )
  .await
}

/// Loads the list so the task's current
/// values can seed the form.
async fn edit<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  id: TaskId,
  fields: &TaskFields
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  settle(driver, renderer, Msg::Reload)
    .await?;
  settle(driver, renderer, Msg::OpenEdit(id))
    .await?;
  info!(id, "editing task");
  fill_and_submit(
    driver,
    renderer,
    fields.form_edits(),
    fields.status
  )
  .await
}

async fn duplicate<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  id: TaskId,
  schedule: &ScheduleArgs
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  settle(driver, renderer, Msg::Reload)
    .await?;
  settle(
    driver,
    renderer,
    Msg::Duplicate(id)
  )
  .await?;
  fill_and_submit(
    driver,
    renderer,
    schedule.form_edits(),
    None
  )
  .await
}

async fn toggle<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  id: TaskId
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  settle(driver, renderer, Msg::Reload)
    .await?;
  settle(
    driver,
    renderer,
    Msg::ToggleStatus(id)
  )
  .await
}

/// `None` when the user declined.
async fn delete<A, C>(
  driver: &mut Driver<A, C>,
  renderer: &Renderer,
  id: TaskId
) -> anyhow::Result<Option<Alert>>
where
  A: TaskApi,
  C: Confirm
{
  settle(
    driver,
    renderer,
    Msg::RequestDelete(id)
  )
  .await
}
