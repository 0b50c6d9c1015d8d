use std::collections::VecDeque;

use chrono::Utc;
use tracing::{
  debug,
  instrument
};

use crate::api::TaskApi;
use crate::session::{
  Alert,
  Effect,
  EditorMode,
  Msg,
  Session
};

/// What became of one effect.
#[derive(Debug)]
pub enum Step {
  /// The collaborator answered; feed
  /// this back into the session.
  Reply(Msg),
  /// Needs the user or a timer; the
  /// front end decides how.
  Deferred(Effect)
}

/// Carries out a single effect against
/// the collaborator.
#[instrument(skip(api))]
pub async fn perform<A: TaskApi>(
  api: &A,
  effect: Effect
) -> Step {
  let msg = match effect {
    | Effect::FetchTasks {
      seq,
      query
    } => {
      Msg::TasksLoaded {
        seq,
        result: api
          .list_tasks(&query)
          .await
      }
    }
    | Effect::FetchTaskTypes => {
      Msg::TaskTypesLoaded(
        api.task_types().await
      )
    }
    | Effect::FetchContactPersons => {
      Msg::ContactPersonsLoaded(
        api.contact_persons().await
      )
    }
    | Effect::CreateTask {
      seq,
      payload
    } => {
      Msg::TaskSaved {
        seq,
        mode: EditorMode::Create,
        result: api
          .create_task(&payload)
          .await
      }
    }
    | Effect::UpdateTask {
      seq,
      id,
      payload
    } => {
      Msg::TaskSaved {
        seq,
        mode: EditorMode::Edit(id),
        result: api
          .update_task(id, &payload)
          .await
      }
    }
    | Effect::PatchStatus {
      id,
      status
    } => {
      Msg::StatusChanged {
        id,
        status,
        result: api
          .update_task_status(id, status)
          .await
      }
    }
    | Effect::DeleteTask(id) => {
      Msg::TaskDeleted {
        id,
        result: api.delete_task(id).await
      }
    }
    | deferred @ (Effect::ConfirmDelete {
      ..
    }
    | Effect::DismissAlertAfter {
      ..
    }) => return Step::Deferred(deferred)
  };
  Step::Reply(msg)
}

/// What one [`Driver::dispatch`] left
/// behind.
#[derive(Debug, Default)]
pub struct Dispatched {
  /// Alert timers, returned rather than
  /// waited on.
  pub timers: Vec<Effect>,
  /// Every alert raised on the way, oldest
  /// first. The first one answers the
  /// dispatched message itself; later ones
  /// come from the reloads it triggered.
  pub alerts: Vec<Alert>
}

/// Answers delete confirmations for
/// [`Driver`].
pub trait Confirm {
  fn confirm(
    &mut self,
    prompt: &str
  ) -> bool;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
  fn confirm(
    &mut self,
    _prompt: &str
  ) -> bool {
    self.0
  }
}

/// Runs a [`Session`] against a
/// collaborator until no request is
/// outstanding. Effects are performed one
/// at a time in the order they were
/// issued.
pub struct Driver<A, C> {
  session: Session,
  api:     A,
  confirm: C
}

impl<A, C> Driver<A, C>
where
  A: TaskApi,
  C: Confirm
{
  pub fn new(
    session: Session,
    api: A,
    confirm: C
  ) -> Self {
    Self {
      session,
      api,
      confirm
    }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn api(&self) -> &A {
    &self.api
  }

  pub fn into_session(self) -> Session {
    self.session
  }

  /// Applies `msg` and every reply it
  /// leads to.
  #[instrument(skip(self, msg))]
  pub async fn dispatch(
    &mut self,
    msg: Msg
  ) -> Dispatched {
    let mut inbox = VecDeque::from([msg]);
    let mut out = Dispatched::default();
    let mut last_alert =
      self.session.alert().map(|a| a.id);

    while let Some(msg) = inbox.pop_front()
    {
      let effects =
        self.session.update(msg, Utc::now());
      if let Some(alert) = self.session.alert()
        && Some(alert.id) != last_alert
      {
        last_alert = Some(alert.id);
        out.alerts.push(alert.clone());
      }
      for effect in effects {
        match perform(&self.api, effect)
          .await
        {
          | Step::Reply(reply) => {
            inbox.push_back(reply)
          }
          | Step::Deferred(
            Effect::ConfirmDelete {
              id,
              prompt
            }
          ) => {
            let answer =
              self.confirm.confirm(&prompt);
            debug!(id, answer, "delete confirmation");
            inbox.push_back(if answer {
              Msg::DeleteConfirmed(id)
            } else {
              Msg::DeleteCancelled
            });
          }
          | Step::Deferred(timer) => {
            out.timers.push(timer)
          }
        }
      }
    }

    out
  }
}
