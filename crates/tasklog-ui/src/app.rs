use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo::timers::future::TimeoutFuture;
use tasklog_core::driver::{
  Step,
  perform
};
use tasklog_core::filter::FilterField;
use tasklog_core::form::FormField;
use tasklog_core::session::{
  Effect,
  Msg,
  Session
};
use tasklog_core::task::{
  TaskId,
  TaskStatus
};
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_memo,
  use_mut_ref
};

use crate::api::BrowserTaskApi;
use crate::components::{
  ActiveFilters,
  AlertBanner,
  FilterBar,
  TaskModal,
  TaskTable
};
use crate::config;

/// Feeds messages into the shared
/// session and carries out the effects
/// it asks for on the page's event loop.
#[derive(Clone)]
struct Dispatcher {
  session: Rc<RefCell<Session>>,
  api:     Rc<BrowserTaskApi>,
  redraw:  Callback<()>
}

impl Dispatcher {
  fn send(&self, msg: Msg) {
    let effects = self
      .session
      .borrow_mut()
      .update(msg, Utc::now());
    self.redraw.emit(());
    for effect in effects {
      self.run(effect);
    }
  }

  fn run(&self, effect: Effect) {
    let this = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        match perform(
          this.api.as_ref(),
          effect
        )
        .await
        {
          | Step::Reply(msg) => this.send(msg),
          | Step::Deferred(
            Effect::ConfirmDelete {
              id,
              prompt
            }
          ) => {
            let msg = if gloo::dialogs::confirm(
              &prompt
            ) {
              Msg::DeleteConfirmed(id)
            } else {
              Msg::DeleteCancelled
            };
            this.send(msg);
          }
          | Step::Deferred(
            Effect::DismissAlertAfter {
              alert_id,
              delay
            }
          ) => {
            let millis = u32::try_from(
              delay.as_millis()
            )
            .unwrap_or(u32::MAX);
            TimeoutFuture::new(millis)
              .await;
            this.send(Msg::AlertExpired(
              alert_id
            ));
          }
          | Step::Deferred(other) => {
            tracing::warn!(
              ?other,
              "effect cannot be deferred"
            );
          }
        }
      }
    );
  }

  fn callback<T, F>(
    &self,
    to_msg: F
  ) -> Callback<T>
  where
    T: 'static,
    F: Fn(T) -> Msg + 'static
  {
    let this = self.clone();
    Callback::from(move |value: T| {
      this.send(to_msg(value))
    })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let config = use_memo((), |_| {
    config::load()
  });
  let session = {
    let zone = config.zone;
    use_mut_ref(move || Session::new(zone))
  };
  let api = {
    let api_url = config.api_url.clone();
    use_memo((), move |_| {
      BrowserTaskApi::new(&api_url)
    })
  };
  let force_update = use_force_update();

  let dispatcher = Dispatcher {
    session: session.clone(),
    api,
    redraw: Callback::from(move |()| {
      force_update.force_update()
    })
  };

  {
    let dispatcher = dispatcher.clone();
    use_effect_with((), move |_| {
      tracing::debug!(
        "app mounted; loading tasks"
      );
      dispatcher.send(Msg::Init);
      || ()
    });
  }

  let on_filter = dispatcher.callback(
    |(field, value): (FilterField, String)| {
      Msg::SetFilter { field, value }
    }
  );
  let on_clear_filter =
    dispatcher.callback(Msg::ClearFilter);
  let on_reset_filters = dispatcher
    .callback(|()| Msg::ClearFilters);
  let on_new =
    dispatcher.callback(|()| Msg::OpenCreate);
  let on_edit =
    dispatcher.callback(Msg::OpenEdit);
  let on_duplicate =
    dispatcher.callback(Msg::Duplicate);
  let on_toggle =
    dispatcher.callback(Msg::ToggleStatus);
  let on_delete: Callback<TaskId> =
    dispatcher.callback(Msg::RequestDelete);
  let on_form_field = dispatcher.callback(
    |(field, value): (FormField, String)| {
      Msg::EditForm { field, value }
    }
  );
  let on_form_status: Callback<TaskStatus> =
    dispatcher.callback(Msg::SetFormStatus);
  let on_submit =
    dispatcher.callback(|()| Msg::Submit);
  let on_close =
    dispatcher.callback(|()| Msg::CloseModal);
  let on_dismiss =
    dispatcher.callback(Msg::AlertExpired);

  let state = session.borrow();

  html! {
      <div class="tasklog">
          <header class="toolbar">
              <h1>{ "Task Log" }</h1>
              <button class="primary" onclick={move |_| on_new.emit(())}>
                  { "New Task" }
              </button>
          </header>

          <AlertBanner alert={state.alert().cloned()} on_dismiss={on_dismiss} />

          <FilterBar
              filters={state.filters().clone()}
              task_types={state.task_types().to_vec()}
              contact_persons={state.contact_persons().to_vec()}
              on_change={on_filter}
              on_reset={on_reset_filters}
          />
          <ActiveFilters
              badges={state.filters().active_badges()}
              on_clear={on_clear_filter}
          />

          <TaskTable
              tasks={state.visible_tasks().to_vec()}
              zone={*state.zone()}
              loading={state.is_loading()}
              on_edit={on_edit}
              on_duplicate={on_duplicate}
              on_toggle={on_toggle}
              on_delete={on_delete}
          />

          {
              match state.editor() {
                  Some(editor) => html! {
                      <TaskModal
                          editor={editor.clone()}
                          task_types={state.task_types().to_vec()}
                          contact_persons={state.contact_persons().to_vec()}
                          on_field={on_form_field}
                          on_status={on_form_status}
                          on_submit={on_submit}
                          on_close={on_close}
                      />
                  },
                  None => html! {}
              }
          }
      </div>
  }
}
