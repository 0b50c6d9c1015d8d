use std::str::FromStr;

use tasklog_core::Zone;
use tasklog_core::clock::{
  Hour12,
  Meridiem,
  Minute
};
use tasklog_core::display::{
  format_date,
  format_date_time,
  note_or_dash,
  status_toggle_label
};
use tasklog_core::filter::{
  ActiveFilter,
  FilterField,
  SortKey,
  SortOrder,
  TaskFilters
};
use tasklog_core::form::FormField;
use tasklog_core::session::{
  Alert,
  AlertKind,
  Editor,
  EditorMode
};
use tasklog_core::task::{
  Task,
  TaskId,
  TaskStatus
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  Properties,
  SubmitEvent,
  TargetCast,
  classes,
  function_component,
  html
};

fn input_value(e: InputEvent) -> String {
  let input: HtmlInputElement =
    e.target_unchecked_into();
  input.value()
}

fn select_value(e: Event) -> String {
  let select: HtmlSelectElement =
    e.target_unchecked_into();
  select.value()
}

fn textarea_value(e: InputEvent) -> String {
  let area: HtmlTextAreaElement =
    e.target_unchecked_into();
  area.value()
}

/// `<option>`s for `choices`, with a
/// blank "any" entry first when
/// `placeholder` is given.
fn options<'a>(
  choices: impl IntoIterator<
    Item = (&'a str, &'a str)
  >,
  selected: &str,
  placeholder: Option<&str>
) -> Html {
  html! {
      <>
          {
              if let Some(text) = placeholder {
                  html! { <option value="" selected={selected.is_empty()}>{ text }</option> }
              } else {
                  html! {}
              }
          }
          {
              for choices.into_iter().map(|(value, label)| html! {
                  <option value={value.to_string()} selected={value == selected}>{ label }</option>
              })
          }
      </>
  }
}

#[derive(Properties, PartialEq)]
pub struct AlertBannerProps {
  pub alert:      Option<Alert>,
  pub on_dismiss: Callback<u64>
}

#[function_component(AlertBanner)]
pub fn alert_banner(
  props: &AlertBannerProps
) -> Html {
  let Some(alert) = props.alert.clone()
  else {
    return html! {};
  };
  let class = match alert.kind {
    | AlertKind::Success => "alert success",
    | AlertKind::Error => "alert error"
  };
  let on_dismiss = props.on_dismiss.clone();
  let id = alert.id;

  html! {
      <div class={class} role="alert">
          <span>{ alert.message }</span>
          <button class="close" onclick={move |_| on_dismiss.emit(id)}>{ "×" }</button>
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
  pub filters:         TaskFilters,
  pub task_types:      Vec<String>,
  pub contact_persons: Vec<String>,
  pub on_change:
    Callback<(FilterField, String)>,
  pub on_reset:        Callback<()>
}

#[function_component(FilterBar)]
pub fn filter_bar(
  props: &FilterBarProps
) -> Html {
  let typed = |field: FilterField| {
    let on_change = props.on_change.clone();
    Callback::from(move |e: InputEvent| {
      on_change.emit((field, input_value(e)))
    })
  };
  let picked = |field: FilterField| {
    let on_change = props.on_change.clone();
    Callback::from(move |e: Event| {
      on_change.emit((field, select_value(e)))
    })
  };
  let on_reset = props.on_reset.clone();
  let filters = &props.filters;
  let sort_by = filters.sort_by.as_str();
  let sort_order = filters
    .sort_order
    .map(|order| order.as_str())
    .unwrap_or_default();

  html! {
      <div class="panel filters">
          <input
              type="text"
              placeholder="Entity name"
              value={filters.entity_name.clone()}
              oninput={typed(FilterField::EntityName)}
          />
          <select onchange={picked(FilterField::TaskType)}>
              { options(
                  props.task_types.iter().map(|t| (t.as_str(), t.as_str())),
                  &filters.task_type,
                  Some("All types"),
              ) }
          </select>
          <select onchange={picked(FilterField::Status)}>
              { options(
                  TaskStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
                  &filters.status,
                  Some("All statuses"),
              ) }
          </select>
          <select onchange={picked(FilterField::ContactPerson)}>
              { options(
                  props.contact_persons.iter().map(|p| (p.as_str(), p.as_str())),
                  &filters.contact_person,
                  Some("All contacts"),
              ) }
          </select>
          <input
              type="date"
              value={filters.task_date.clone()}
              oninput={typed(FilterField::TaskDate)}
          />
          <input
              type="search"
              placeholder="Search"
              value={filters.search_term.clone()}
              oninput={typed(FilterField::SearchTerm)}
          />
          <select onchange={picked(FilterField::SortBy)}>
              { options(
                  SortKey::ALL.iter().map(|k| (k.as_str(), k.label())),
                  sort_by,
                  None,
              ) }
          </select>
          <select onchange={picked(FilterField::SortOrder)}>
              { options(
                  [SortOrder::Asc, SortOrder::Desc]
                      .iter()
                      .map(|o| (o.as_str(), o.as_str())),
                  sort_order,
                  Some("Default order"),
              ) }
          </select>
          <button onclick={move |_| on_reset.emit(())}>{ "Reset" }</button>
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct ActiveFiltersProps {
  pub badges:   Vec<ActiveFilter>,
  pub on_clear: Callback<FilterField>
}

#[function_component(ActiveFilters)]
pub fn active_filters(
  props: &ActiveFiltersProps
) -> Html {
  if props.badges.is_empty() {
    return html! {};
  }

  html! {
      <div class="chips">
          {
              for props.badges.iter().map(|badge| {
                  let field = badge.field;
                  let on_clear = props.on_clear.clone();
                  html! {
                      <span class="badge">
                          { format!("{}: {}", badge.label, badge.value) }
                          <button class="close" onclick={move |_| on_clear.emit(field)}>{ "×" }</button>
                      </span>
                  }
              })
          }
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskTableProps {
  pub tasks:        Vec<Task>,
  pub zone:         Zone,
  pub loading:      bool,
  pub on_edit:      Callback<TaskId>,
  pub on_duplicate: Callback<TaskId>,
  pub on_toggle:    Callback<TaskId>,
  pub on_delete:    Callback<TaskId>
}

#[function_component(TaskTable)]
pub fn task_table(
  props: &TaskTableProps
) -> Html {
  let body = if props.loading {
    html! { <tr><td colspan="8" class="muted">{ "Loading tasks..." }</td></tr> }
  } else if props.tasks.is_empty() {
    html! { <tr><td colspan="8" class="muted">{ "No tasks found" }</td></tr> }
  } else {
    props
      .tasks
      .iter()
      .map(|task| task_row(props, task))
      .collect::<Html>()
  };

  html! {
      <table class="panel tasks">
          <thead>
              <tr>
                  <th>{ "Created" }</th>
                  <th>{ "Entity" }</th>
                  <th>{ "Type" }</th>
                  <th>{ "Task Time" }</th>
                  <th>{ "Contact" }</th>
                  <th>{ "Note" }</th>
                  <th>{ "Status" }</th>
                  <th></th>
              </tr>
          </thead>
          <tbody>{ body }</tbody>
      </table>
  }
}

fn task_row(
  props: &TaskTableProps,
  task: &Task
) -> Html {
  let id = task.id;
  let on_edit = props.on_edit.clone();
  let on_duplicate =
    props.on_duplicate.clone();
  let on_toggle = props.on_toggle.clone();
  let on_delete = props.on_delete.clone();
  let status_class = match task.status {
    | TaskStatus::Open => "dot open",
    | TaskStatus::Closed => "dot closed"
  };

  html! {
      <tr key={id.to_string()} class={classes!("row", task.status.as_str())}>
          <td>{ format_date(task.date_created, &props.zone) }</td>
          <td>{ &task.entity_name }</td>
          <td>{ &task.task_type }</td>
          <td>{ format_date_time(task.task_time, &props.zone) }</td>
          <td>{ &task.contact_person }</td>
          <td>{ note_or_dash(task.note.as_deref()) }</td>
          <td><span class={status_class}></span>{ task.status.label() }</td>
          <td class="actions">
              <button onclick={move |_| on_edit.emit(id)}>{ "Edit" }</button>
              <button onclick={move |_| on_duplicate.emit(id)}>{ "Duplicate" }</button>
              <button onclick={move |_| on_toggle.emit(id)}>{ status_toggle_label(task.status) }</button>
              <button class="danger" onclick={move |_| on_delete.emit(id)}>{ "Delete" }</button>
          </td>
      </tr>
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskModalProps {
  pub editor:          Editor,
  pub task_types:      Vec<String>,
  pub contact_persons: Vec<String>,
  pub on_field:
    Callback<(FormField, String)>,
  pub on_status:       Callback<TaskStatus>,
  pub on_submit:       Callback<()>,
  pub on_close:        Callback<()>
}

#[function_component(TaskModal)]
pub fn task_modal(
  props: &TaskModalProps
) -> Html {
  let form = &props.editor.form;
  let typed = |field: FormField| {
    let on_field = props.on_field.clone();
    Callback::from(move |e: InputEvent| {
      on_field.emit((field, input_value(e)))
    })
  };
  let picked = |field: FormField| {
    let on_field = props.on_field.clone();
    Callback::from(move |e: Event| {
      on_field.emit((field, select_value(e)))
    })
  };
  let on_note = {
    let on_field = props.on_field.clone();
    Callback::from(move |e: InputEvent| {
      on_field.emit((
        FormField::Note,
        textarea_value(e)
      ))
    })
  };
  let on_status = {
    let on_status = props.on_status.clone();
    Callback::from(move |e: Event| {
      match TaskStatus::from_str(
        &select_value(e)
      ) {
        | Ok(status) => on_status.emit(status),
        | Err(err) => {
          tracing::warn!(error = %err, "ignoring status selection")
        }
      }
    })
  };
  let on_submit = {
    let on_submit = props.on_submit.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      on_submit.emit(());
    })
  };
  let on_close = props.on_close.clone();

  let title = match props.editor.mode {
    | EditorMode::Create => {
      "New Task".to_string()
    }
    | EditorMode::Edit(id) => {
      format!("Edit Task #{id}")
    }
  };
  let hours: Vec<String> = Hour12::ALL
    .iter()
    .map(ToString::to_string)
    .collect();
  let minutes: Vec<String> = Minute::ALL
    .iter()
    .map(ToString::to_string)
    .collect();

  html! {
      <div class="modal-backdrop">
          <form class="modal" onsubmit={on_submit}>
              <div class="header">{ title }</div>

              <label>{ "Entity name" }
                  <input
                      type="text"
                      value={form.entity_name.clone()}
                      oninput={typed(FormField::EntityName)}
                  />
              </label>

              <label>{ "Task type" }
                  <input
                      type="text"
                      list="task-type-options"
                      value={form.task_type.clone()}
                      oninput={typed(FormField::TaskType)}
                  />
                  <datalist id="task-type-options">
                      { for props.task_types.iter().map(|t| html! { <option value={t.clone()} /> }) }
                  </datalist>
              </label>

              <label>{ "Date" }
                  <input
                      type="date"
                      value={form.task_date.clone()}
                      oninput={typed(FormField::TaskDate)}
                  />
              </label>

              <div class="time-pickers">
                  <select onchange={picked(FormField::Hour)}>
                      { options(hours.iter().map(|h| (h.as_str(), h.as_str())), &form.hour, None) }
                  </select>
                  <select onchange={picked(FormField::Minute)}>
                      { options(minutes.iter().map(|m| (m.as_str(), m.as_str())), &form.minute, None) }
                  </select>
                  <select onchange={picked(FormField::Meridiem)}>
                      { options(
                          Meridiem::ALL.iter().map(|m| (m.as_str(), m.as_str())),
                          &form.meridiem,
                          None,
                      ) }
                  </select>
              </div>

              <label>{ "Contact person" }
                  <input
                      type="text"
                      list="contact-person-options"
                      value={form.contact_person.clone()}
                      oninput={typed(FormField::ContactPerson)}
                  />
                  <datalist id="contact-person-options">
                      { for props.contact_persons.iter().map(|p| html! { <option value={p.clone()} /> }) }
                  </datalist>
              </label>

              <label>{ "Note" }
                  <textarea value={form.note.clone()} oninput={on_note} />
              </label>

              <label>{ "Status" }
                  <select onchange={on_status}>
                      { options(
                          TaskStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
                          form.status.as_str(),
                          None,
                      ) }
                  </select>
              </label>

              <div class="footer">
                  <button type="button" onclick={move |_| on_close.emit(())}>{ "Cancel" }</button>
                  <button type="submit" class="primary" disabled={props.editor.busy()}>
                      { if props.editor.busy() { "Saving..." } else { "Save" } }
                  </button>
              </div>
          </form>
      </div>
  }
}
