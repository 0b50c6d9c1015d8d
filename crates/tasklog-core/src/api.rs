use std::fmt;

use serde::Deserialize;

use crate::task::{
  Task,
  TaskId,
  TaskPayload,
  TaskStatus
};

pub const DEFAULT_API_URL: &str =
  "http://localhost:5000/api";

#[derive(
  Debug, Clone, PartialEq, Eq, thiserror::Error,
)]
pub enum ApiError {
  /// The request never produced a
  /// response.
  #[error("{0}")]
  Transport(String),
  #[error("{message} (HTTP {status})")]
  Status { status: u16, message: String },
  #[error("invalid response: {0}")]
  Decode(String),
  #[error("invalid request: {0}")]
  Encode(String)
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String
}

impl ApiError {
  /// Builds the error for a non-success
  /// response, preferring the server's
  /// `{"error": "..."}` message.
  pub fn from_response(
    status: u16,
    body: &str
  ) -> Self {
    let message =
      match serde_json::from_str::<
        ErrorBody,
      >(body)
      {
        | Ok(parsed) => parsed.error,
        | Err(_) if !body.trim().is_empty()
          && body.len() <= 200 =>
        {
          body.trim().to_string()
        }
        | Err(_) => {
          "request failed".to_string()
        }
      };
    ApiError::Status { status, message }
  }

  pub fn decode(
    err: impl fmt::Display
  ) -> Self {
    ApiError::Decode(err.to_string())
  }
}

/// The remote task API.
///
/// Futures are not required to be
/// `Send`: the browser client runs them
/// on the page's event loop.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
  async fn list_tasks(
    &self,
    query: &[(String, String)]
  ) -> Result<Vec<Task>, ApiError>;

  async fn create_task(
    &self,
    payload: &TaskPayload
  ) -> Result<Task, ApiError>;

  async fn update_task(
    &self,
    id: TaskId,
    payload: &TaskPayload
  ) -> Result<Task, ApiError>;

  async fn update_task_status(
    &self,
    id: TaskId,
    status: TaskStatus
  ) -> Result<Task, ApiError>;

  async fn delete_task(
    &self,
    id: TaskId
  ) -> Result<(), ApiError>;

  async fn task_types(
    &self
  ) -> Result<Vec<String>, ApiError>;

  async fn contact_persons(
    &self
  ) -> Result<Vec<String>, ApiError>;
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Method {
  Get,
  Post,
  Put,
  Patch,
  Delete
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      | Method::Get => "GET",
      | Method::Post => "POST",
      | Method::Put => "PUT",
      | Method::Patch => "PATCH",
      | Method::Delete => "DELETE"
    }
  }
}

/// Method and path of one collaborator
/// call, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  pub method: Method,
  pub path:   String
}

impl Endpoint {
  fn new(
    method: Method,
    path: impl Into<String>
  ) -> Self {
    Self {
      method,
      path: path.into()
    }
  }

  pub fn list_tasks() -> Self {
    Self::new(Method::Get, "/tasks")
  }

  pub fn create_task() -> Self {
    Self::new(Method::Post, "/tasks")
  }

  pub fn update_task(id: TaskId) -> Self {
    Self::new(
      Method::Put,
      format!("/tasks/{id}")
    )
  }

  pub fn update_task_status(
    id: TaskId
  ) -> Self {
    Self::new(
      Method::Patch,
      format!("/tasks/{id}/status")
    )
  }

  pub fn delete_task(id: TaskId) -> Self {
    Self::new(
      Method::Delete,
      format!("/tasks/{id}")
    )
  }

  pub fn task_types() -> Self {
    Self::new(Method::Get, "/task-types")
  }

  pub fn contact_persons() -> Self {
    Self::new(
      Method::Get,
      "/contact-persons"
    )
  }

  pub fn url(&self, base: &str) -> String {
    format!(
      "{}{}",
      base.trim().trim_end_matches('/'),
      self.path
    )
  }
}

impl fmt::Display for Endpoint {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{} {}",
      self.method.as_str(),
      self.path
    )
  }
}
