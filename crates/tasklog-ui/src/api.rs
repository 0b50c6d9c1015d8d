use gloo::net::http::{
  Method as HttpMethod,
  RequestBuilder
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tasklog_core::api::{
  ApiError,
  Endpoint,
  Method,
  TaskApi
};
use tasklog_core::task::{
  StatusPatch,
  Task,
  TaskId,
  TaskPayload,
  TaskStatus
};

const JSON: &str = "application/json";

/// [`TaskApi`] over the browser's
/// `fetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserTaskApi {
  base_url: String
}

impl BrowserTaskApi {
  pub fn new(base_url: &str) -> Self {
    Self {
      base_url: base_url.to_string()
    }
  }

  async fn send(
    &self,
    endpoint: Endpoint,
    query: &[(String, String)],
    body: Option<String>
  ) -> Result<String, ApiError> {
    let builder = RequestBuilder::new(
      &endpoint.url(&self.base_url)
    )
    .method(http_method(endpoint.method))
    .header("Accept", JSON)
    .query(query.iter().map(|(k, v)| {
      (k.as_str(), v.as_str())
    }));

    let request = match body {
      | Some(body) => builder
        .header("Content-Type", JSON)
        .body(body),
      | None => builder.build()
    }
    .map_err(|err| {
      ApiError::Encode(err.to_string())
    })?;

    let response =
      request.send().await.map_err(
        |err| {
          tracing::warn!(
            endpoint = %endpoint,
            error = %err,
            "task API request failed"
          );
          ApiError::Transport(
            err.to_string()
          )
        }
      )?;
    let status = response.status();
    let text =
      response.text().await.map_err(
        |err| {
          ApiError::Transport(
            err.to_string()
          )
        }
      )?;

    if response.ok() {
      tracing::debug!(
        endpoint = %endpoint,
        status,
        "task API responded"
      );
      Ok(text)
    } else {
      Err(ApiError::from_response(
        status, &text
      ))
    }
  }

  async fn get<T: DeserializeOwned>(
    &self,
    endpoint: Endpoint,
    query: &[(String, String)]
  ) -> Result<T, ApiError> {
    let text =
      self.send(endpoint, query, None).await?;
    serde_json::from_str(&text)
      .map_err(ApiError::decode)
  }

  async fn send_json<B, T>(
    &self,
    endpoint: Endpoint,
    body: &B
  ) -> Result<T, ApiError>
  where
    B: Serialize,
    T: DeserializeOwned
  {
    let body = serde_json::to_string(body)
      .map_err(|err| {
        ApiError::Encode(err.to_string())
      })?;
    let text = self
      .send(endpoint, &[], Some(body))
      .await?;
    serde_json::from_str(&text)
      .map_err(ApiError::decode)
  }
}

fn http_method(
  method: Method
) -> HttpMethod {
  match method {
    | Method::Get => HttpMethod::GET,
    | Method::Post => HttpMethod::POST,
    | Method::Put => HttpMethod::PUT,
    | Method::Patch => HttpMethod::PATCH,
    | Method::Delete => HttpMethod::DELETE
  }
}

impl TaskApi for BrowserTaskApi {
  async fn list_tasks(
    &self,
    query: &[(String, String)]
  ) -> Result<Vec<Task>, ApiError> {
    self
      .get(Endpoint::list_tasks(), query)
      .await
  }

  async fn create_task(
    &self,
    payload: &TaskPayload
  ) -> Result<Task, ApiError> {
    self
      .send_json(
        Endpoint::create_task(),
        payload
      )
      .await
  }

  async fn update_task(
    &self,
    id: TaskId,
    payload: &TaskPayload
  ) -> Result<Task, ApiError> {
    self
      .send_json(
        Endpoint::update_task(id),
        payload
      )
      .await
  }

  async fn update_task_status(
    &self,
    id: TaskId,
    status: TaskStatus
  ) -> Result<Task, ApiError> {
    self
      .send_json(
        Endpoint::update_task_status(id),
        &StatusPatch { status }
      )
      .await
  }

  async fn delete_task(
    &self,
    id: TaskId
  ) -> Result<(), ApiError> {
    self
      .send(
        Endpoint::delete_task(id),
        &[],
        None
      )
      .await
      .map(|_| ())
  }

  async fn task_types(
    &self
  ) -> Result<Vec<String>, ApiError> {
    self
      .get(Endpoint::task_types(), &[])
      .await
  }

  async fn contact_persons(
    &self
  ) -> Result<Vec<String>, ApiError> {
    self
      .get(Endpoint::contact_persons(), &[])
      .await
  }
}
