use anyhow::Context;
use reqwest::header::{
  ACCEPT,
  CONTENT_TYPE
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tasklog_core::api::{
  ApiError,
  Endpoint,
  Method,
  TaskApi
};
use tasklog_core::config::Settings;
use tasklog_core::task::{
  StatusPatch,
  Task,
  TaskId,
  TaskPayload,
  TaskStatus
};
use tracing::{
  debug,
  warn
};

const JSON: &str = "application/json";

/// [`TaskApi`] over HTTP/JSON.
pub struct HttpTaskApi {
  client:   reqwest::Client,
  base_url: String
}

impl HttpTaskApi {
  pub fn new(
    settings: &Settings
  ) -> anyhow::Result<Self> {
    let client =
      reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .context(
          "failed building HTTP client \
           for the task API"
        )?;
    Ok(Self {
      client,
      base_url: settings.api_url.clone()
    })
  }

  fn request_url(
    &self,
    endpoint: &Endpoint,
    query: &[(String, String)]
  ) -> Result<reqwest::Url, ApiError> {
    let raw = endpoint.url(&self.base_url);
    let mut url = reqwest::Url::parse(&raw)
      .map_err(|err| {
        ApiError::Encode(format!(
          "bad API URL {raw}: {err}"
        ))
      })?;
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(
        query.iter().map(|(k, v)| {
          (k.as_str(), v.as_str())
        })
      );
    }
    Ok(url)
  }

  #[tracing::instrument(
    skip(self, query, body),
    fields(endpoint = %endpoint)
  )]
  async fn send(
    &self,
    endpoint: Endpoint,
    query: &[(String, String)],
    body: Option<Vec<u8>>
  ) -> Result<String, ApiError> {
    let url =
      self.request_url(&endpoint, query)?;
    let mut request = self
      .client
      .request(
        http_method(endpoint.method),
        url
      )
      .header(ACCEPT, JSON);
    if let Some(body) = body {
      request = request
        .header(CONTENT_TYPE, JSON)
        .body(body);
    }

    let response =
      match request.send().await {
        | Ok(response) => response,
        | Err(error) => {
          warn!(
            error = %error,
            "task API request failed"
          );
          return Err(
            ApiError::Transport(
              error.to_string()
            )
          );
        }
      };

    let status = response.status();
    let text =
      response.text().await.map_err(
        |error| {
          ApiError::Transport(
            error.to_string()
          )
        }
      )?;

    if status.is_success() {
      debug!(
        status = status.as_u16(),
        bytes = text.len(),
        "task API responded"
      );
      Ok(text)
    } else {
      warn!(
        status = status.as_u16(),
        "task API returned an error"
      );
      Err(ApiError::from_response(
        status.as_u16(),
        &text
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
    decode(&text)
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
    let text = self
      .send(endpoint, &[], Some(encode(body)?))
      .await?;
    decode(&text)
  }
}

fn http_method(
  method: Method
) -> reqwest::Method {
  match method {
    | Method::Get => reqwest::Method::GET,
    | Method::Post => reqwest::Method::POST,
    | Method::Put => reqwest::Method::PUT,
    | Method::Patch => {
      reqwest::Method::PATCH
    }
    | Method::Delete => {
      reqwest::Method::DELETE
    }
  }
}

fn encode<T: Serialize>(
  value: &T
) -> Result<Vec<u8>, ApiError> {
  serde_json::to_vec(value).map_err(
    |err| ApiError::Encode(err.to_string())
  )
}

fn decode<T: DeserializeOwned>(
  text: &str
) -> Result<T, ApiError> {
  serde_json::from_str(text)
    .map_err(ApiError::decode)
}

impl TaskApi for HttpTaskApi {
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
