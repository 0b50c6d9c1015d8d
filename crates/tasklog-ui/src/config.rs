use serde::Deserialize;
use tasklog_core::Zone;
use tasklog_core::api::DEFAULT_API_URL;

const EMBEDDED: &str =
  include_str!("../tasklog-ui.toml");

#[derive(Debug, Default, Deserialize)]
struct UiConfigFile {
  api_url:  Option<String>,
  timezone: Option<String>
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
  pub api_url: String,
  pub zone:    Zone
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      zone:    Zone::Local
    }
  }
}

/// Settings compiled into the bundle.
/// A broken file falls back to the
/// defaults.
pub fn load() -> UiConfig {
  match parse(EMBEDDED) {
    | Ok(config) => {
      tracing::debug!(
        api_url = %config.api_url,
        zone = %config.zone,
        "loaded frontend config"
      );
      config
    }
    | Err(err) => {
      tracing::error!(
        error = %err,
        "invalid tasklog-ui.toml; using \
         defaults"
      );
      UiConfig::default()
    }
  }
}

fn parse(
  text: &str
) -> Result<UiConfig, String> {
  let file: UiConfigFile =
    toml::from_str(text)
      .map_err(|err| err.to_string())?;

  let api_url = file
    .api_url
    .map(|url| url.trim().to_string())
    .filter(|url| !url.is_empty())
    .unwrap_or_else(|| {
      DEFAULT_API_URL.to_string()
    });
  let zone = file
    .timezone
    .as_deref()
    .unwrap_or_default()
    .parse::<Zone>()
    .map_err(|err| err.to_string())?;

  Ok(UiConfig { api_url, zone })
}
