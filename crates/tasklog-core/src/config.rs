use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::api::DEFAULT_API_URL;
use crate::datetime::Zone;

pub const RC_ENV_VAR: &str = "TASKLOGRC";
pub const TIMEZONE_ENV_VAR: &str =
  "TASKLOG_TIMEZONE";
const RC_FILE_NAME: &str = ".tasklogrc";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Flat `key = value` settings read from
/// an rc file plus command-line
/// overrides.
#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  /// Built-in defaults only.
  pub fn defaults() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "api.url".to_string(),
      DEFAULT_API_URL.to_string()
    );
    map.insert(
      "api.timeout".to_string(),
      DEFAULT_TIMEOUT_SECS.to_string()
    );
    map.insert(
      "timezone".to_string(),
      "local".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    Config {
      map,
      loaded_files: vec![]
    }
  }

  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::defaults();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading tasklogrc");
      cfg.load_file(&path, &mut vec![])?;
    } else {
      warn!(
        "no tasklogrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// `chain` holds the canonical paths of
  /// the files currently being read, outermost
  /// first.
  #[tracing::instrument(skip(self, chain))]
  fn load_file(
    &mut self,
    path: &Path,
    chain: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let canonical = fs::canonicalize(&path)
      .with_context(|| {
        format!(
          "failed to resolve {}",
          path.display()
        )
      })?;
    if chain.contains(&canonical) {
      return Err(anyhow!(
        "include cycle at {}",
        path.display()
      ));
    }
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }
      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
          file = %path.display(),
          include = %include_path.display(),
          line = line_num + 1,
          "processing include"
        );

        if include_path.exists() {
          chain.push(canonical.clone());
          let loaded = self
            .load_file(&include_path, chain);
          chain.pop();
          loaded?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Typed view of the settings the
/// front ends need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub api_url: String,
  pub timeout: Duration,
  pub zone:    Zone,
  pub color:   bool
}

impl Settings {
  /// `$TASKLOG_TIMEZONE` wins over the
  /// `timezone` key.
  pub fn from_config(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    let timezone =
      std::env::var(TIMEZONE_ENV_VAR)
        .ok()
        .filter(|raw| {
          !raw.trim().is_empty()
        });
    Self::resolve(cfg, timezone)
  }

  fn resolve(
    cfg: &Config,
    timezone_override: Option<String>
  ) -> anyhow::Result<Self> {
    let api_url = cfg
      .get("api.url")
      .map(|url| url.trim().to_string())
      .filter(|url| !url.is_empty())
      .unwrap_or_else(|| {
        DEFAULT_API_URL.to_string()
      });

    let timeout_raw = cfg
      .get("api.timeout")
      .unwrap_or_else(|| {
        DEFAULT_TIMEOUT_SECS.to_string()
      });
    let timeout_secs = timeout_raw
      .trim()
      .parse::<u64>()
      .with_context(|| {
        format!(
          "invalid api.timeout: \
           {timeout_raw}"
        )
      })?;

    let zone_raw = timezone_override
      .or_else(|| cfg.get("timezone"))
      .unwrap_or_default();
    let zone = zone_raw
      .parse::<Zone>()
      .with_context(|| {
        format!(
          "invalid timezone setting: \
           {zone_raw}"
        )
      })?;

    let color = match cfg
      .get("color")
      .unwrap_or_else(|| "on".to_string())
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "on" | "yes" | "true" | "1" => {
        true
      }
      | "off" | "no" | "false" | "0" => {
        false
      }
      | other => {
        return Err(anyhow!(
          "invalid color setting: {other}"
        ));
      }
    };

    debug!(
      api_url = %api_url,
      timeout_secs,
      zone = %zone,
      color,
      "resolved settings"
    );
    Ok(Self {
      api_url,
      timeout: Duration::from_secs(
        timeout_secs
      ),
      zone,
      color
    })
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory"
    );
    return Ok(None);
  };
  let candidate = home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
