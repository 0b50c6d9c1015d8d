pub mod cli;
mod commands;
pub mod http;
mod prompt;
mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tasklog_core::config::{
  Config,
  Settings
};
use tracing::{
  debug,
  info
};

pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tasklog CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = Config::load(
    cli.tasklogrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if let Some(url) = cli.api_url {
    cfg.apply_overrides([(
      "api.url".to_string(),
      url
    )]);
  }

  let settings =
    Settings::from_config(&cfg).context(
      "failed to resolve tasklog \
       settings"
    )?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;
  runtime.block_on(commands::execute(
    cli.command,
    &settings
  ))
}
