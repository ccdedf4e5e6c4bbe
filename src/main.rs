pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod enums;
pub mod layout;
pub mod privilege;
pub mod providers;
pub mod runner;
pub mod screens;
pub mod tui;
pub mod utils;
pub mod widgets;

use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use color_eyre::eyre::Result;

use crate::{
  app::App,
  config::Config,
  providers::SystemProviders,
  runner::SystemRunner,
  utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
  initialize_logging()?;

  initialize_panic_handler()?;

  let args = Cli::parse();

  // Non-fatal: privileged tools retry through sudo and report what still fails
  let is_root = privilege::has_root_privileges();
  if !is_root {
    eprintln!("{}", privilege::get_privilege_warning());
    eprintln!();
  }

  let config = Config::new(args.config)?;
  let escalate = config.dashboard.escalate_privileges && !is_root;
  log::info!("Starting {} (privilege retry: {escalate})", utils::version_line());

  let runner = Arc::new(SystemRunner::new(escalate));
  let providers = Arc::new(SystemProviders::new(runner, config.dashboard.clone()));
  let mut app = App::new(config, providers);
  app.run().await?;

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
