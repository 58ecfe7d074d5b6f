//! CLI command handlers.

pub mod config;
pub mod get;
pub mod people;
pub mod projects;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use basecamp_client::{Client, Resource};
use console::Style;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, if given.
    pub config_path: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Log outgoing requests.
    pub debug: bool,
}

impl Context {
    /// Build a client from the config file and environment.
    pub fn client(&self) -> Result<Client> {
        let config = basecamp_config::load_config(self.config_path.as_deref())
            .context("failed to load configuration")?;
        let debug = self.debug || config.debug;

        let client = config
            .into_builder()
            .context("incomplete configuration")?
            .debug_mode(debug)
            .build()?;

        tracing::debug!(account_id = client.account_id(), "client ready");
        Ok(client)
    }
}

/// Print resources as a JSON array or as `[id] label` lines.
pub(crate) fn print_resources<'a>(
    ctx: &Context,
    resources: impl IntoIterator<Item = &'a Resource>,
    label: &str,
) -> Result<()> {
    let resources: Vec<&Resource> = resources.into_iter().collect();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    if resources.is_empty() {
        println!("{}", dim.apply_to("Nothing found"));
    }
    for resource in resources {
        let id = resource.id().unwrap_or_else(|_| "?".to_string());
        let text = resource
            .try_get(label)
            .and_then(|field| field.as_str())
            .unwrap_or("");
        println!("{} {}", dim.apply_to(format!("[{}]", id)), text);
    }
    Ok(())
}
