//! Config command - configuration management.

use anyhow::{Context as _, Result};
use basecamp_config::{AuthConfig, BasecampConfig};
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Print the effective configuration (secrets redacted)
    Show,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Path => {
            let path = ctx
                .config_path
                .clone()
                .or_else(basecamp_config::config_path)
                .context("could not determine the config directory")?;
            println!("{}", path.display());
        }
        ConfigCommand::Show => {
            let config = basecamp_config::load_config(ctx.config_path.as_deref())?;
            let config = redacted(config);
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                    "account-id": config.account_id,
                    "application-info": config.application_info,
                    "base-uri": config.base_uri,
                    "envelope": config.envelope,
                    "debug": config.debug,
                    "timeout": config.timeout,
                }))?);
            } else {
                print!("{}", config.to_toml()?);
            }
        }
    }
    Ok(())
}

const REDACTED: &str = "********";

fn redacted(mut config: BasecampConfig) -> BasecampConfig {
    config.auth = config.auth.map(|auth| match auth {
        AuthConfig::Bearer { token, token_env } => AuthConfig::Bearer {
            token: token.map(|_| REDACTED.to_string()),
            token_env,
        },
        AuthConfig::Oauth {
            expires_at,
            client_id,
            redirect_uri,
            token_url,
            ..
        } => AuthConfig::Oauth {
            access_token: REDACTED.to_string(),
            refresh_token: REDACTED.to_string(),
            expires_at,
            client_id,
            client_secret: REDACTED.to_string(),
            redirect_uri,
            token_url,
        },
    });
    config
}
