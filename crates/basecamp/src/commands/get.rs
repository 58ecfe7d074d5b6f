//! Get command - raw GET against any API path.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Resource path without account prefix or `.json`, e.g. `/my/profile`
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

/// Run the get command.
pub fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let params: Vec<(&str, &str)> = args
        .params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let response = client.get(&args.path, &params)?;
    if ctx.verbose {
        eprintln!("HTTP {}", response.status);
    }

    match response.body.as_json() {
        Some(json) => println!("{}", serde_json::to_string_pretty(json)?),
        None => println!("{}", response.body),
    }
    Ok(())
}

fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
