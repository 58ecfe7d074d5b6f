//! Projects command.

use anyhow::Result;
use basecamp_client::Project;
use clap::{Args, Subcommand};
use console::{Style, style};

use super::{Context, print_resources};

/// Arguments for the projects command.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects
    List {
        /// Maximum projects to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show archived or trashed projects instead of active ones
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a single project
    Show {
        /// Project ID
        id: u64,
    },
}

/// Run the projects command.
pub fn run(args: ProjectsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match args.command {
        ProjectsCommand::List { limit, status } => {
            let projects = match status.as_deref() {
                Some(status) => client.projects().list_by_status(status)?,
                None => client.projects().list()?,
            };

            let mut shown = Vec::new();
            for project in projects.iter().take(limit.unwrap_or(usize::MAX)) {
                shown.push(project?);
            }
            print_resources(ctx, &shown, "name")?;

            if !ctx.json_output
                && let Some(total) = projects.total_count()
                && total as usize > shown.len()
            {
                let dim = Style::new().dim();
                println!();
                println!("{}", dim.apply_to(format!("... {} total", total)));
            }
        }
        ProjectsCommand::Show { id } => {
            let project = client.projects().get(id)?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(project.resource())?);
            } else {
                print_project(&project)?;
            }
        }
    }

    Ok(())
}

fn print_project(project: &Project) -> Result<()> {
    let dim = Style::new().dim();
    println!("{}", style(project.name()?).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    if let Some(description) = project.description()?.filter(|d| !d.is_empty()) {
        println!("{}", description);
    }
    println!("{} {}", dim.apply_to("id:     "), project.id()?);
    if let Ok(status) = project.status() {
        println!("{} {}", dim.apply_to("status: "), status);
    }
    if let Ok(url) = project.app_url() {
        println!("{} {}", dim.apply_to("url:    "), url);
    }
    Ok(())
}
