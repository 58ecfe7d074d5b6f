//! People command.

use anyhow::Result;
use basecamp_client::Person;
use clap::{Args, Subcommand};
use console::{Style, style};

use super::{Context, print_resources};

/// Arguments for the people command.
#[derive(Args, Debug)]
pub struct PeopleArgs {
    #[command(subcommand)]
    pub command: PeopleCommand,
}

#[derive(Subcommand, Debug)]
pub enum PeopleCommand {
    /// List people
    List {
        /// Only people on this project
        #[arg(long)]
        project: Option<u64>,
    },

    /// Show the person the credentials belong to
    Me,
}

/// Run the people command.
pub fn run(args: PeopleArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match args.command {
        PeopleCommand::List { project } => {
            let people = match project {
                Some(id) => client.people().list_on_project(id)?,
                None => client.people().list()?,
            };
            let people = people.iter().collect::<basecamp_client::Result<Vec<_>>>()?;
            print_resources(ctx, &people, "name")?;
        }
        PeopleCommand::Me => {
            let me = client.people().me()?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(me.resource())?);
            } else {
                print_person(&me)?;
            }
        }
    }

    Ok(())
}

fn print_person(person: &Person) -> Result<()> {
    let dim = Style::new().dim();
    println!("{}", style(person.name()?).bold());
    println!("{} {}", dim.apply_to("id:    "), person.id()?);
    if let Ok(email) = person.email_address() {
        println!("{} {}", dim.apply_to("email: "), email);
    }
    if let Some(title) = person.title().ok().flatten() {
        println!("{} {}", dim.apply_to("title: "), title);
    }
    Ok(())
}
