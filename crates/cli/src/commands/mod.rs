use anyhow::{Context, Result};
use asana_api::ApiClient;
use asana_cli_output::OutputRenderer;
use clap::{Args, Subcommand};

mod projects;
mod tags;
mod tasks;
mod users;
pub mod utils;
mod workspaces;

pub struct AsanaContext<'a> {
    pub client: ApiClient,
    pub renderer: &'a OutputRenderer,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AsanaCommand {
    /// User commands
    Users(users::UsersArgs),
    /// Task commands
    Tasks(tasks::TasksArgs),
    /// Project commands
    Projects(projects::ProjectsArgs),
    /// Tag commands
    Tags(tags::TagsArgs),
    /// Story commands
    Stories(StoriesArgs),
    /// Workspace commands
    Workspaces(workspaces::WorkspacesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StoriesArgs {
    #[command(subcommand)]
    command: StoryCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum StoryCommands {
    /// Fetch a single story
    Get {
        /// Story ID
        id: String,
    },
}

pub async fn execute(command: AsanaCommand, ctx: AsanaContext<'_>) -> Result<()> {
    match command {
        AsanaCommand::Users(args) => users::execute(args, &ctx).await,
        AsanaCommand::Tasks(args) => tasks::execute(args, &ctx).await,
        AsanaCommand::Projects(args) => projects::execute(args, &ctx).await,
        AsanaCommand::Tags(args) => tags::execute(args, &ctx).await,
        AsanaCommand::Workspaces(args) => workspaces::execute(args, &ctx).await,
        AsanaCommand::Stories(args) => match args.command {
            StoryCommands::Get { id } => {
                let story = ctx
                    .client
                    .get_story(&id)
                    .await
                    .with_context(|| format!("Failed to get story {id}"))?;
                ctx.renderer.render_response(&story)
            }
        },
    }
}
