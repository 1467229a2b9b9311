use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use super::AsanaContext;

#[derive(Args, Debug, Clone)]
pub struct WorkspacesArgs {
    #[command(subcommand)]
    command: WorkspaceCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum WorkspaceCommands {
    /// List workspaces
    List,

    /// Rename a workspace (defaults to the profile's workspace_id)
    Rename {
        /// New name
        name: String,
        /// Workspace ID
        #[arg(short = 'w', long)]
        workspace: Option<String>,
    },

    /// List tasks assigned to someone in a workspace
    Tasks {
        /// Workspace ID
        #[arg(short = 'w', long)]
        workspace: Option<String>,
        /// Assignee user ID or email (defaults to "me")
        #[arg(short = 'a', long)]
        assignee: Option<String>,
    },

    /// List tags of a workspace
    Tags {
        /// Workspace ID
        #[arg(short = 'w', long)]
        workspace: Option<String>,
    },

    /// List users of a workspace
    Users {
        /// Workspace ID
        #[arg(short = 'w', long)]
        workspace: Option<String>,
    },
}

pub async fn execute(args: WorkspacesArgs, ctx: &AsanaContext<'_>) -> Result<()> {
    let client = &ctx.client;

    let response = match args.command {
        WorkspaceCommands::List => client
            .get_workspaces()
            .await
            .context("Failed to list workspaces")?,
        WorkspaceCommands::Rename { name, workspace } => client
            .update_workspace(workspace.as_deref(), &json!({ "name": name }))
            .await
            .context("Failed to rename workspace")?,
        WorkspaceCommands::Tasks {
            workspace,
            assignee,
        } => client
            .get_workspace_tasks(workspace.as_deref(), assignee.as_deref())
            .await
            .context("Failed to list workspace tasks")?,
        WorkspaceCommands::Tags { workspace } => client
            .get_workspace_tags(workspace.as_deref())
            .await
            .context("Failed to list workspace tags")?,
        WorkspaceCommands::Users { workspace } => client
            .get_workspace_users(workspace.as_deref())
            .await
            .context("Failed to list workspace users")?,
    };

    ctx.renderer.render_response(&response)
}
