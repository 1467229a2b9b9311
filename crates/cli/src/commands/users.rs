use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::AsanaContext;

#[derive(Args, Debug, Clone)]
pub struct UsersArgs {
    #[command(subcommand)]
    command: UserCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum UserCommands {
    /// Show a user (the API key owner when no ID is given)
    Get {
        /// User ID or email
        id: Option<String>,
    },
    /// List users in all workspaces you can access
    List,
}

pub async fn execute(args: UsersArgs, ctx: &AsanaContext<'_>) -> Result<()> {
    let response = match args.command {
        UserCommands::Get { id } => ctx
            .client
            .get_user_info(id.as_deref())
            .await
            .context("Failed to get user")?,
        UserCommands::List => ctx.client.get_users().await.context("Failed to list users")?,
    };

    ctx.renderer.render_response(&response)
}
