use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::utils::build_payload;
use super::AsanaContext;

#[derive(Args, Debug, Clone)]
pub struct TagsArgs {
    #[command(subcommand)]
    command: TagCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum TagCommands {
    /// List tags in all workspaces
    List,
    /// Fetch a single tag
    Get {
        /// Tag ID
        id: String,
    },
    /// Update a tag
    Update {
        /// Tag ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New color (e.g. dark-green)
        #[arg(long)]
        color: Option<String>,
        /// Raw JSON object with fields to update
        #[arg(long)]
        data: Option<String>,
    },
    /// List tasks carrying a tag
    Tasks {
        /// Tag ID
        id: String,
    },
}

pub async fn execute(args: TagsArgs, ctx: &AsanaContext<'_>) -> Result<()> {
    let response = match args.command {
        TagCommands::List => ctx.client.get_tags().await.context("Failed to list tags")?,
        TagCommands::Get { id } => ctx
            .client
            .get_tag(&id)
            .await
            .with_context(|| format!("Failed to get tag {id}"))?,
        TagCommands::Update {
            id,
            name,
            color,
            data,
        } => {
            let payload = build_payload(
                data.as_deref(),
                &[("name", name.as_deref()), ("color", color.as_deref())],
            )?;
            ctx.client
                .update_tag(&id, &payload)
                .await
                .with_context(|| format!("Failed to update tag {id}"))?
        }
        TagCommands::Tasks { id } => ctx
            .client
            .get_tasks_with_tag(&id)
            .await
            .with_context(|| format!("Failed to list tasks for tag {id}"))?,
    };

    ctx.renderer.render_response(&response)
}
