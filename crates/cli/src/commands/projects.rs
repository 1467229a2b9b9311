use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::utils::build_payload;
use super::AsanaContext;

#[derive(Args, Debug, Clone)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    command: ProjectCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum ProjectCommands {
    /// List projects, across all workspaces unless one is given
    List {
        /// Only projects in this workspace
        #[arg(short = 'w', long)]
        workspace: Option<String>,
        /// Only projects in the profile's workspace_id
        #[arg(long, conflicts_with = "workspace")]
        in_default_workspace: bool,
        /// Include archived projects
        #[arg(long)]
        archived: bool,
        /// Comma separated optional fields to include
        #[arg(long, conflicts_with_all = ["workspace", "in_default_workspace"])]
        opt_fields: Option<String>,
    },

    /// Fetch a project (defaults to the profile's project_id)
    Get {
        /// Project ID
        id: Option<String>,
    },

    /// Create a project
    Create {
        /// Project name
        #[arg(long)]
        name: Option<String>,
        /// Project notes
        #[arg(long)]
        notes: Option<String>,
        /// Workspace ID
        #[arg(long)]
        workspace: Option<String>,
        /// Raw JSON object with project fields
        #[arg(long)]
        data: Option<String>,
    },

    /// Update a project (defaults to the profile's project_id)
    Update {
        /// Project ID
        #[arg(long)]
        id: Option<String>,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// Raw JSON object with fields to update
        #[arg(long)]
        data: Option<String>,
    },

    /// List unarchived tasks of a project
    Tasks {
        /// Project ID
        id: Option<String>,
    },

    /// List stories of a project
    Stories {
        /// Project ID
        id: Option<String>,
    },

    /// Comment on a project
    Comment {
        /// Project ID
        #[arg(long)]
        id: Option<String>,
        /// Comment text
        #[arg(long)]
        text: String,
    },
}

pub async fn execute(args: ProjectsArgs, ctx: &AsanaContext<'_>) -> Result<()> {
    let client = &ctx.client;

    let response = match args.command {
        ProjectCommands::List {
            workspace,
            in_default_workspace,
            archived,
            opt_fields,
        } => {
            if workspace.is_some() || in_default_workspace {
                client
                    .get_projects_in_workspace(workspace.as_deref(), archived)
                    .await
                    .context("Failed to list workspace projects")?
            } else {
                client
                    .get_projects(archived, opt_fields.as_deref())
                    .await
                    .context("Failed to list projects")?
            }
        }
        ProjectCommands::Get { id } => client
            .get_project(id.as_deref())
            .await
            .context("Failed to get project")?,
        ProjectCommands::Create {
            name,
            notes,
            workspace,
            data,
        } => {
            let workspace = workspace.or_else(|| {
                client
                    .config()
                    .default_workspace()
                    .map(str::to_string)
            });
            let payload = build_payload(
                data.as_deref(),
                &[
                    ("workspace", workspace.as_deref()),
                    ("name", name.as_deref()),
                    ("notes", notes.as_deref()),
                ],
            )?;
            client
                .create_project(&payload)
                .await
                .context("Failed to create project")?
        }
        ProjectCommands::Update {
            id,
            name,
            notes,
            data,
        } => {
            let payload = build_payload(
                data.as_deref(),
                &[("name", name.as_deref()), ("notes", notes.as_deref())],
            )?;
            client
                .update_project(id.as_deref(), &payload)
                .await
                .context("Failed to update project")?
        }
        ProjectCommands::Tasks { id } => client
            .get_project_tasks(id.as_deref())
            .await
            .context("Failed to list project tasks")?,
        ProjectCommands::Stories { id } => client
            .get_project_stories(id.as_deref())
            .await
            .context("Failed to list project stories")?,
        ProjectCommands::Comment { id, text } => client
            .comment_on_project(id.as_deref(), &text)
            .await
            .context("Failed to comment on project")?,
    };

    ctx.renderer.render_response(&response)
}
