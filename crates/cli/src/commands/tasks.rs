use std::path::PathBuf;

use anyhow::{Context, Result};
use asana_api::TaskFilter;
use clap::{Args, Subcommand};

use super::utils::build_payload;
use super::AsanaContext;

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    #[command(subcommand)]
    command: TaskCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum TaskCommands {
    /// List tasks by assignee, project or workspace
    List {
        /// Assignee user ID, email or "me" (needs a workspace)
        #[arg(short = 'a', long)]
        assignee: Option<String>,
        /// Project ID
        #[arg(short = 'p', long)]
        project: Option<String>,
        /// Workspace ID
        #[arg(short = 'w', long)]
        workspace: Option<String>,
    },

    /// Fetch a single task
    Get {
        /// Task ID
        id: String,
    },

    /// Create a task (workspace defaults to the profile's workspace_id)
    Create {
        /// Task name
        #[arg(long)]
        name: Option<String>,
        /// Task notes
        #[arg(long)]
        notes: Option<String>,
        /// Assignee user ID or email
        #[arg(long)]
        assignee: Option<String>,
        /// Workspace ID
        #[arg(long)]
        workspace: Option<String>,
        /// Raw JSON object with task fields
        #[arg(long)]
        data: Option<String>,
    },

    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// New assignee
        #[arg(long)]
        assignee: Option<String>,
        /// Raw JSON object with fields to update
        #[arg(long)]
        data: Option<String>,
    },

    /// List subtasks of a task
    Subtasks {
        /// Task ID
        id: String,
    },

    /// List stories (comments and activity) of a task
    Stories {
        /// Task ID
        id: String,
    },

    /// Comment on a task
    Comment {
        /// Task ID
        id: String,
        /// Comment text
        #[arg(long)]
        text: String,
    },

    /// Upload a file as task attachment
    Attach {
        /// Task ID
        id: String,
        /// Path to the file
        file: PathBuf,
    },

    /// List projects a task belongs to
    Projects {
        /// Task ID
        id: String,
    },

    /// Add a task to a project (defaults to the profile's project_id)
    AddProject {
        /// Task ID
        id: String,
        /// Project ID
        #[arg(long)]
        project: Option<String>,
    },

    /// Remove a task from a project (defaults to the profile's project_id)
    RemoveProject {
        /// Task ID
        id: String,
        /// Project ID
        #[arg(long)]
        project: Option<String>,
    },

    /// Tag a task
    AddTag {
        /// Task ID
        id: String,
        /// Tag ID
        #[arg(long)]
        tag: String,
    },

    /// Remove a tag from a task
    RemoveTag {
        /// Task ID
        id: String,
        /// Tag ID
        #[arg(long)]
        tag: String,
    },
}

pub async fn execute(args: TasksArgs, ctx: &AsanaContext<'_>) -> Result<()> {
    let client = &ctx.client;

    let response = match args.command {
        TaskCommands::List {
            assignee,
            project,
            workspace,
        } => {
            let filter = TaskFilter {
                assignee: assignee.unwrap_or_default(),
                project: project.unwrap_or_default(),
                workspace: workspace.unwrap_or_default(),
            };
            client
                .get_tasks_by_filter(&filter)
                .await
                .context("Failed to list tasks")?
        }
        TaskCommands::Get { id } => client
            .get_task(&id)
            .await
            .with_context(|| format!("Failed to get task {id}"))?,
        TaskCommands::Create {
            name,
            notes,
            assignee,
            workspace,
            data,
        } => {
            let payload = build_payload(
                data.as_deref(),
                &[
                    ("workspace", workspace.as_deref()),
                    ("name", name.as_deref()),
                    ("notes", notes.as_deref()),
                    ("assignee", assignee.as_deref()),
                ],
            )?;
            let task = client
                .create_task(&payload)
                .await
                .context("Failed to create task")?;
            tracing::info!(gid = %task["data"]["gid"], "Task created");
            task
        }
        TaskCommands::Update {
            id,
            name,
            notes,
            assignee,
            data,
        } => {
            let payload = build_payload(
                data.as_deref(),
                &[
                    ("name", name.as_deref()),
                    ("notes", notes.as_deref()),
                    ("assignee", assignee.as_deref()),
                ],
            )?;
            client
                .update_task(&id, &payload)
                .await
                .with_context(|| format!("Failed to update task {id}"))?
        }
        TaskCommands::Subtasks { id } => client
            .get_sub_tasks(&id)
            .await
            .with_context(|| format!("Failed to list subtasks of {id}"))?,
        TaskCommands::Stories { id } => client
            .get_task_stories(&id)
            .await
            .with_context(|| format!("Failed to list stories of task {id}"))?,
        TaskCommands::Comment { id, text } => client
            .comment_on_task(&id, &text)
            .await
            .with_context(|| format!("Failed to comment on task {id}"))?,
        TaskCommands::Attach { id, file } => {
            let attachment = client
                .add_task_attachment(&id, &file)
                .await
                .with_context(|| format!("Failed to attach {} to task {id}", file.display()))?;
            tracing::info!(task = %id, file = %file.display(), "Attachment uploaded");
            attachment
        }
        TaskCommands::Projects { id } => client
            .get_projects_for_task(&id)
            .await
            .with_context(|| format!("Failed to list projects of task {id}"))?,
        TaskCommands::AddProject { id, project } => client
            .add_project_to_task(&id, project.as_deref())
            .await
            .with_context(|| format!("Failed to add task {id} to project"))?,
        TaskCommands::RemoveProject { id, project } => client
            .remove_project_from_task(&id, project.as_deref())
            .await
            .with_context(|| format!("Failed to remove task {id} from project"))?,
        TaskCommands::AddTag { id, tag } => client
            .add_tag_to_task(&id, &tag)
            .await
            .with_context(|| format!("Failed to tag task {id}"))?,
        TaskCommands::RemoveTag { id, tag } => client
            .remove_tag_from_task(&id, &tag)
            .await
            .with_context(|| format!("Failed to untag task {id}"))?,
    };

    ctx.renderer.render_response(&response)
}
