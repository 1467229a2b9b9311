//! One method per Asana operation.
//!
//! Every method resolves default ids through [`ClientConfig`], picks an
//! [`endpoint`] descriptor and hands off to [`ApiClient::dispatch`]. Results
//! are returned as the raw JSON the API sends back, `{"data": ...}` envelope
//! included.
//!
//! [`ClientConfig`]: crate::ClientConfig

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint::{self, Input};
use crate::error::{ApiError, Result};
use crate::upload::Upload;
use crate::ApiClient;

/// Filter for [`ApiClient::get_tasks_by_filter`]. Empty fields are left out
/// of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub workspace: String,
}

impl TaskFilter {
    /// Query pairs in the order the API documents them.
    pub fn query_pairs(&self) -> [(&str, &str); 3] {
        [
            ("assignee", self.assignee.as_str()),
            ("project", self.project.as_str()),
            ("workspace", self.workspace.as_str()),
        ]
    }
}

fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
    Ok(serde_json::to_value(data)?)
}

fn archived_flag(archived: bool) -> &'static str {
    if archived {
        "true"
    } else {
        "false"
    }
}

/// Put the default workspace first unless the caller already set one.
fn with_default_workspace(data: Value, workspace: Option<&str>) -> Result<Value> {
    let fields = match data {
        Value::Object(fields) => fields,
        other => {
            return Err(ApiError::InvalidPayload(format!(
                "task data must be a JSON object, got {other}"
            )))
        }
    };

    let Some(workspace) = workspace else {
        return Ok(Value::Object(fields));
    };

    let mut merged = Map::with_capacity(fields.len() + 1);
    merged.insert("workspace".to_string(), Value::from(workspace));
    merged.extend(fields);
    Ok(Value::Object(merged))
}

// Users
impl ApiClient {
    /// Full record for one user; the owner of the API key when `user_id` is
    /// omitted.
    pub async fn get_user_info(&self, user_id: Option<&str>) -> Result<Value> {
        let user_id = user_id.filter(|id| !id.is_empty()).unwrap_or("me");
        self.dispatch(&endpoint::USER, Some(user_id), &[], Input::None)
            .await
    }

    pub async fn get_users(&self) -> Result<Value> {
        self.dispatch(&endpoint::USERS, None, &[], Input::None).await
    }
}

// Tasks
impl ApiClient {
    /// Create a task. The configured default workspace is added when `data`
    /// has no `workspace` key; a caller-supplied workspace always wins.
    pub async fn create_task<T: Serialize + ?Sized>(&self, data: &T) -> Result<Value> {
        let data = with_default_workspace(to_value(data)?, self.config().default_workspace())?;
        self.dispatch(&endpoint::CREATE_TASK, None, &[], Input::Value(data))
            .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::TASK, Some(task_id), &[], Input::None)
            .await
    }

    pub async fn get_sub_tasks(&self, task_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::TASK_SUBTASKS, Some(task_id), &[], Input::None)
            .await
    }

    pub async fn update_task<T: Serialize + ?Sized>(&self, task_id: &str, data: &T) -> Result<Value> {
        self.dispatch(
            &endpoint::UPDATE_TASK,
            Some(task_id),
            &[],
            Input::Value(to_value(data)?),
        )
        .await
    }

    /// Upload a local file as an attachment. Fails without touching the
    /// network when the file cannot be read.
    pub async fn add_task_attachment(
        &self,
        task_id: &str,
        file: impl AsRef<Path>,
    ) -> Result<Value> {
        let upload = Upload::from_path(file)?;
        self.dispatch(
            &endpoint::TASK_ATTACHMENT,
            Some(task_id),
            &[],
            Input::File(upload),
        )
        .await
    }

    pub async fn get_projects_for_task(&self, task_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::TASK_PROJECTS, Some(task_id), &[], Input::None)
            .await
    }

    pub async fn add_project_to_task(
        &self,
        task_id: &str,
        project_id: Option<&str>,
    ) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(
            &endpoint::TASK_ADD_PROJECT,
            Some(task_id),
            &[],
            Input::Value(Value::from(project_id)),
        )
        .await
    }

    pub async fn remove_project_from_task(
        &self,
        task_id: &str,
        project_id: Option<&str>,
    ) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(
            &endpoint::TASK_REMOVE_PROJECT,
            Some(task_id),
            &[],
            Input::Value(Value::from(project_id)),
        )
        .await
    }

    /// Asana requires either a project, or an assignee together with a
    /// workspace. That combination is not checked here.
    pub async fn get_tasks_by_filter(&self, filter: &TaskFilter) -> Result<Value> {
        self.dispatch(&endpoint::TASKS, None, &filter.query_pairs(), Input::None)
            .await
    }

    pub async fn get_task_stories(&self, task_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::TASK_STORIES, Some(task_id), &[], Input::None)
            .await
    }

    pub async fn comment_on_task(&self, task_id: &str, text: &str) -> Result<Value> {
        self.dispatch(
            &endpoint::TASK_COMMENT,
            Some(task_id),
            &[],
            Input::Value(Value::from(text)),
        )
        .await
    }

    pub async fn add_tag_to_task(&self, task_id: &str, tag_id: &str) -> Result<Value> {
        self.dispatch(
            &endpoint::TASK_ADD_TAG,
            Some(task_id),
            &[],
            Input::Value(Value::from(tag_id)),
        )
        .await
    }

    pub async fn remove_tag_from_task(&self, task_id: &str, tag_id: &str) -> Result<Value> {
        self.dispatch(
            &endpoint::TASK_REMOVE_TAG,
            Some(task_id),
            &[],
            Input::Value(Value::from(tag_id)),
        )
        .await
    }
}

// Projects
impl ApiClient {
    pub async fn create_project<T: Serialize + ?Sized>(&self, data: &T) -> Result<Value> {
        self.dispatch(
            &endpoint::CREATE_PROJECT,
            None,
            &[],
            Input::Value(to_value(data)?),
        )
        .await
    }

    pub async fn get_project(&self, project_id: Option<&str>) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(&endpoint::PROJECT, Some(project_id), &[], Input::None)
            .await
    }

    /// Projects across all workspaces. `opt_fields` is passed through as-is
    /// (comma separated field names).
    pub async fn get_projects(&self, archived: bool, opt_fields: Option<&str>) -> Result<Value> {
        let query = [
            ("archived", archived_flag(archived)),
            ("opt_fields", opt_fields.unwrap_or("")),
        ];
        self.dispatch(&endpoint::PROJECTS, None, &query, Input::None)
            .await
    }

    pub async fn get_projects_in_workspace(
        &self,
        workspace_id: Option<&str>,
        archived: bool,
    ) -> Result<Value> {
        let workspace_id = self.config().workspace_or(workspace_id)?;
        let query = [
            ("archived", archived_flag(archived)),
            ("workspace", workspace_id),
        ];
        self.dispatch(&endpoint::PROJECTS, None, &query, Input::None)
            .await
    }

    pub async fn update_project<T: Serialize + ?Sized>(
        &self,
        project_id: Option<&str>,
        data: &T,
    ) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(
            &endpoint::UPDATE_PROJECT,
            Some(project_id),
            &[],
            Input::Value(to_value(data)?),
        )
        .await
    }

    /// Unarchived tasks of a project.
    pub async fn get_project_tasks(&self, project_id: Option<&str>) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(
            &endpoint::TASKS,
            None,
            &[("project", project_id)],
            Input::None,
        )
        .await
    }

    pub async fn get_project_stories(&self, project_id: Option<&str>) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(
            &endpoint::PROJECT_STORIES,
            Some(project_id),
            &[],
            Input::None,
        )
        .await
    }

    pub async fn comment_on_project(&self, project_id: Option<&str>, text: &str) -> Result<Value> {
        let project_id = self.config().project_or(project_id)?;
        self.dispatch(
            &endpoint::PROJECT_COMMENT,
            Some(project_id),
            &[],
            Input::Value(Value::from(text)),
        )
        .await
    }
}

// Tags
impl ApiClient {
    pub async fn get_tag(&self, tag_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::TAG, Some(tag_id), &[], Input::None)
            .await
    }

    pub async fn get_tags(&self) -> Result<Value> {
        self.dispatch(&endpoint::TAGS, None, &[], Input::None).await
    }

    pub async fn update_tag<T: Serialize + ?Sized>(&self, tag_id: &str, data: &T) -> Result<Value> {
        self.dispatch(
            &endpoint::UPDATE_TAG,
            Some(tag_id),
            &[],
            Input::Value(to_value(data)?),
        )
        .await
    }

    pub async fn get_tasks_with_tag(&self, tag_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::TAG_TASKS, Some(tag_id), &[], Input::None)
            .await
    }
}

// Stories
impl ApiClient {
    pub async fn get_story(&self, story_id: &str) -> Result<Value> {
        self.dispatch(&endpoint::STORY, Some(story_id), &[], Input::None)
            .await
    }
}

// Workspaces
impl ApiClient {
    pub async fn get_workspaces(&self) -> Result<Value> {
        self.dispatch(&endpoint::WORKSPACES, None, &[], Input::None)
            .await
    }

    /// Only the workspace name can be changed through the API.
    pub async fn update_workspace<T: Serialize + ?Sized>(
        &self,
        workspace_id: Option<&str>,
        data: &T,
    ) -> Result<Value> {
        let workspace_id = self.config().workspace_or(workspace_id)?;
        self.dispatch(
            &endpoint::UPDATE_WORKSPACE,
            Some(workspace_id),
            &[],
            Input::Value(to_value(data)?),
        )
        .await
    }

    /// Tasks in a workspace for one assignee (`me` unless given).
    pub async fn get_workspace_tasks(
        &self,
        workspace_id: Option<&str>,
        assignee: Option<&str>,
    ) -> Result<Value> {
        let workspace_id = self.config().workspace_or(workspace_id)?;
        let assignee = assignee.filter(|a| !a.is_empty()).unwrap_or("me");
        self.dispatch(
            &endpoint::TASKS,
            None,
            &[("workspace", workspace_id), ("assignee", assignee)],
            Input::None,
        )
        .await
    }

    pub async fn get_workspace_tags(&self, workspace_id: Option<&str>) -> Result<Value> {
        let workspace_id = self.config().workspace_or(workspace_id)?;
        self.dispatch(
            &endpoint::WORKSPACE_TAGS,
            Some(workspace_id),
            &[],
            Input::None,
        )
        .await
    }

    pub async fn get_workspace_users(&self, workspace_id: Option<&str>) -> Result<Value> {
        let workspace_id = self.config().workspace_or(workspace_id)?;
        self.dispatch(
            &endpoint::WORKSPACE_USERS,
            Some(workspace_id),
            &[],
            Input::None,
        )
        .await
    }
}
