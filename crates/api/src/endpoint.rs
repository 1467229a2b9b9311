//! Descriptor table for every remote operation.
//!
//! Each [`Endpoint`] names the verb, the path template relative to the API
//! base URL and the shape of the request body. The resource methods only pick
//! an endpoint and supply ids, query pairs and an [`Input`]; everything else
//! goes through [`crate::ApiClient::dispatch`].

use reqwest::Method;
use serde_json::{json, Map, Value};
use url::form_urlencoded;

use crate::error::{ApiError, Result};
use crate::upload::Upload;
use crate::RequestBody;

const ID: &str = "{id}";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyShape {
    /// No body.
    Empty,
    /// `{"data": <input>}`
    Data,
    /// `{"data": {"<key>": <input>}}`
    Field(&'static str),
    /// Multipart form with the upload under `file`.
    File,
}

/// Caller-supplied content that a [`BodyShape`] turns into a request body.
#[derive(Debug)]
pub enum Input {
    None,
    Value(Value),
    File(Upload),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub verb: Verb,
    pub path: &'static str,
    pub body: BodyShape,
}

impl Endpoint {
    const fn get(path: &'static str) -> Self {
        Self {
            verb: Verb::Get,
            path,
            body: BodyShape::Empty,
        }
    }

    const fn post(path: &'static str, body: BodyShape) -> Self {
        Self {
            verb: Verb::Post,
            path,
            body,
        }
    }

    const fn put(path: &'static str) -> Self {
        Self {
            verb: Verb::Put,
            path,
            body: BodyShape::Data,
        }
    }

    /// Path segments with the `{id}` placeholder filled. The id always stays
    /// a single segment; it is percent-encoded when the URL is built.
    pub fn path_segments<'a>(&self, id: Option<&'a str>) -> Result<Vec<&'a str>> {
        let mut segments = Vec::new();
        for segment in self.path.split('/') {
            if segment != ID {
                segments.push(segment);
                continue;
            }

            let id = id.filter(|id| !id.is_empty()).ok_or_else(|| {
                ApiError::InvalidPayload(format!("an id is required for {}", self.path))
            })?;
            if matches!(id, "." | "..") {
                return Err(ApiError::InvalidPayload(format!(
                    "{id:?} is not a valid id for {}",
                    self.path
                )));
            }
            segments.push(id);
        }
        Ok(segments)
    }

    pub fn build_body(&self, input: Input) -> Result<RequestBody> {
        match (self.body, input) {
            (BodyShape::Empty, Input::None) => Ok(RequestBody::Empty),
            (BodyShape::Data, Input::Value(data)) => Ok(RequestBody::Json(json!({ "data": data }))),
            (BodyShape::Field(key), Input::Value(value)) => {
                let mut field = Map::new();
                field.insert(key.to_string(), value);
                Ok(RequestBody::Json(json!({ "data": field })))
            }
            (BodyShape::File, Input::File(upload)) => Ok(RequestBody::Multipart(upload)),
            (shape, input) => Err(ApiError::InvalidPayload(format!(
                "{:?} body cannot be built from {} for {}",
                shape,
                input_name(&input),
                self.path
            ))),
        }
    }
}

fn input_name(input: &Input) -> &'static str {
    match input {
        Input::None => "no input",
        Input::Value(_) => "a JSON value",
        Input::File(_) => "a file",
    }
}

/// Encode query pairs in the given order, dropping pairs with an empty value.
/// Returns `None` when nothing is left.
pub fn query_string(pairs: &[(&str, &str)]) -> Option<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs.iter().filter(|(_, value)| !value.is_empty()) {
        serializer.append_pair(key, value);
        any = true;
    }
    any.then(|| serializer.finish())
}

// Users
pub const USER: Endpoint = Endpoint::get("users/{id}");
pub const USERS: Endpoint = Endpoint::get("users");

// Tasks
pub const TASKS: Endpoint = Endpoint::get("tasks");
pub const TASK: Endpoint = Endpoint::get("tasks/{id}");
pub const CREATE_TASK: Endpoint = Endpoint::post("tasks", BodyShape::Data);
pub const UPDATE_TASK: Endpoint = Endpoint::put("tasks/{id}");
pub const TASK_SUBTASKS: Endpoint = Endpoint::get("tasks/{id}/subtasks");
pub const TASK_PROJECTS: Endpoint = Endpoint::get("tasks/{id}/projects");
pub const TASK_STORIES: Endpoint = Endpoint::get("tasks/{id}/stories");
pub const TASK_ATTACHMENT: Endpoint = Endpoint::post("tasks/{id}/attachments", BodyShape::File);
pub const TASK_COMMENT: Endpoint = Endpoint::post("tasks/{id}/stories", BodyShape::Field("text"));
pub const TASK_ADD_PROJECT: Endpoint =
    Endpoint::post("tasks/{id}/addProject", BodyShape::Field("project"));
pub const TASK_REMOVE_PROJECT: Endpoint =
    Endpoint::post("tasks/{id}/removeProject", BodyShape::Field("project"));
pub const TASK_ADD_TAG: Endpoint = Endpoint::post("tasks/{id}/addTag", BodyShape::Field("tag"));
pub const TASK_REMOVE_TAG: Endpoint =
    Endpoint::post("tasks/{id}/removeTag", BodyShape::Field("tag"));

// Projects
pub const PROJECTS: Endpoint = Endpoint::get("projects");
pub const PROJECT: Endpoint = Endpoint::get("projects/{id}");
pub const CREATE_PROJECT: Endpoint = Endpoint::post("projects", BodyShape::Data);
pub const UPDATE_PROJECT: Endpoint = Endpoint::put("projects/{id}");
pub const PROJECT_STORIES: Endpoint = Endpoint::get("projects/{id}/stories");
pub const PROJECT_COMMENT: Endpoint =
    Endpoint::post("projects/{id}/stories", BodyShape::Field("text"));

// Tags
pub const TAGS: Endpoint = Endpoint::get("tags");
pub const TAG: Endpoint = Endpoint::get("tags/{id}");
pub const UPDATE_TAG: Endpoint = Endpoint::put("tags/{id}");
pub const TAG_TASKS: Endpoint = Endpoint::get("tags/{id}/tasks");

// Stories
pub const STORY: Endpoint = Endpoint::get("stories/{id}");

// Workspaces
pub const WORKSPACES: Endpoint = Endpoint::get("workspaces");
pub const UPDATE_WORKSPACE: Endpoint = Endpoint::put("workspaces/{id}");
pub const WORKSPACE_TAGS: Endpoint = Endpoint::get("workspaces/{id}/tags");
pub const WORKSPACE_USERS: Endpoint = Endpoint::get("workspaces/{id}/users");
