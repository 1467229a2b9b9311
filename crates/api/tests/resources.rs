use std::io::Write;
use std::time::Duration;

use asana_api::{ApiClient, ApiError, ClientConfig, ErrorKind, TaskFilter};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use wiremock::matchers::{any, body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(API_KEY).with_base_url(format!("{}/api/1.0/", server.uri()))
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(config(server).with_workspace("1768").with_project("42")).unwrap()
}

fn basic_auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{API_KEY}:")))
}

#[tokio::test]
async fn test_create_task_adds_default_workspace() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks"))
        .and(header("authorization", basic_auth().as_str()))
        .and(header("content-type", "application/json"))
        .and(body_string(
            r#"{"data":{"workspace":"1768","name":"Hello World!"}}"#,
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"gid": "1001", "name": "Hello World!"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client(&mock_server)
        .create_task(&json!({"name": "Hello World!"}))
        .await
        .unwrap();

    assert_eq!(response["data"]["gid"], "1001");
}

#[tokio::test]
async fn test_create_task_keeps_caller_workspace() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks"))
        .and(body_json(json!({"data": {"workspace": "9999", "name": "X"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"gid": "1"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .create_task(&json!({"workspace": "9999", "name": "X"}))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_created_fields_survive_echo() {
    let mock_server = MockServer::start().await;

    let payload = json!({
        "name": "Write report",
        "notes": "Quarterly numbers",
        "followers": ["37136", "59083"]
    });

    Mock::given(method("POST"))
        .and(path("/api/1.0/projects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "followers": ["37136", "59083"],
                "notes": "Quarterly numbers",
                "name": "Write report"
            }
        })))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server).create_project(&payload).await.unwrap();

    assert_eq!(response["data"], payload);
}

#[tokio::test]
async fn test_add_project_defaults_to_configured_project() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks/555/addProject"))
        .and(body_string(r#"{"data":{"project":"42"}}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let implicit = client.add_project_to_task("555", None).await.unwrap();
    let explicit = client.add_project_to_task("555", Some("42")).await.unwrap();

    assert_eq!(implicit, explicit);
}

#[tokio::test]
async fn test_omitted_ids_match_explicit_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let data = json!({"name": "Renamed"});

    client.get_project(None).await.unwrap();
    client.get_project(Some("42")).await.unwrap();
    client.get_workspace_tags(None).await.unwrap();
    client.get_workspace_tags(Some("1768")).await.unwrap();
    client.get_projects_in_workspace(None, false).await.unwrap();
    client
        .get_projects_in_workspace(Some("1768"), false)
        .await
        .unwrap();
    client.remove_project_from_task("7", None).await.unwrap();
    client.remove_project_from_task("7", Some("42")).await.unwrap();
    client.update_project(None, &data).await.unwrap();
    client.update_project(Some("42"), &data).await.unwrap();
    client.get_project_tasks(None).await.unwrap();
    client.get_project_tasks(Some("42")).await.unwrap();
    client.get_project_stories(None).await.unwrap();
    client.get_project_stories(Some("42")).await.unwrap();
    client.comment_on_project(None, "Done").await.unwrap();
    client.comment_on_project(Some("42"), "Done").await.unwrap();
    client.get_workspace_tasks(None, None).await.unwrap();
    client.get_workspace_tasks(Some("1768"), None).await.unwrap();
    client.get_workspace_users(None).await.unwrap();
    client.get_workspace_users(Some("1768")).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 20);
    for pair in requests.chunks(2) {
        assert_eq!(pair[0].method, pair[1].method);
        assert_eq!(pair[0].url, pair[1].url);
        assert_eq!(pair[0].body, pair[1].body);
    }

    let expected = [
        ("GET", "/api/1.0/projects/42", None),
        ("GET", "/api/1.0/workspaces/1768/tags", None),
        ("GET", "/api/1.0/projects", Some("archived=false&workspace=1768")),
        ("POST", "/api/1.0/tasks/7/removeProject", None),
        ("PUT", "/api/1.0/projects/42", None),
        ("GET", "/api/1.0/tasks", Some("project=42")),
        ("GET", "/api/1.0/projects/42/stories", None),
        ("POST", "/api/1.0/projects/42/stories", None),
        ("GET", "/api/1.0/tasks", Some("workspace=1768&assignee=me")),
        ("GET", "/api/1.0/workspaces/1768/users", None),
    ];
    for (pair, (verb, expected_path, query)) in requests.chunks(2).zip(expected) {
        assert_eq!(pair[0].method.as_str(), verb, "{}", pair[0].url);
        assert_eq!(pair[0].url.path(), expected_path);
        assert_eq!(pair[0].url.query(), query);
    }

    assert_eq!(
        requests[6].body_json::<serde_json::Value>().unwrap(),
        json!({"data": {"project": "42"}})
    );
    assert_eq!(
        requests[14].body_json::<serde_json::Value>().unwrap(),
        json!({"data": {"text": "Done"}})
    );
}

#[tokio::test]
async fn test_task_and_tag_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client.get_sub_tasks("11").await.unwrap();
    client.get_projects_for_task("12").await.unwrap();
    client.get_task_stories("13").await.unwrap();
    client.get_tasks_with_tag("14").await.unwrap();
    client
        .update_task("15", &json!({"completed": true}))
        .await
        .unwrap();
    client.get_projects(false, Some("name,notes")).await.unwrap();
    client.get_projects(true, None).await.unwrap();

    let expected = [
        ("GET", "/api/1.0/tasks/11/subtasks", None),
        ("GET", "/api/1.0/tasks/12/projects", None),
        ("GET", "/api/1.0/tasks/13/stories", None),
        ("GET", "/api/1.0/tags/14/tasks", None),
        ("PUT", "/api/1.0/tasks/15", None),
        ("GET", "/api/1.0/projects", Some("archived=false&opt_fields=name%2Cnotes")),
        ("GET", "/api/1.0/projects", Some("archived=true")),
    ];

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), expected.len());
    for (request, (verb, expected_path, query)) in requests.iter().zip(expected) {
        assert_eq!(request.method.as_str(), verb, "{}", request.url);
        assert_eq!(request.url.path(), expected_path);
        assert_eq!(request.url.query(), query);
    }
    assert_eq!(
        requests[4].body_json::<serde_json::Value>().unwrap(),
        json!({"data": {"completed": true}})
    );
}

#[tokio::test]
async fn test_ids_stay_inside_their_segment() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client.get_task("1?opt_fields=name").await.unwrap();
    client.get_tag("a#b").await.unwrap();
    client.get_user_info(Some("../tasks")).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].url.path(), "/api/1.0/tasks/1%3Fopt_fields=name");
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(requests[1].url.path(), "/api/1.0/tags/a%23b");
    assert_eq!(requests[1].url.fragment(), None);
    assert_eq!(requests[2].url.path(), "/api/1.0/users/..%2Ftasks");
}

#[tokio::test]
async fn test_dot_ids_rejected_before_request() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server);

    let err = client.get_task("..").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidPayload(_)));
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(client.get_project(Some(".")).await.is_err());

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_task_filter_query_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/tasks"))
        .and(query_param("assignee", "me"))
        .and(query_param("workspace", "1768"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let filter = TaskFilter {
        assignee: "me".to_string(),
        project: String::new(),
        workspace: "1768".to_string(),
    };
    client.get_tasks_by_filter(&filter).await.unwrap();
    client
        .get_tasks_by_filter(&TaskFilter::default())
        .await
        .unwrap_err();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("assignee=me&workspace=1768"));
    assert_eq!(requests[1].url.query(), None);
    assert!(requests[1].url.as_str().ends_with("/api/1.0/tasks"));
}

#[tokio::test]
async fn test_user_info_defaults_to_me() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "176822166183", "name": "Test User"}
        })))
        .mount(&mock_server)
        .await;

    let user = client(&mock_server).get_user_info(None).await.unwrap();
    assert_eq!(user["data"]["name"], "Test User");
}

#[tokio::test]
async fn test_workspace_tasks_defaults_assignee() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .get_workspace_tasks(None, None)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("workspace=1768&assignee=me"));
}

#[tokio::test]
async fn test_comment_and_tag_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks/7/stories"))
        .and(body_json(json!({"data": {"text": "Looks good"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"gid": "s1"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks/7/removeTag"))
        .and(body_json(json!({"data": {"tag": "t9"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client.comment_on_task("7", "Looks good").await.unwrap();
    client.remove_tag_from_task("7", "t9").await.unwrap();
}

#[tokio::test]
async fn test_update_uses_put() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/1.0/workspaces/1768"))
        .and(body_json(json!({"data": {"name": "Renamed"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "1768", "name": "Renamed"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let workspace = client(&mock_server)
        .update_workspace(None, &json!({"name": "Renamed"}))
        .await
        .unwrap();
    assert_eq!(workspace["data"]["name"], "Renamed");
}

#[tokio::test]
async fn test_missing_default_fails_before_request() {
    let mock_server = MockServer::start().await;
    let client = ApiClient::new(config(&mock_server)).unwrap();

    let err = client.get_project_stories(None).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingContext { field: "project" }));

    let err = client.get_workspace_users(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failure_then_success_are_independent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/tasks/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal failure"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/tasks/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"gid": "2"}})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);

    let err = client.get_task("1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err, ApiError::ServerError { status: 500, .. }));
    assert!(!err.to_string().is_empty());

    let task = client.get_task("2").await.unwrap();
    assert_eq!(task["data"]["gid"], "2");

    // Single attempt, no retry.
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/api/1.0/tags/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/1.0/tags"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Not Authorized"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/1.0/workspaces"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);

    match client.get_tag("missing").await.unwrap_err() {
        ApiError::NotFound { resource } => assert_eq!(resource, "/api/1.0/tags/missing"),
        other => panic!("unexpected error: {other}"),
    }
    match client.get_tags().await.unwrap_err() {
        ApiError::AuthenticationFailed { message } => assert_eq!(message, "Not Authorized"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        client.get_workspaces().await.unwrap_err(),
        ApiError::RateLimited { retry_after: 30 }
    ));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/stories/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client =
        ApiClient::new(config(&mock_server).with_timeout(Duration::from_millis(200))).unwrap();

    let err = client.get_story("1").await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout { .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).get_users().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    match err {
        ApiError::Decode { status, body } => {
            assert_eq!(status, 200);
            assert_eq!(body, "<html>maintenance</html>");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks/3/addTag"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let value = client(&mock_server).add_tag_to_task("3", "8").await.unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_attachment_missing_file_sends_nothing() {
    let mock_server = MockServer::start().await;

    let err = client(&mock_server)
        .add_task_attachment("9", "@/nonexistent/path/report.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FileNotReadable);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_attachment_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/tasks/9/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "a1", "name": "notes.txt"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut file = tempfile::Builder::new()
        .prefix("notes")
        .suffix(".txt")
        .tempfile()
        .unwrap();
    write!(file, "attachment body").unwrap();

    let response = client(&mock_server)
        .add_task_attachment("9", file.path())
        .await
        .unwrap();
    assert_eq!(response["data"]["gid"], "a1");

    let requests = mock_server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body).to_lowercase();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains("content-type: text/plain"));
    assert!(body.contains("attachment body"));
}
