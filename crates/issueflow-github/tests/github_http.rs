//! GitHub client against a canned local HTTP responder.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use issueflow_core::{
    ChangeRequest, ChangeRequestWriter, FileEdit, IssueTracker, PipelineError, RepoRef,
};
use issueflow_github::{GithubClient, GithubConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Routes = HashMap<String, (u16, String)>;

/// Minimal HTTP/1.1 responder keyed by `"METHOD /path"`.
struct Stub {
    base_url: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    async fn start(routes: &[(&str, u16, &str)]) -> Stub {
        let routes: Routes = routes
            .iter()
            .map(|(key, status, body)| (key.to_string(), (*status, body.to_string())))
            .collect();
        let routes = Arc::new(routes);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task_seen = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let seen = task_seen.clone();
                tokio::spawn(async move {
                    serve(stream, &routes, &seen).await;
                });
            }
        });

        Stub {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    fn client(&self) -> GithubClient {
        GithubClient::new(GithubConfig::new("ghs_test").with_api_url(&self.base_url)).unwrap()
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

async fn serve(mut stream: TcpStream, routes: &Routes, seen: &Mutex<Vec<String>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut parts = head.split_whitespace();
    let key = format!(
        "{} {}",
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default()
    );
    seen.lock().unwrap().push(key.clone());

    let (status, body) = routes
        .get(&key)
        .cloned()
        .unwrap_or((404, r#"{"message": "Not Found"}"#.to_string()));
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn repo() -> RepoRef {
    RepoRef::new("octo", "widgets")
}

fn change_request() -> ChangeRequest {
    ChangeRequest {
        repo: repo(),
        base_branch: "main".to_string(),
        branch: "issueflow/issue-7".to_string(),
        files: vec![FileEdit::new("src/index.ts", "export {};")],
        title: "Add exporter".to_string(),
        body: "Closes #7".to_string(),
    }
}

const BASE_REF: &str = r#"{"ref": "refs/heads/main", "object": {"sha": "base1", "type": "commit"}}"#;
const BASE_COMMIT: &str = r#"{"sha": "base1", "tree": {"sha": "tree0"}}"#;

#[tokio::test]
async fn test_get_issue_decodes_labels() {
    let stub = Stub::start(&[(
        "GET /repos/octo/widgets/issues/7",
        200,
        r#"{"title": "Add exporter", "body": "a\nb", "labels": [{"name": "priority:high", "color": "f00"}]}"#,
    )])
    .await;

    let item = stub.client().get_issue(&repo(), 7).await.unwrap();
    assert_eq!(item.title, "Add exporter");
    assert_eq!(item.body.as_deref(), Some("a\nb"));
    assert_eq!(item.labels[0].name(), "priority:high");
}

#[tokio::test]
async fn test_missing_issue_is_not_found() {
    let stub = Stub::start(&[]).await;
    let err = stub.client().get_issue(&repo(), 99).await.unwrap_err();
    assert_eq!(err, PipelineError::NotFound { identifier: 99 });
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let stub = Stub::start(&[(
        "GET /repos/octo/widgets/issues/1",
        502,
        r#"{"message": "Server Error"}"#,
    )])
    .await;

    let err = stub.client().get_issue(&repo(), 1).await.unwrap_err();
    assert_eq!(
        err,
        PipelineError::Transport {
            status: Some(502),
            message: "GitHub API error: Server Error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unreachable_host_is_transport() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GithubClient::new(
        GithubConfig::new("ghs_test").with_api_url(format!("http://{addr}")),
    )
    .unwrap();
    let err = client.get_issue(&repo(), 1).await.unwrap_err();
    assert!(matches!(err, PipelineError::Transport { status: None, .. }));
}

#[tokio::test]
async fn test_create_change_request_walks_git_data_api() {
    let stub = Stub::start(&[
        ("GET /repos/octo/widgets/git/ref/heads/main", 200, BASE_REF),
        ("GET /repos/octo/widgets/git/commits/base1", 200, BASE_COMMIT),
        ("POST /repos/octo/widgets/git/trees", 201, r#"{"sha": "tree1"}"#),
        ("POST /repos/octo/widgets/git/commits", 201, r#"{"sha": "commit1"}"#),
        (
            "POST /repos/octo/widgets/git/refs",
            201,
            r#"{"ref": "refs/heads/issueflow/issue-7", "object": {"sha": "commit1"}}"#,
        ),
        (
            "POST /repos/octo/widgets/pulls",
            201,
            r#"{"number": 12, "html_url": "https://github.com/octo/widgets/pull/12"}"#,
        ),
    ])
    .await;

    let url = stub
        .client()
        .create_change_request(change_request())
        .await
        .unwrap();

    assert_eq!(url, "https://github.com/octo/widgets/pull/12");
    assert_eq!(
        stub.seen(),
        vec![
            "GET /repos/octo/widgets/git/ref/heads/issueflow/issue-7",
            "GET /repos/octo/widgets/git/ref/heads/main",
            "GET /repos/octo/widgets/git/commits/base1",
            "POST /repos/octo/widgets/git/trees",
            "POST /repos/octo/widgets/git/commits",
            "POST /repos/octo/widgets/git/refs",
            "POST /repos/octo/widgets/pulls",
        ]
    );
}

#[tokio::test]
async fn test_existing_branch_is_conflict_before_writes() {
    let stub = Stub::start(&[(
        "GET /repos/octo/widgets/git/ref/heads/issueflow/issue-7",
        200,
        r#"{"ref": "refs/heads/issueflow/issue-7", "object": {"sha": "old"}}"#,
    )])
    .await;

    let err = stub
        .client()
        .create_change_request(change_request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::Conflict {
            branch: "issueflow/issue-7".to_string()
        }
    );
    assert_eq!(stub.seen().len(), 1);
}

#[tokio::test]
async fn test_ref_race_is_conflict() {
    let stub = Stub::start(&[
        ("GET /repos/octo/widgets/git/ref/heads/main", 200, BASE_REF),
        ("GET /repos/octo/widgets/git/commits/base1", 200, BASE_COMMIT),
        ("POST /repos/octo/widgets/git/trees", 201, r#"{"sha": "tree1"}"#),
        ("POST /repos/octo/widgets/git/commits", 201, r#"{"sha": "commit1"}"#),
        (
            "POST /repos/octo/widgets/git/refs",
            422,
            r#"{"message": "Reference already exists"}"#,
        ),
    ])
    .await;

    let err = stub
        .client()
        .create_change_request(change_request())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Conflict { .. }));
    assert!(!stub
        .seen()
        .contains(&"POST /repos/octo/widgets/pulls".to_string()));
}

#[tokio::test]
async fn test_missing_base_branch_is_transport() {
    let stub = Stub::start(&[]).await;

    let err = stub
        .client()
        .create_change_request(change_request())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transport { status: Some(404), .. }));
}
