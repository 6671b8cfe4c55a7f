use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::net::TcpListener;

/// Canned reply for every request whose target starts with `prefix`
#[derive(Clone)]
struct Route {
    prefix: &'static str,
    status: StatusCode,
    body: String,
}

impl Route {
    fn new(prefix: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            prefix,
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.into(),
        }
    }
}

/// A request as the stub saw it
#[derive(Debug, Clone)]
struct Seen {
    target: String,
    headers: Vec<(String, String)>,
}

impl Seen {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct Stub {
    routes: Arc<Vec<Route>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

async fn respond(State(stub): State<Stub>, req: Request) -> Response {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let headers = req
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    stub.seen.lock().unwrap().push(Seen {
        target: target.clone(),
        headers,
    });

    match stub.routes.iter().find(|r| target.starts_with(r.prefix)) {
        Some(route) => (
            route.status,
            [(header::CONTENT_TYPE, "application/json")],
            route.body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// axum server on an ephemeral port, driven by its own runtime thread
struct StubServer {
    base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl StubServer {
    fn start(routes: Vec<Route>) -> Self {
        Self::start_with(move |_| routes)
    }

    /// Like `start`, but routes may refer to the server's own base URL
    fn start_with(make_routes: impl FnOnce(&str) -> Vec<Route> + Send + 'static) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let (base_tx, base_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build runtime");
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
                let base = format!("http://{}", listener.local_addr().expect("local addr"));
                let stub = Stub {
                    routes: Arc::new(make_routes(&base)),
                    seen: log,
                };
                base_tx.send(base).expect("report base url");
                let app = Router::new().fallback(respond).with_state(stub);
                axum::serve(listener, app).await.expect("serve");
            });
        });

        let base = base_rx.recv().expect("stub server started");
        Self { base, seen }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn targets(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.target).collect()
    }
}

fn run_portal(args: &[&str], home: &Path, envs: &[(&str, &str)]) -> (bool, Vec<u8>, Vec<u8>) {
    let bin = std::env::var("CARGO_BIN_EXE_sessions-portal").unwrap_or_else(|_| {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("target");
        path.push("debug");
        if cfg!(windows) {
            path.push("sessions-portal.exe");
        } else {
            path.push("sessions-portal");
        }
        path.to_string_lossy().into_owned()
    });
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    for key in [
        "SESSIONS_API_URL",
        "SESSIONS_DOWNLOAD_URL",
        "SESSIONS_REGION",
        "SESSIONS_SIGNED",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_SESSION_TOKEN",
    ] {
        cmd.env_remove(key);
    }
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let output = cmd.output().expect("run sessions-portal");
    (output.status.success(), output.stdout, output.stderr)
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn list_empty_shows_empty_message() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new("/sessions", 200, r#"{"sessions":[]}"#)]);

    let (ok, stdout, stderr) = run_portal(
        &["--no-color", "--api-url", &server.url("/sessions")],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    assert!(text(&stdout).contains("No sessions yet."));
    assert!(text(&stderr).contains("Loading"));
}

#[test]
fn list_json_carries_labels_and_routes() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new(
        "/sessions",
        200,
        r#"{"sessions":[{"sessionId":"Jam-20240115-153045123"},{"sessionId":"Jam-2024"}]}"#,
    )]);

    let (ok, stdout, stderr) = run_portal(
        &["list", "-j", "--api-url", &server.url("/sessions")],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));

    let json: Value = serde_json::from_slice(&stdout).expect("json");
    let arr = json.as_array().expect("array output");
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["sessionId"], "Jam-20240115-153045123");
    assert_eq!(arr[0]["dateLabel"], "2024-01-15");
    assert_eq!(arr[0]["timeLabel"], "15:30:45");
    assert_eq!(arr[0]["route"], "/session/Jam-20240115-153045123");
    assert_eq!(arr[0]["canDownload"], false);
    assert!(arr[1]["dateLabel"].is_null());
    assert!(arr[1]["timeLabel"].is_null());
}

#[test]
fn list_table_shows_rows() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new(
        "/sessions",
        200,
        r#"{"sessions":[{"sessionId":"Jam-20240115-153045123"}]}"#,
    )]);

    let (ok, stdout, stderr) = run_portal(
        &["--no-color", "--api-url", &server.url("/sessions")],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    let out = text(&stdout);
    assert!(out.contains("Jam-20240115-153045123"));
    assert!(out.contains("2024-01-15 • 15:30:45"));
    assert!(out.contains("1 session"));
}

#[test]
fn list_http_error_reports_status() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new("/sessions", 500, "boom")]);

    let (ok, stdout, stderr) = run_portal(
        &["--no-color", "--api-url", &server.url("/sessions")],
        home.path(),
        &[],
    );
    assert!(!ok);
    assert!(stdout.is_empty());
    let err = text(&stderr);
    assert!(err.contains("Could not load sessions"), "stderr: {err}");
    assert!(err.contains("500 Internal Server Error: boom"), "stderr: {err}");
}

#[test]
fn list_without_endpoint_reports_missing_configuration() {
    let home = tempfile::tempdir().unwrap();
    let (ok, _stdout, stderr) = run_portal(&["--no-color"], home.path(), &[]);
    assert!(!ok);
    assert!(text(&stderr).contains("Missing configuration"));
}

#[test]
fn list_reads_endpoint_from_config_file() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new("/sessions", 200, r#"{"sessions":[]}"#)]);
    let config_dir = home.path().join(".config").join("sessions-portal");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("list_endpoint = \"{}\"\n", server.url("/sessions")),
    )
    .unwrap();

    let (ok, stdout, stderr) = run_portal(&["--no-color"], home.path(), &[]);
    assert!(ok, "stderr: {}", text(&stderr));
    assert!(text(&stdout).contains("No sessions yet."));
}

#[test]
fn signed_without_credentials_fails_before_request() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new("/sessions", 200, r#"{"sessions":[]}"#)]);

    let (ok, _stdout, stderr) = run_portal(
        &[
            "--no-color",
            "--signed",
            "--region",
            "us-east-1",
            "--api-url",
            &server.url("/sessions"),
        ],
        home.path(),
        &[],
    );
    assert!(!ok);
    assert!(text(&stderr).contains("credentials"), "stderr: {}", text(&stderr));
    assert!(server.targets().is_empty());
}

#[test]
fn signed_with_env_credentials_reaches_server() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new("/sessions", 200, r#"{"sessions":[]}"#)]);

    let (ok, stdout, stderr) = run_portal(
        &["--no-color", "--api-url", &server.url("/sessions")],
        home.path(),
        &[
            ("SESSIONS_SIGNED", "true"),
            ("SESSIONS_REGION", "eu-west-2"),
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
        ],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    assert!(text(&stdout).contains("No sessions yet."));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.target, "/sessions");

    let amz_date = request.header("x-amz-date").expect("x-amz-date header");
    assert_eq!(amz_date.len(), 16);
    assert!(amz_date.ends_with('Z'));
    assert_eq!(
        request.header("x-amz-content-sha256"),
        Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
    );
    assert_eq!(request.header("x-amz-security-token"), None);

    let authorization = request.header("authorization").expect("authorization header");
    let scope = format!(
        "Credential=AKIDEXAMPLE/{}/eu-west-2/lambda/aws4_request",
        &amz_date[..8]
    );
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 "), "{authorization}");
    assert!(authorization.contains(&scope), "{authorization}");
    assert!(
        authorization.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date,"),
        "{authorization}"
    );
}

#[test]
fn download_prints_resolved_url() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new(
        "/download",
        200,
        r#"{"url":"https://cdn.example/Jam.zip?sig=abc"}"#,
    )]);

    let (ok, stdout, stderr) = run_portal(
        &[
            "download",
            "Jam-20240115-153045123",
            "--download-url",
            &server.url("/download?format=zip"),
        ],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    assert_eq!(text(&stdout).trim(), "https://cdn.example/Jam.zip?sig=abc");
    assert_eq!(
        server.targets(),
        vec!["/download?format=zip&sessionId=Jam-20240115-153045123".to_string()]
    );
    assert_eq!(server.requests()[0].header("authorization"), None);
}

#[test]
fn download_without_url_navigates_nowhere() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new("/download", 200, r#"{"expires":60}"#)]);

    let (ok, stdout, stderr) = run_portal(
        &["download", "Jam-1", "--download-url", &server.url("/download")],
        home.path(),
        &[],
    );
    assert!(!ok);
    assert!(stdout.is_empty());
    let err = text(&stderr);
    assert!(err.contains("Download failed"), "stderr: {err}");
    assert!(err.contains("endpoint did not return a url"), "stderr: {err}");
}

#[test]
fn download_to_file_fetches_resolved_url() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start_with(|base| {
        vec![
            Route::new("/file", 200, "recording-bytes"),
            Route::new(
                "/download",
                200,
                format!(r#"{{"url":"{base}/file/Jam-1.zip"}}"#),
            ),
        ]
    });
    let out_path = home.path().join("Jam-1.zip");

    let (ok, stdout, stderr) = run_portal(
        &[
            "download",
            "Jam-1",
            "--download-url",
            &server.url("/download"),
            "--output",
            out_path.to_str().unwrap(),
        ],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    assert!(stdout.is_empty());
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "recording-bytes");
}

#[test]
fn download_to_file_keeps_existing_file_when_target_fails() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start_with(|base| {
        vec![Route::new(
            "/download",
            200,
            format!(r#"{{"url":"{base}/gone/Jam-1.zip"}}"#),
        )]
    });
    let out_dir = home.path().join("downloads");
    fs::create_dir_all(&out_dir).unwrap();
    let out_path = out_dir.join("Jam-1.zip");
    fs::write(&out_path, "earlier download").unwrap();

    let (ok, stdout, stderr) = run_portal(
        &[
            "download",
            "Jam-1",
            "--download-url",
            &server.url("/download"),
            "--output",
            out_path.to_str().unwrap(),
        ],
        home.path(),
        &[],
    );
    assert!(!ok);
    assert!(stdout.is_empty());
    let err = text(&stderr);
    assert!(err.contains("404"), "stderr: {err}");
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "earlier download");
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);
    assert_eq!(
        server.targets(),
        vec![
            "/download?sessionId=Jam-1".to_string(),
            "/gone/Jam-1.zip".to_string()
        ]
    );
}

#[test]
fn download_json_reports_url() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![Route::new(
        "/download",
        200,
        r#"{"url":"https://cdn.example/a.zip"}"#,
    )]);

    let (ok, stdout, stderr) = run_portal(
        &["download", "Jam-1", "-j", "--download-url", &server.url("/download")],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    let json: Value = serde_json::from_slice(&stdout).expect("json");
    assert_eq!(json["sessionId"], "Jam-1");
    assert_eq!(json["url"], "https://cdn.example/a.zip");
}

#[test]
fn watch_rejects_non_list_commands() {
    let home = tempfile::tempdir().unwrap();
    let (ok, stdout, stderr) = run_portal(&["--watch", "5", "parse", "Jam-1"], home.path(), &[]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(text(&stderr).contains("--watch"), "stderr: {}", text(&stderr));
}

#[test]
fn open_prints_encoded_route() {
    let home = tempfile::tempdir().unwrap();
    let (ok, stdout, _stderr) = run_portal(&["open", "Jam 1/2"], home.path(), &[]);
    assert!(ok);
    assert_eq!(text(&stdout).trim(), "/session/Jam%201%2F2");
}

#[test]
fn parse_works_offline() {
    let home = tempfile::tempdir().unwrap();
    let (ok, stdout, stderr) = run_portal(
        &["parse", "Jam-20240115-153045123", "Jam-2024", "solo"],
        home.path(),
        &[],
    );
    assert!(ok, "stderr: {}", text(&stderr));
    assert_eq!(
        text(&stdout),
        "Jam-20240115-153045123\t2024-01-15\t15:30:45\nJam-2024\t-\t-\nsolo\t-\t-\n"
    );
}

#[test]
fn parse_json_uses_nulls_for_missing_labels() {
    let home = tempfile::tempdir().unwrap();
    let (ok, stdout, _stderr) = run_portal(
        &["parse", "-j", "Rec-99991399-996199"],
        home.path(),
        &[],
    );
    assert!(ok);
    let json: Value = serde_json::from_slice(&stdout).expect("json");
    assert_eq!(json[0]["dateLabel"], "9999-13-99");
    assert_eq!(json[0]["timeLabel"], "99:61:99");
}
