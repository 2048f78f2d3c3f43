use std::sync::Arc;

use fopenapi::{
    OpenApiErrorKind, RequestExecutor, ReqwestTransport, ResponsePayload, ToolAssembler, ToolSet,
};
use ftooling::{Tool, ToolArgs, ToolErrorKind, ToolExecutionContext};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn users_api() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Users", "version": "1.0.0"},
        "paths": {
            "/users": {
                "post": {
                    "operationId": "createUser",
                    "responses": {"200": {"description": "OK"}},
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "name": {"type": "string"},
                                        "email": {"type": "string"}
                                    },
                                    "required": ["name", "email"]
                                }
                            }
                        }
                    }
                }
            },
            "/users/{id}": {
                "get": {
                    "operationId": "getUser",
                    "responses": {"200": {"description": "OK"}},
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "location", "in": "query", "schema": {"type": "string"}}
                    ]
                }
            }
        }
    })
}

fn tools_for(base_url: &str) -> ToolSet {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build");
    ToolAssembler::new(RequestExecutor::new(Arc::new(ReqwestTransport::new(client))))
        .with_base_url_override(base_url)
        .assemble(&users_api())
        .expect("tools should assemble")
}

async fn spawn_server(
    status_line: &str,
    content_type: &str,
    body: &str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("listener should have an address");
    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("connection should arrive");
        let request = read_request(&mut socket).await;
        socket
            .write_all(response.as_bytes())
            .await
            .expect("response should write");
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{address}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await.expect("request should read");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[tokio::test]
async fn get_substitutes_path_and_encodes_query() {
    let (base_url, server) = spawn_server("200 OK", "application/json", r#"{"id":"123"}"#).await;
    let tool = tools_for(&base_url).get("getUser").expect("tool should exist");

    let payload = tool
        .execute(&json!({"id": "123", "location": "New York"}))
        .await
        .expect("call should succeed");
    assert_eq!(payload, ResponsePayload::Json(json!({"id": "123"})));

    let request = server.await.expect("server task should finish");
    assert!(request.starts_with("GET /users/123?location=New%20York HTTP/1.1\r\n"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("content-type: application/json")
    );
}

fn object(value: Value) -> ToolArgs {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn post_sends_only_body_fields_as_json() {
    let (base_url, server) = spawn_server("201 Created", "text/plain", "created").await;
    let tool = tools_for(&base_url).get("createUser").expect("tool should exist");

    let output = tool
        .invoke(
            object(json!({"name": "John Doe", "email": "john@example.com", "ignored": true})),
            &ToolExecutionContext::new("session-1"),
        )
        .await
        .expect("call should succeed");
    assert_eq!(output, "created");

    let request = server.await.expect("server task should finish");
    assert!(request.starts_with("POST /users HTTP/1.1\r\n"));
    assert!(request.ends_with(r#"{"name":"John Doe","email":"john@example.com"}"#));
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let (base_url, server) = spawn_server("404 Not Found", "application/json", "{}").await;
    let tool = tools_for(&base_url).get("getUser").expect("tool should exist");

    let error = tool
        .execute(&json!({"id": "missing"}))
        .await
        .expect_err("404 should fail");
    assert_eq!(error.kind, OpenApiErrorKind::Http);
    assert_eq!(error.status, Some(404));
    assert_eq!(error.status_text.as_deref(), Some("Not Found"));
    assert_eq!(error.message, "HTTP 404: Not Found");
    server.await.expect("server task should finish");
}

#[tokio::test]
async fn status_text_is_the_canonical_reason_not_the_servers_phrase() {
    let (base_url, server) = spawn_server("404 Gone Fishing", "application/json", "{}").await;
    let tool = tools_for(&base_url).get("getUser").expect("tool should exist");

    let error = tool
        .execute(&json!({"id": "missing"}))
        .await
        .expect_err("404 should fail");
    assert_eq!(error.status_text.as_deref(), Some("Not Found"));
    assert_eq!(error.message, "HTTP 404: Not Found");
    server.await.expect("server task should finish");
}

#[tokio::test]
async fn base_url_path_prefixes_are_kept() {
    let (base_url, server) = spawn_server("200 OK", "application/json", "{}").await;
    let tool = tools_for(&format!("{base_url}/v1/"))
        .get("getUser")
        .expect("tool should exist");

    tool.execute(&json!({"id": "7"}))
        .await
        .expect("call should succeed");

    let request = server.await.expect("server task should finish");
    assert!(request.starts_with("GET /v1/users/7 HTTP/1.1\r\n"));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let (base_url, server) = spawn_server("200 OK", "application/json", "{oops").await;
    let tool = tools_for(&base_url).get("getUser").expect("tool should exist");

    let error = tool
        .invoke(object(json!({"id": "1"})), &ToolExecutionContext::new("session-1"))
        .await
        .expect_err("malformed JSON should fail");
    assert_eq!(error.kind, ToolErrorKind::Upstream);
    assert_eq!(error.status, None);
    assert!(error.message.starts_with("invalid JSON response"));
    server.await.expect("server task should finish");
}

#[tokio::test]
async fn unreachable_hosts_are_retryable_transport_errors() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("listener should have an address");
    drop(listener);

    let tool = tools_for(&format!("http://{address}"))
        .get("getUser")
        .expect("tool should exist");
    let error = tool
        .execute(&json!({"id": "1"}))
        .await
        .expect_err("closed port should fail");
    assert_eq!(error.kind, OpenApiErrorKind::Transport);
    assert!(error.is_retryable());
}
