use std::io::Write;
use std::time::Duration;

use docqa_engine::{
    ChatPayload, ClientSettings, DocQaService, FailureKind, ReqwestService, UploadResponse,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> ReqwestService {
    ReqwestService::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("service")
}

fn write_pdf(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"%PDF-1.4\n% test document\n%%EOF\n").unwrap();
    path
}

#[tokio::test]
async fn upload_sends_file_part_and_parses_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"file\"; filename=\"report.pdf\""))
        .and(body_string_contains("application/pdf"))
        .and(body_string_contains("% test document"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "doc_id": "d1",
            "filename": "report.pdf",
            "chunks": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(&dir, "report.pdf");

    let response = service_for(&server).upload(&pdf).await.expect("upload ok");
    assert_eq!(
        response,
        UploadResponse {
            document_id: "d1".to_string(),
            filename: "report.pdf".to_string(),
            chunk_count: 12,
        }
    );
}

#[tokio::test]
async fn upload_of_missing_file_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = service_for(&server)
        .upload(&dir.path().join("absent.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::FileUnreadable);
}

#[tokio::test]
async fn upload_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("{\"detail\":\"boom\"}"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(&dir, "a.pdf");

    let err = service_for(&server).upload(&pdf).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert!(err.message.contains("boom"));
}

#[tokio::test]
async fn chat_posts_json_and_parses_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "doc_id": "d1",
            "question": "Summarize page 1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "It is a report."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = service_for(&server)
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "Summarize page 1".to_string(),
        })
        .await
        .expect("chat ok");

    assert_eq!(reply.answer, "It is a report.");
    assert!(reply.evidence.is_empty());
}

#[tokio::test]
async fn chat_reads_evidence_pages_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "I don't know.",
            "evidence": [
                {"id": "c1", "page_start": 3, "distance": 0.41},
                {"id": "c2", "page_start": null, "distance": 0.52},
                {"id": "c3", "page_start": 5}
            ]
        })))
        .mount(&server)
        .await;

    let reply = service_for(&server)
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .expect("chat ok");

    assert_eq!(reply.evidence.len(), 3);
    assert_eq!(reply.cited_pages(), vec![3, 5]);
}

#[tokio::test]
async fn chat_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn chat_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .set_body_string("{\"answer\":\"0123456789\"}"),
        )
        .mount(&server)
        .await;

    let service = ReqwestService::new(ClientSettings {
        base_url: server.uri(),
        max_response_bytes: 10,
        ..ClientSettings::default()
    })
    .unwrap();

    let err = service
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(23)
        }
    );
}

#[tokio::test]
async fn chat_times_out_when_request_timeout_is_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"answer": "late"})),
        )
        .mount(&server)
        .await;

    let service = ReqwestService::new(ClientSettings {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
        ..ClientSettings::default()
    })
    .unwrap();

    let err = service
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn upload_rejects_blank_document_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "doc_id": " ",
            "filename": "a.pdf",
            "chunks": 4
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(&dir, "a.pdf");

    let err = service_for(&server).upload(&pdf).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn error_status_wins_over_size_limit() {
    let server = MockServer::start().await;
    let page = format!("<html>{}</html>", "x".repeat(5000));
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string(page))
        .mount(&server)
        .await;

    let service = ReqwestService::new(ClientSettings {
        base_url: server.uri(),
        max_response_bytes: 10,
        ..ClientSettings::default()
    })
    .unwrap();

    let err = service
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert!(err.message.starts_with("500 Internal Server Error: <html>xxx"));
}

/// Answers one request with a chunked body, so no `Content-Length` is sent.
async fn serve_chunked_once(chunks: &'static [&'static str]) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Drain the request so closing the socket does not reset it.
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let read = socket.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
            let text = String::from_utf8_lossy(&request);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let body_len = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + body_len {
                    break;
                }
            }
        }

        let mut response = String::from(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
             Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        );
        for chunk in chunks {
            response.push_str(&format!("{:x}\r\n{chunk}\r\n", chunk.len()));
        }
        response.push_str("0\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn chat_caps_body_without_content_length() {
    let base_url = serve_chunked_once(&["{\"answer\":", "\"0123456789\"}"]).await;
    let service = ReqwestService::new(ClientSettings {
        base_url,
        max_response_bytes: 10,
        ..ClientSettings::default()
    })
    .unwrap();

    let err = service
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .unwrap_err();
    match err.kind {
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(actual),
        } => assert!(actual > 10),
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_accepts_chunked_body_within_limit() {
    let base_url = serve_chunked_once(&["{\"answer\":", "\"ok\"}"]).await;
    let service = ReqwestService::new(ClientSettings {
        base_url,
        ..ClientSettings::default()
    })
    .unwrap();

    let reply = service
        .chat(&ChatPayload {
            document_id: "d1".to_string(),
            question: "q".to_string(),
        })
        .await
        .expect("chat ok");
    assert_eq!(reply.answer, "ok");
}
