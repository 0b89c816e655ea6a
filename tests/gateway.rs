//! Integration tests for the tracker gateway.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tk_star_gateway::{
    Fix, Gateway, GatewayConfig, HttpPublisher, PublishError, PublishOutcome, Publisher,
    SinkTarget,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SAMPLE_FIX: &str = "24 41 09 17 90 26 11 09 27 16 01 17 50 37 69 30 05 00 30 46 75 0e 00 00 00 ff ff fb ff ff 00 1e 04 00 00 00 00 00 d0 01 00 00 00 00 2e";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct RecordingPublisher {
    urls: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    async fn wait_for(&self, count: usize) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + DEFAULT_TIMEOUT;
        while tokio::time::Instant::now() < deadline {
            let urls = self.urls();
            if urls.len() >= count {
                return urls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.urls()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, sink: &SinkTarget, fix: &Fix) -> Result<PublishOutcome, PublishError> {
        let url = sink.url(fix.latitude, fix.longitude);
        self.urls.lock().unwrap().push(url.clone());
        Ok(PublishOutcome {
            url,
            status: 200,
            reason: "OK".to_string(),
        })
    }
}

fn frame(hex_text: &str) -> Vec<u8> {
    hex::decode(hex_text.replace(' ', "")).expect("Invalid hex in test frame.")
}

fn config(max_sessions: usize) -> GatewayConfig {
    GatewayConfig {
        max_sessions,
        sinks: vec![
            SinkTarget::new(false, "first", "/t?lat={lat}&lon={lon}"),
            SinkTarget::new(true, "second", "/p?id=9&lat={lat}&lon={lon}"),
        ],
        ..GatewayConfig::default()
    }
}

async fn setup(max_sessions: usize) -> (u16, Arc<RecordingPublisher>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let publisher = Arc::new(RecordingPublisher::default());
    let gateway = Gateway::with_publisher(config(max_sessions), publisher.clone());
    tokio::spawn(async move { gateway.serve(listener).await });
    (port, publisher)
}

#[tokio::test]
async fn fix_is_published_to_all_sinks() {
    let (port, publisher) = setup(4).await;
    let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.write_all(&frame(SAMPLE_FIX)).await.unwrap();

    assert_eq!(
        publisher.wait_for(2).await,
        vec![
            "http://first/t?lat=50.628217&lon=3.077917",
            "https://second/p?id=9&lat=50.628217&lon=3.077917",
        ]
    );
}

#[tokio::test]
async fn text_dialect_and_garbage_are_not_published() {
    let (port, publisher) = setup(4).await;
    let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.write_all(b"*HQ,4109179026,V1,201727,A#").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.write_all(&frame("24 41 09 17")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(publisher.urls().is_empty());

    // Session survives and still handles a good frame
    client.write_all(&frame(SAMPLE_FIX)).await.unwrap();
    assert_eq!(publisher.wait_for(2).await.len(), 2);
}

#[tokio::test]
async fn sessions_are_independent() {
    let (port, publisher) = setup(4).await;
    let mut broken = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let mut healthy = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    broken.write_all(&frame("24 00")).await.unwrap();
    drop(broken);

    healthy.write_all(&frame(SAMPLE_FIX)).await.unwrap();
    assert_eq!(publisher.wait_for(2).await.len(), 2);
}

#[tokio::test]
async fn session_limit_defers_extra_connections() {
    let (port, publisher) = setup(1).await;
    let first = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut second = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    second.write_all(&frame(SAMPLE_FIX)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(publisher.urls().is_empty());

    drop(first);
    assert_eq!(publisher.wait_for(2).await.len(), 2);
}

#[tokio::test]
async fn stop_ends_serving_and_releases_the_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let publisher = Arc::new(RecordingPublisher::default());
    let gateway = Arc::new(Gateway::with_publisher(config(4), publisher.clone()));

    let serving = Arc::clone(&gateway);
    let handle = tokio::spawn(async move { serving.serve(listener).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    gateway.stop();
    let result = tokio::time::timeout(DEFAULT_TIMEOUT, handle)
        .await
        .expect("Gateway did not stop in time.")
        .unwrap();
    assert!(result.is_ok());

    assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());
}

#[tokio::test]
async fn stopped_gateway_does_not_serve() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let publisher = Arc::new(RecordingPublisher::default());
    let gateway = Gateway::with_publisher(config(4), publisher.clone());

    gateway.stop();
    let result = tokio::time::timeout(DEFAULT_TIMEOUT, gateway.serve(listener)).await;
    assert!(matches!(result, Ok(Ok(()))));
}

/// Serve one HTTP request with a fixed status line and return the request head
async fn one_shot_http(status_line: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buffer = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buffer).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buffer[..n]);
        }
        let response = format!("{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
        stream.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).to_string()
    });

    (port, handle)
}

fn sample_fix() -> Fix {
    match tk_star_gateway::decode(&frame(SAMPLE_FIX)).unwrap() {
        tk_star_gateway::Frame::Fix(fix) => fix,
        other => panic!("sample is not a fix: {:?}", other),
    }
}

#[tokio::test]
async fn http_publisher_sends_get_and_accepts_any_status() {
    let (port, server) = one_shot_http("HTTP/1.1 404 Not Found").await;
    let publisher = HttpPublisher::new(DEFAULT_TIMEOUT).unwrap();
    let host = format!("127.0.0.1:{}", port);
    let sink = SinkTarget::new(false, &host, "/track?id=7&lat={lat}&lon={lon}");

    let outcome = publisher.publish(&sink, &sample_fix()).await.unwrap();

    assert_eq!(outcome.status, 404);
    assert_eq!(outcome.reason, "Not Found");
    assert_eq!(
        outcome.url,
        format!("http://{}/track?id=7&lat=50.628217&lon=3.077917", host)
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /track?id=7&lat=50.628217&lon=3.077917 HTTP/1.1\r\n"));
}

#[tokio::test]
async fn http_publisher_reports_unreachable_sink() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let publisher = HttpPublisher::new(DEFAULT_TIMEOUT).unwrap();
    let sink = SinkTarget::new(false, &format!("127.0.0.1:{}", port), "/t?lat={lat}&lon={lon}");

    let err = publisher.publish(&sink, &sample_fix()).await.unwrap_err();
    assert_eq!(
        err.url,
        format!("http://127.0.0.1:{}/t?lat=50.628217&lon=3.077917", port)
    );
}
