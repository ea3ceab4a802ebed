use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use pushrelay::error::Result;
use pushrelay::pushrelay::build_handler;
use pushrelay::pushrelay::config::{ServerConfig, VapidConfig};
use pushrelay::pushrelay::net::server::serve;
use pushrelay::pushrelay::subscription::Subscription;
use pushrelay::pushrelay::transport::{LoggingTransport, PushTransport};

const CONFIG: &str = r#"
    id = "relay-it"
    addr = "127.0.0.1:0"

    [vapid]
    public_key = "pub"
    private_key = "priv"
    subject = "mailto:ops@example.com"

    [backend]
    fetch_delay_ms = 20
    report_delay_ms = 150
"#;

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, request: Value) {
        let mut line = serde_json::to_vec(&request).unwrap();
        line.push(b'\n');
        self.writer.write_all(&line).await.unwrap();
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("response in time")
            .unwrap()
            .expect("connection open");
        serde_json::from_str(&line).unwrap()
    }
}

/// Keeps every payload the relay hands to the transport
#[derive(Default)]
struct RecordingTransport {
    payloads: Mutex<Vec<Value>>,
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn deliver(&self, _vapid: &VapidConfig, _subscription: &Subscription, payload: &[u8]) -> Result<()> {
        self.payloads.lock().unwrap().push(serde_json::from_slice(payload)?);
        Ok(())
    }
}

async fn start_relay() -> std::net::SocketAddr {
    start_relay_with(Arc::new(LoggingTransport)).await
}

async fn start_relay_with(transport: Arc<dyn PushTransport>) -> std::net::SocketAddr {
    let config = ServerConfig::from_toml_str(CONFIG).unwrap();
    let handler = build_handler(&config, transport);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, handler));
    addr
}

fn subscription(endpoint: &str) -> Value {
    json!({ "endpoint": endpoint, "keys": { "p256dh": "k", "auth": "a" } })
}

#[tokio::test]
async fn subscribe_status_and_unsubscribe() {
    let addr = start_relay().await;
    let mut client = TestClient::connect(addr).await;

    client.send(json!({ "op": "status" })).await;
    assert_eq!(client.recv().await, json!({ "type": "status", "subscriptions": 0, "empty": true }));

    client.send(json!({ "op": "subscribe", "subscription": subscription("https://push/a") })).await;
    assert_eq!(client.recv().await, json!({ "type": "ok" }));
    client.send(json!({ "op": "subscribe", "subscription": subscription("https://push/a") })).await;
    assert_eq!(client.recv().await, json!({ "type": "ok" }));

    client.send(json!({ "op": "status" })).await;
    assert_eq!(client.recv().await, json!({ "type": "status", "subscriptions": 1, "empty": false }));

    client.send(json!({ "op": "unsubscribe", "subscription": subscription("https://push/missing") })).await;
    assert_eq!(client.recv().await, json!({ "type": "ok" }));
    client.send(json!({ "op": "unsubscribe", "subscription": subscription("https://push/a") })).await;
    assert_eq!(client.recv().await, json!({ "type": "ok" }));

    client.send(json!({ "op": "status" })).await;
    assert_eq!(client.recv().await["empty"], true);
}

#[tokio::test]
async fn bad_requests_get_errors_and_keep_the_session() {
    let addr = start_relay().await;
    let mut client = TestClient::connect(addr).await;

    client.send_raw("{ nope").await;
    assert_eq!(client.recv().await["code"], 0x0001);

    client.send(json!({ "op": "dance" })).await;
    assert_eq!(client.recv().await["code"], 0x0002);

    client.send(json!({ "op": "subscribe", "subscription": subscription("") })).await;
    let response = client.recv().await;
    assert_eq!(response["type"], "error");
    assert_eq!(response["code"], 0x0101);

    client.send(json!({ "op": "status" })).await;
    assert_eq!(client.recv().await["type"], "status");
}

#[tokio::test]
async fn fetch_answers_pending_then_result() {
    let addr = start_relay().await;
    let mut client = TestClient::connect(addr).await;

    client.send(json!({ "op": "fetch" })).await;
    assert_eq!(client.recv().await, json!({ "type": "pending", "op": "fetch" }));
    assert_eq!(
        client.recv().await,
        json!({ "type": "fetched", "text": "I'm a response from a slow operation!" })
    );
}

#[tokio::test]
async fn report_notifies_subscribers_and_rejects_overlap() {
    let addr = start_relay().await;
    let mut subscriber = TestClient::connect(addr).await;
    subscriber.send(json!({ "op": "subscribe", "subscription": subscription("https://push/a") })).await;
    assert_eq!(subscriber.recv().await["type"], "ok");

    let mut client = TestClient::connect(addr).await;
    client.send(json!({ "op": "report" })).await;
    assert_eq!(client.recv().await, json!({ "type": "pending", "op": "report" }));

    client.send(json!({ "op": "report" })).await;
    assert_eq!(client.recv().await["code"], 0x0003);

    let report = client.recv().await;
    assert_eq!(report["type"], "report");
    assert_eq!(report["records"].as_array().unwrap().len(), 5);
    assert_eq!(report["records"][0]["trend_per_month"]["JANUARY"], "stable");
    assert_eq!(report["broadcast"], json!({ "attempted": 1, "delivered": 1, "failed": 0 }));

    client.send(json!({ "op": "report", "notify": false })).await;
    assert_eq!(client.recv().await["type"], "pending");
    let report = client.recv().await;
    assert_eq!(report["type"], "report");
    assert!(report.get("broadcast").is_none());
}

#[tokio::test]
async fn report_ready_notification_links_back_to_the_relay() {
    let transport = Arc::new(RecordingTransport::default());
    let addr = start_relay_with(transport.clone()).await;
    let mut client = TestClient::connect(addr).await;
    client.send(json!({ "op": "subscribe", "subscription": subscription("https://push/a") })).await;
    assert_eq!(client.recv().await["type"], "ok");

    client.send(json!({ "op": "report" })).await;
    assert_eq!(client.recv().await["type"], "pending");
    assert_eq!(client.recv().await["type"], "report");

    let payloads = transport.payloads.lock().unwrap().clone();
    assert_eq!(
        payloads,
        vec![json!({
            "title": "Message from your push relay",
            "options": {
                "body": "Heavy Work is ready, so please come back!",
                "data": { "url": "/web-notification" }
            }
        })]
    );
}

#[tokio::test]
async fn subscriptions_survive_disconnect_and_restore_only_fills_empty() {
    let addr = start_relay().await;
    {
        let mut client = TestClient::connect(addr).await;
        client.send(json!({ "op": "restore", "subscription": subscription("https://push/a") })).await;
        assert_eq!(client.recv().await, json!({ "type": "restored", "stored": true }));
    }

    let mut client = TestClient::connect(addr).await;
    client.send(json!({ "op": "restore", "subscription": subscription("https://push/b") })).await;
    assert_eq!(client.recv().await, json!({ "type": "restored", "stored": false }));

    client.send(json!({ "op": "notify", "title": "t", "body": "b", "url": "/x" })).await;
    assert_eq!(
        client.recv().await,
        json!({ "type": "broadcast", "attempted": 1, "delivered": 1, "failed": 0 })
    );
}
