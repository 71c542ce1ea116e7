//! Debug WebSocket integration tests.

mod common;

use std::time::Duration;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use common::{KUBE_MASTER, TestServer, settle};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn send(ws: &mut Ws, value: Value) -> Result<()> {
    ws.send(Message::Text(value.to_string().into())).await?;
    Ok(())
}

/// Next text frame as JSON; `None` once a close frame arrives.
async fn recv(ws: &mut Ws) -> Result<Option<Value>> {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("stream ended"))??;
        match frame {
            Message::Text(text) => return Ok(Some(serde_json::from_str(text.as_str())?)),
            Message::Close(_) => return Ok(None),
            _ => continue,
        }
    }
}

async fn start_debug(ws: &mut Ws, prior: i64) -> Result<i64> {
    send(
        ws,
        json!({"type": "debug", "debug_seq_id": prior, "kube_master": KUBE_MASTER}),
    )
    .await?;
    let accepted = recv(ws).await?.ok_or_else(|| anyhow::anyhow!("closed"))?;
    assert_eq!(accepted["type"], "accepted", "{accepted}");
    accepted["execute_seq_id"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("missing id"))
}

#[tokio::test]
async fn test_ping_pong() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;
    let (mut ws, _) = connect_async(server.ws_url(&format!("/v2/components/{component}/debug"))).await?;

    send(&mut ws, json!({"type": "ping"})).await?;
    let reply = recv(&mut ws).await?.unwrap();
    assert_eq!(reply["type"], "pong");

    ws.send(Message::Text("not json".into())).await?;
    let reply = recv(&mut ws).await?.unwrap();
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "parse_error");
    Ok(())
}

#[tokio::test]
async fn test_debug_run_streams_progress_until_stopped() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;
    let (mut ws, _) = connect_async(server.ws_url(&format!("/v2/components/{component}/debug"))).await?;

    let id = start_debug(&mut ws, 0).await?;
    settle().await;

    server.post_event(id, "component_start", "up").await?;
    let progress = recv(&mut ws).await?.unwrap();
    assert_eq!(progress["type"], "progress");
    assert_eq!(progress["execution"]["status"], "started");
    assert_eq!(progress["execution"]["events"][0]["content"], "up");

    server.post_event(id, "component_stop", "").await?;
    let progress = recv(&mut ws).await?.unwrap();
    assert_eq!(progress["execution"]["status"], "stopped");
    assert!(recv(&mut ws).await?.is_none());

    assert!(server.webhooks.deliveries().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_debug_start_for_unknown_component_reports_error() -> Result<()> {
    let server = TestServer::start().await?;
    let (mut ws, _) = connect_async(server.ws_url("/v2/components/4242/debug")).await?;

    send(&mut ws, json!({"type": "debug", "kube_master": KUBE_MASTER})).await?;
    let reply = recv(&mut ws).await?.unwrap();
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "start_failed");
    Ok(())
}

#[tokio::test]
async fn test_superseded_session_is_closed() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;
    let url = server.ws_url(&format!("/v2/components/{component}/debug"));

    let (mut first, _) = connect_async(url.as_str()).await?;
    let first_id = start_debug(&mut first, 0).await?;

    let (mut second, _) = connect_async(url.as_str()).await?;
    let second_id = start_debug(&mut second, first_id).await?;
    assert_ne!(first_id, second_id);

    let reply = recv(&mut first).await?.unwrap();
    assert_eq!(reply["code"], "session_closed");
    assert!(recv(&mut first).await?.is_none());
    assert!(server.sessions.contains(second_id).await);
    Ok(())
}

#[tokio::test]
async fn test_idle_connection_closed_normally() -> Result<()> {
    let server = TestServer::start_with_idle_timeout(Duration::from_millis(300)).await?;
    let component = server.create_component("echo", 0).await?;
    let (mut ws, _) = connect_async(server.ws_url(&format!("/v2/components/{component}/debug"))).await?;

    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await?
        .ok_or_else(|| anyhow::anyhow!("stream ended"))??;
    match frame {
        Message::Close(Some(close)) => assert_eq!(close.code, CloseCode::Normal),
        other => panic!("expected close frame, got {other:?}"),
    }
    Ok(())
}
