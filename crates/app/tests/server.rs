use std::{net::SocketAddr, time::Duration};

use ringlight_app::{
    core::{BLACK, RGB8},
    handle_message, ActionSender, Client, CommandServer, RenderLoop, MAX_MESSAGE_LEN,
    SUCCESS_REPLY,
};
use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

use crate::utils::{is_filled, spawn_loop, FrameRecorder, RecordingDelay, TestSurface};

mod utils;

struct Loopback {
    render: RenderLoop<TestSurface>,
    recorder: FrameRecorder,
    delay: RecordingDelay,
    address: SocketAddr,
    _server: JoinHandle<anyhow::Result<()>>,
}

impl Loopback {
    fn sender(&self) -> ActionSender {
        self.render.sender()
    }

    fn wait_idle(&self) {
        assert!(self.sender().wait_idle(Duration::from_secs(5)));
    }
}

async fn create_loopback() -> Loopback {
    let delay = RecordingDelay::default();
    let (render, recorder) = spawn_loop(delay.clone());

    let server = CommandServer::bind("127.0.0.1:0".parse().unwrap(), render.sender())
        .await
        .unwrap();
    let address = server.local_addr().unwrap();
    let server = tokio::spawn(server.run());

    Loopback {
        render,
        recorder,
        delay,
        address,
        _server: server,
    }
}

#[tokio::test]
async fn test_set_all_command() {
    let loopback = create_loopback().await;
    let mut client = Client::connect(loopback.address).await.unwrap();

    let reply = client
        .send(&json!({"mode": "setAll", "r": 0, "g": 0, "b": 255, "reset": true}))
        .await
        .unwrap();
    assert_eq!(reply, SUCCESS_REPLY);
    assert!(Client::is_success(&reply));

    loopback.wait_idle();
    let frames = loopback.recorder.frames.lock().clone();
    assert_eq!(frames.len(), 1);
    assert!(is_filled(&frames[0], RGB8::new(0, 0, 255)));
}

#[tokio::test]
async fn test_timer_command() {
    let loopback = create_loopback().await;
    let mut client = Client::connect(loopback.address).await.unwrap();

    let reply = client
        .send(&json!({"mode": "timer", "r": 0, "g": 255, "b": 0, "duration": 5}))
        .await
        .unwrap();
    assert_eq!(reply, SUCCESS_REPLY);

    loopback.wait_idle();
    let frames = loopback.recorder.frames.lock().clone();
    assert_eq!(frames.len(), 6);
    assert!(is_filled(&frames[4], RGB8::new(0, 255, 0)));
    assert!(is_filled(&frames[5], BLACK));
    assert_eq!(*loopback.delay.0.lock(), vec![1_000; 5]);
}

#[tokio::test]
async fn test_rejected_commands() {
    let loopback = create_loopback().await;
    let mut client = Client::connect(loopback.address).await.unwrap();

    let reply = client
        .send(&json!({"mode": "flash", "r": "x", "g": 0, "b": 0, "wait": 5}))
        .await
        .unwrap();
    assert!(reply.starts_with("failure: "), "{reply}");
    assert!(reply.contains("`r`"), "{reply}");
    assert!(!Client::is_success(&reply));

    let reply = client
        .send(&json!({"mode": "blink", "r": 0, "g": 0, "b": 0}))
        .await
        .unwrap();
    assert_eq!(reply, "failure: unknown message mode `blink`");

    let reply = client.send(&json!({"r": 0, "g": 0})).await.unwrap();
    assert_eq!(reply, "failure: missing field `b`");

    let reply = client.send(&json!([1, 2, 3])).await.unwrap();
    assert_eq!(reply, "failure: message is not a JSON object");

    // Nothing has reached the rendering task.
    assert_eq!(loopback.sender().stats().rendered, 0);
    assert!(loopback.recorder.frames.lock().is_empty());

    // The connection is still usable after the failures.
    let reply = client
        .send(&json!({"mode": "setAll", "r": 1, "g": 1, "b": 1}))
        .await
        .unwrap();
    assert_eq!(reply, SUCCESS_REPLY);
}

#[tokio::test]
async fn test_multiple_clients() {
    let loopback = create_loopback().await;

    for color in [RGB8::new(10, 0, 0), RGB8::new(0, 10, 0)] {
        let mut client = Client::connect(loopback.address).await.unwrap();
        let reply = client
            .send(&json!({"mode": "setAll", "r": color.r, "g": color.g, "b": color.b}))
            .await
            .unwrap();
        assert_eq!(reply, SUCCESS_REPLY);
        loopback.wait_idle();
    }

    let frames = loopback.recorder.frames.lock().clone();
    assert_eq!(frames.len(), 2);
    assert!(is_filled(&frames[1], RGB8::new(0, 10, 0)));
}

#[tokio::test]
async fn test_invalid_utf8_keeps_connection() {
    let loopback = create_loopback().await;
    let (reader, mut writer) = TcpStream::connect(loopback.address)
        .await
        .unwrap()
        .into_split();
    let mut replies = BufReader::new(reader).lines();

    writer.write_all(b"{\"mode\": \"\xff\"}\n").await.unwrap();
    let reply = replies.next_line().await.unwrap().unwrap();
    assert_eq!(reply, "failure: message is not valid UTF-8");

    writer
        .write_all(b"{\"mode\": \"setAll\", \"r\": 1, \"g\": 2, \"b\": 3}\n")
        .await
        .unwrap();
    let reply = replies.next_line().await.unwrap().unwrap();
    assert_eq!(reply, SUCCESS_REPLY);
}

#[tokio::test]
async fn test_overlong_message_closes_connection() {
    let loopback = create_loopback().await;
    let (reader, mut writer) = TcpStream::connect(loopback.address)
        .await
        .unwrap()
        .into_split();
    let mut replies = BufReader::new(reader).lines();

    let message = vec![b' '; MAX_MESSAGE_LEN + 1];
    writer.write_all(&message).await.unwrap();

    let reply = replies.next_line().await.unwrap().unwrap();
    assert!(reply.starts_with("failure: message is longer"), "{reply}");
    assert_eq!(replies.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_request_without_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let message = json!({"mode": "setAll", "r": 0, "g": 0, "b": 0});
    let result = Client::request(address, &message, Duration::from_secs(5)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_request_timeout_covers_reply() {
    // Accepts connections but never replies.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let _silent = tokio::spawn(async move {
        let mut streams = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            streams.push(stream);
        }
    });

    let message = json!({"mode": "setAll", "r": 0, "g": 0, "b": 0});
    let result = Client::request(address, &message, Duration::from_millis(100)).await;
    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("No reply from"), "{err}");
}

#[tokio::test]
async fn test_request_reply() {
    let loopback = create_loopback().await;

    let message = json!({"mode": "setAll", "r": 0, "g": 0, "b": 0});
    let reply = Client::request(loopback.address, &message, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(Client::is_success(&reply));
    loopback.wait_idle();
}

#[test]
fn test_handle_malformed_json() {
    let (render, _recorder) = spawn_loop(RecordingDelay::default());
    let sender = render.sender();

    let reply = handle_message(&sender, "{\"mode\": ");
    assert!(reply.starts_with("failure: "), "{reply}");

    let reply = handle_message(&sender, r#"{"mode":"wipe","r":255,"g":0,"b":0,"wait":10}"#);
    assert_eq!(reply, SUCCESS_REPLY);
    assert!(sender.wait_idle(Duration::from_secs(5)));

    render.stop().unwrap();
    let reply = handle_message(&sender, r#"{"mode":"setAll","r":0,"g":0,"b":0}"#);
    assert_eq!(reply, "failure: rendering task is stopped");
}
