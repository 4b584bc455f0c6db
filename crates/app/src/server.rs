//! Request/reply command server.
//!
//! Each request is a single line with a JSON object, each reply is a single line of text:
//! either the success token or a failure description.

use std::{future::Future, net::SocketAddr};

use anyhow::Context;
use ringlight_core::validate;
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

use crate::{ActionSender, FAILURE_REPLY, SUCCESS_REPLY};

/// Longest accepted request line in bytes, not counting the line terminator.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024;

/// Validates a raw command and passes it to the rendering task.
///
/// Returns the reply for the caller, it reports that the command has been accepted, not that
/// the animation has been rendered.
pub fn handle_message(sender: &ActionSender, message: &str) -> String {
    let record = match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(record)) => record,
        Ok(_) => return failure("message is not a JSON object"),
        Err(err) => return failure(err),
    };
    log::info!("Received: {record:?}");

    let action = match validate(&record) {
        Ok(action) => action,
        Err(err) => {
            log::warn!("Rejected message: {err}");
            return failure(err);
        }
    };

    match sender.submit(action) {
        Ok(()) => SUCCESS_REPLY.to_owned(),
        Err(err) => failure(err),
    }
}

fn failure(reason: impl std::fmt::Display) -> String {
    format!("{FAILURE_REPLY}: {reason}")
}

/// Command server accepting client connections.
pub struct CommandServer {
    listener: TcpListener,
    sender: ActionSender,
}

impl CommandServer {
    /// Binds a new server to the given address.
    pub async fn bind(address: SocketAddr, sender: ActionSender) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("Unable to bind command server to {address}"))?;
        log::info!("Bound listener on the {}", listener.local_addr()?);
        Ok(Self { listener, sender })
    }

    /// Returns the local address this server is bound to.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves client connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serves client connections until the shutdown future completes.
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Command server is shutting down");
                    return Ok(());
                }
                incoming = self.listener.accept() => {
                    let (stream, address) = incoming.context("Unable to accept a connection")?;
                    log::info!("Accepted an incoming connection from the {address}");

                    let sender = self.sender.clone();
                    tokio::spawn(async move {
                        if let Err(err) = handle_client(stream, &sender).await {
                            log::warn!("Connection with {address} failed: {err}");
                        }
                        log::info!("Closed connection with {address}");
                    });
                }
            }
        }
    }
}

/// Replies to every request line of the connection.
///
/// Malformed lines get a failure reply and the connection goes on. An overlong line is
/// answered with a failure too, but then the connection is closed since the next message
/// boundary is unknown.
async fn handle_client(stream: TcpStream, sender: &ActionSender) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_MESSAGE_LEN as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(());
        }

        let overlong = line.len() > MAX_MESSAGE_LEN && line.last() != Some(&b'\n');
        let mut reply = if overlong {
            log::warn!("Rejected message longer than {MAX_MESSAGE_LEN} bytes");
            failure(format!("message is longer than {MAX_MESSAGE_LEN} bytes"))
        } else {
            match std::str::from_utf8(&line).map(str::trim) {
                Ok("") => continue,
                Ok(message) => handle_message(sender, message),
                Err(_) => failure("message is not valid UTF-8"),
            }
        };

        reply.push('\n');
        writer.write_all(reply.as_bytes()).await?;
        if overlong {
            return Ok(());
        }
    }
}
