//! Command client.

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

use crate::SUCCESS_REPLY;

/// Ringlight command client.
pub struct Client {
    replies: Lines<BufReader<OwnedReadHalf>>,
    requests: OwnedWriteHalf,
}

impl Client {
    /// Establish connection with the given controller.
    pub async fn connect(address: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .with_context(|| format!("Unable to connect to {address}"))?;
        let (reader, requests) = stream.into_split();
        Ok(Self {
            replies: BufReader::new(reader).lines(),
            requests,
        })
    }

    /// Sends a command and returns the controller reply.
    pub async fn send(&mut self, message: &Value) -> anyhow::Result<String> {
        let mut request = serde_json::to_string(message)?;
        log::debug!("Sending message: {request}");
        request.push('\n');
        self.requests.write_all(request.as_bytes()).await?;

        self.replies
            .next_line()
            .await?
            .context("Connection closed before the reply")
    }

    /// Connects to the controller, sends a single command and waits for its reply.
    ///
    /// The timeout covers both the connection and the reply.
    pub async fn request(
        address: SocketAddr,
        message: &Value,
        timeout: Duration,
    ) -> anyhow::Result<String> {
        let exchange = async {
            let mut client = Self::connect(address).await?;
            client.send(message).await
        };
        tokio::time::timeout(timeout, exchange)
            .await
            .with_context(|| format!("No reply from {address} within {timeout:?}"))?
    }

    /// Returns true if the reply reports an accepted command.
    pub fn is_success(reply: &str) -> bool {
        reply == SUCCESS_REPLY
    }
}
