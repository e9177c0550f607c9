// File: proxy.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{ClientError, ClientResult, TargetError, TargetResult};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use url::Url;

const MAX_TUNNEL_REPLY: usize = 8192;

/// An HTTP proxy that raw requests are forwarded through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    address: String,
}

impl Proxy {
    /// Accepts `http://host[:port]` or a bare `host:port`.
    pub fn parse(proxy: &str) -> TargetResult<Self> {
        let proxy = proxy.trim();
        if proxy.is_empty() {
            return Err(TargetError::InvalidAddress("empty proxy".to_string()));
        }

        let url = if proxy.contains("://") {
            Url::parse(proxy)?
        } else {
            Url::parse(&format!("http://{}", proxy))?
        };
        if url.scheme() != "http" {
            return Err(TargetError::InvalidAddress(format!(
                "unsupported proxy scheme {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| TargetError::InvalidAddress(proxy.to_string()))?;
        let port = url.port_or_known_default().unwrap_or(80);

        Ok(Proxy {
            address: format!("{}:{}", host, port),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Asks the proxy to open a tunnel to `target` and waits for a 2xx reply.
///
/// The reply is read byte by byte so nothing past the header block is
/// taken off the stream before the TLS handshake starts.
pub(crate) async fn connect_tunnel<S>(
    stream: &mut S,
    target: &str,
    timeout: Duration,
) -> ClientResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = format!(
        "CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n\r\n",
        target = target
    );
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(ClientError::Connect)?;

    let reply = match tokio::time::timeout(timeout, read_reply_head(stream)).await {
        Ok(reply) => reply?,
        Err(_) => {
            return Err(ClientError::Connect(io::Error::new(
                io::ErrorKind::TimedOut,
                "proxy did not answer CONNECT in time",
            )))
        }
    };

    let status_line = reply.lines().next().unwrap_or_default().to_string();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok());

    match status {
        Some(code) if (200..300).contains(&code) => Ok(()),
        _ => Err(ClientError::Proxy(format!(
            "CONNECT to {} refused: {}",
            target, status_line
        ))),
    }
}

async fn read_reply_head<S>(stream: &mut S) -> ClientResult<String>
where
    S: AsyncRead + Unpin,
{
    let mut head = Vec::new();
    while !head.ends_with(b"\r\n\r\n") && !head.ends_with(b"\n\n") {
        if head.len() >= MAX_TUNNEL_REPLY {
            return Err(ClientError::Proxy("CONNECT reply too large".to_string()));
        }
        match stream.read_u8().await {
            Ok(byte) => head.push(byte),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ClientError::Proxy(
                    "proxy closed the connection during CONNECT".to_string(),
                ))
            }
            Err(e) => return Err(ClientError::Connect(e)),
        }
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}
