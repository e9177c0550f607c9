// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_rustls::rustls::{Certificate, PrivateKey, ServerConfig};
use tokio_rustls::TlsAcceptor;

/// Accepts one connection, reads the request until the header block ends,
/// answers with `reply` and closes. Resolves to the bytes it received.
pub async fn spawn_reply_server(reply: &'static [u8]) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let received = read_head(&mut socket).await;
        let _ = socket.write_all(reply).await;
        let _ = socket.shutdown().await;
        let _ = tx.send(received);
    });

    (address, rx)
}

/// Accepts one connection, answers with `reply` and then goes silent
/// without closing for `stall`.
pub async fn spawn_stalling_server(reply: &'static [u8], stall: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _ = read_head(&mut socket).await;
        let _ = socket.write_all(reply).await;
        tokio::time::sleep(stall).await;
        drop(socket);
    });

    address
}

/// Like [`spawn_reply_server`], but behind TLS with a fresh self-signed
/// certificate for `localhost`.
pub async fn spawn_tls_reply_server(reply: &'static [u8]) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let acceptor = self_signed_acceptor();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut tls = match acceptor.accept(socket).await {
            Ok(tls) => tls,
            Err(_) => return,
        };
        let received = read_head(&mut tls).await;
        let _ = tls.write_all(reply).await;
        let _ = tls.shutdown().await;
        let _ = tx.send(received);
    });

    (address, rx)
}

/// An HTTP proxy that accepts one CONNECT, answers 200 and then relays
/// bytes to `upstream`. Resolves to the CONNECT head it received.
pub async fn spawn_tunnel_proxy(upstream: String) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let head = read_head(&mut socket).await;
        let _ = tx.send(head);
        let mut upstream = match TcpStream::connect(upstream).await {
            Ok(upstream) => upstream,
            Err(_) => return,
        };
        if socket
            .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
            .await
            .is_err()
        {
            return;
        }
        let _ = tokio::io::copy_bidirectional(&mut socket, &mut upstream).await;
    });

    (address, rx)
}

fn self_signed_acceptor() -> TlsAcceptor {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = cert.serialize_der().unwrap();
    let key_der = cert.serialize_private_key_der();

    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(vec![Certificate(cert_der)], PrivateKey(key_der))
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

async fn read_head<S: AsyncRead + Unpin>(socket: &mut S) -> Vec<u8> {
    let mut received = Vec::new();
    let mut chunk = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => received.extend_from_slice(&chunk[..n]),
        }
    }
    received
}

pub fn sample_template(host: &str) -> String {
    format!("GET / HTTP/1.1\nHost: {}\n\n", host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_template() {
        assert_eq!(sample_template("a"), "GET / HTTP/1.1\nHost: a\n\n");
    }
}
