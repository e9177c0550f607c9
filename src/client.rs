// File: client.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

//! Raw transaction engine.
//!
//! One call to [`Client::do_request`] dials a fresh connection, writes the
//! transformed request bytes once and reads until the peer closes or stays
//! silent for longer than the idle timeout. The engine never logs; every
//! outcome is returned to the caller.

use crate::error::{ClientError, ClientResult};
use crate::proxy::{connect_tunnel, Proxy};
use crate::request::{Request, Response};
use crate::template::{RequestTransform, TemplateNormalizer};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, ClientConfig, ServerName};
use tokio_rustls::TlsConnector;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts any server certificate, including self-signed and expired ones.
struct NoCertificateVerification;

impl ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

fn insecure_tls_config() -> Arc<ClientConfig> {
    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
        .with_no_client_auth();
    Arc::new(config)
}

/// Engine configuration. Immutable once built and safe to share between
/// concurrent transactions.
#[derive(Clone)]
pub struct Client {
    timeout: Duration,
    transform: Arc<dyn RequestTransform>,
    proxy: Option<Proxy>,
    connector: TlsConnector,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, TemplateNormalizer)
    }
}

impl Client {
    /// `timeout` bounds the connect (TCP plus TLS handshake) and every
    /// single read; `transform` runs on the request bytes before sending.
    pub fn new<T>(timeout: Duration, transform: T) -> Self
    where
        T: RequestTransform + 'static,
    {
        Client {
            timeout,
            transform: Arc::new(transform),
            proxy: None,
            connector: TlsConnector::from(insecure_tls_config()),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, TemplateNormalizer)
    }

    /// Routes every transaction through `proxy`. Plain requests are written
    /// to the proxy as-is, TLS requests go through a CONNECT tunnel.
    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn new_request_response(&self) -> (Request, Response) {
        (Request::new(), Response::new())
    }

    /// Runs one transaction.
    ///
    /// The request bytes are replaced by their transformed form. Whatever
    /// the peer sent before a failure is left in `resp`; a clean close by
    /// the peer is success.
    pub async fn do_request(&self, req: &mut Request, resp: &mut Response) -> ClientResult<()> {
        let raw = req.take_raw();
        req.set_raw(self.transform.transform(raw));

        if req.address().is_empty() {
            return Err(ClientError::Connect(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty target address",
            )));
        }

        if req.use_tls() {
            self.do_https(req, resp).await
        } else {
            self.do_http(req, resp).await
        }
    }

    async fn do_http(&self, req: &Request, resp: &mut Response) -> ClientResult<()> {
        let dial_address = match &self.proxy {
            Some(proxy) => proxy.address(),
            None => req.address(),
        };
        let stream = self.dial(dial_address).await?;
        self.do_conn(stream, req, resp).await
    }

    async fn do_https(&self, req: &Request, resp: &mut Response) -> ClientResult<()> {
        let server_name = server_name(req.address())?;

        let stream = match &self.proxy {
            Some(proxy) => {
                let mut stream = self.dial(proxy.address()).await?;
                connect_tunnel(&mut stream, req.address(), self.timeout).await?;
                stream
            }
            None => self.dial(req.address()).await?,
        };

        let handshake = self.connector.connect(server_name, stream);
        let tls_stream = match tokio::time::timeout(self.timeout, handshake).await {
            Ok(Ok(tls_stream)) => tls_stream,
            Ok(Err(e)) => return Err(ClientError::Connect(e)),
            Err(_) => {
                return Err(ClientError::Connect(timed_out(
                    "TLS handshake",
                    self.timeout,
                )))
            }
        };

        self.do_conn(tls_stream, req, resp).await
    }

    async fn dial(&self, address: &str) -> ClientResult<TcpStream> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ClientError::Connect(e)),
            Err(_) => Err(ClientError::Connect(timed_out("connect", self.timeout))),
        }
    }

    /// Writes the request on an established connection and collects the
    /// response. The connection is consumed and closed on every return path.
    ///
    /// Reads are split on line feeds and each one gets a fresh idle deadline,
    /// so a slow but steady peer is never cut off. A response without any
    /// line feed completes only once the peer closes.
    pub async fn do_conn<S>(
        &self,
        mut conn: S,
        req: &Request,
        resp: &mut Response,
    ) -> ClientResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        conn.write_all(req.raw()).await.map_err(ClientError::Write)?;
        conn.flush().await.map_err(ClientError::Write)?;

        let mut reader = BufReader::new(conn);
        loop {
            let line = reader.read_until(b'\n', resp.buffer_mut());
            match tokio::time::timeout(self.timeout, line).await {
                Ok(Ok(0)) => return Ok(()),
                Ok(Ok(_)) => continue,
                // TLS peers that close without close_notify.
                Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                Ok(Err(e)) => return Err(ClientError::Read(e)),
                Err(_) => return Err(ClientError::Read(timed_out("read", self.timeout))),
            }
        }
    }
}

fn timed_out(phase: &str, timeout: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{} timed out after {}ms", phase, timeout.as_millis()),
    )
}

/// TLS server name for a `host:port` address.
fn server_name(address: &str) -> ClientResult<ServerName> {
    let host = match address.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => address,
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    ServerName::try_from(host).map_err(|e| {
        ClientError::Connect(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid TLS server name {}: {}", host, e),
        ))
    })
}


#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
