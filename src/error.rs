// File: error.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::fmt;
use std::io;

/// Failures of a single raw transaction. None of them are retried.
#[derive(Debug)]
pub enum ClientError {
    /// DNS, TCP connect, connect timeout or TLS handshake.
    Connect(io::Error),
    /// Writing the prepared request after a successful connect.
    Write(io::Error),
    /// Any read failure other than a clean close, including idle timeout.
    /// Bytes read before the failure stay in the `Response`.
    Read(io::Error),
    /// The proxy refused or mangled the CONNECT tunnel.
    Proxy(String),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Connect(e) | Self::Write(e) | Self::Read(e) => {
                e.kind() == io::ErrorKind::TimedOut
            }
            Self::Proxy(_) => false,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "Connect error: {}", e),
            Self::Write(e) => write!(f, "Write error: {}", e),
            Self::Read(e) => write!(f, "Read error: {}", e),
            Self::Proxy(msg) => write!(f, "Proxy error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            Self::Write(e) => Some(e),
            Self::Read(e) => Some(e),
            Self::Proxy(_) => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// No marker line and no `Host:` header.
    Missing,
    InvalidFormat(String),
    InvalidAddress(String),
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(
                f,
                "Target line and Host header missing, cannot determine the target"
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid input format: {}", msg),
            Self::InvalidAddress(addr) => write!(f, "Invalid target address: {}", addr),
        }
    }
}

impl std::error::Error for TargetError {}

impl From<url::ParseError> for TargetError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidAddress(error.to_string())
    }
}

pub type TargetResult<T> = Result<T, TargetError>;
