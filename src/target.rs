// File: target.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::error::{TargetError, TargetResult};
use crate::request::Request;
use crate::template::{contains, trim_whitespace};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use url::{Host, Url};

pub const TARGET_MARKER: u8 = b'#';

static HOST_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mi)^host:\s*(.*)$").unwrap());

/// A template split into where it goes and what gets sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub target: String,
    pub request: Vec<u8>,
}

/// Resolves the target of a raw template.
///
/// A leading `#` line names the target explicitly; otherwise the first
/// `Host:` header is used.
pub fn parse_input(data: &[u8]) -> TargetResult<ParsedInput> {
    if data.first() == Some(&TARGET_MARKER) {
        return parse_with_target(data);
    }

    let target = host_header(data).ok_or(TargetError::Missing)?;
    debug!("Target inferred from Host header: {}", target);

    Ok(ParsedInput {
        target,
        request: replace_last_cr(data.to_vec()),
    })
}

/// Parses the `# <target>` form. The body gets a blank line appended when it
/// has none so header-only templates still end the header block.
pub fn parse_with_target(data: &[u8]) -> TargetResult<ParsedInput> {
    let newline = data.iter().position(|&b| b == b'\n').ok_or_else(|| {
        TargetError::InvalidFormat("could not find request after target line".to_string())
    })?;

    let (line, rest) = (&data[..newline], &data[newline + 1..]);
    let line = line.strip_prefix(&[TARGET_MARKER]).unwrap_or(line);
    let target = String::from_utf8_lossy(trim_whitespace(line)).into_owned();
    if target.is_empty() {
        return Err(TargetError::InvalidFormat("empty target line".to_string()));
    }
    debug!("Target taken from marker line: {}", target);

    let mut request = rest.to_vec();
    if !contains(&request, b"\n\n") && !contains(&request, b"\r\n\r\n") {
        trace!("Request has no header terminator, appending one");
        request = trim_whitespace(&request).to_vec();
        request.extend_from_slice(b"\n\n");
    }

    Ok(ParsedInput {
        target,
        request: replace_last_cr(request),
    })
}

/// Value of the first `Host:` header, trimmed. `None` when absent or empty.
pub fn host_header(data: &[u8]) -> Option<String> {
    let captures = HOST_HEADER.captures(data)?;
    let value = String::from_utf8_lossy(captures.get(1)?.as_bytes())
        .trim()
        .to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// A lone trailing CR would otherwise survive normalisation as a bare CR.
pub(crate) fn replace_last_cr(mut data: Vec<u8>) -> Vec<u8> {
    if let Some(last) = data.last_mut() {
        if *last == b'\r' {
            *last = b'\n';
        }
    }
    data
}

/// Where a transaction connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    address: String,
    host: String,
    use_tls: bool,
}

impl Target {
    /// Accepts `https://host[:port][/..]`, `http://host[:port][/..]` or a bare
    /// `host[:port]`. Bare targets use `default_tls` to pick TLS and the
    /// default port.
    pub fn parse(target: &str, default_tls: bool) -> TargetResult<Self> {
        let target = target.trim();
        if target.is_empty() || target.len() > 2048 {
            return Err(TargetError::InvalidAddress(target.to_string()));
        }

        let url = if target.contains("://") {
            Url::parse(target)?
        } else {
            let scheme = if default_tls { "https" } else { "http" };
            Url::parse(&format!("{}://{}", scheme, target))?
        };

        let use_tls = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(TargetError::InvalidAddress(format!(
                    "unsupported scheme {}",
                    other
                )))
            }
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(TargetError::InvalidAddress(target.to_string())),
        };
        let port = url
            .port_or_known_default()
            .unwrap_or(if use_tls { 443 } else { 80 });
        let host_for_address = url
            .host_str()
            .ok_or_else(|| TargetError::InvalidAddress(target.to_string()))?;

        Ok(Target {
            address: format!("{}:{}", host_for_address, port),
            host,
            use_tls,
        })
    }

    /// `host:port`, with IPv6 literals in brackets.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Host without port or brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn request(&self, raw: Vec<u8>) -> Request {
        Request::new_with_all(raw, self.address.clone(), self.use_tls)
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
