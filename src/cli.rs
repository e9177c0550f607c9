// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ConfigParameter;
use crate::error::{ClientError, TargetError};
use crate::request::{Request, Response};
use crate::target::{parse_input, replace_last_cr, ParsedInput, Target};
use crate::template::rewrite_content_length;
use clap::Parser;
use colored::*;
use log::{debug, info, warn};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug, Clone)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[arg(
        short = 'i',
        long = "input",
        help = "Request template file (reads stdin until EOF when omitted)"
    )]
    pub input_file: Option<PathBuf>,

    #[arg(
        long = "target",
        help = "Target overriding the template's marker line or Host header"
    )]
    pub target: Option<String>,

    #[arg(
        short = 't',
        long = "timeout",
        default_value_t = 10,
        help = "Connect and idle read timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(short = 'x', long = "proxy", help = "HTTP proxy, e.g. http://127.0.0.1:8080")]
    pub proxy: Option<String>,

    #[arg(
        long = "no-cl",
        help = "Keep Content-Length values as written instead of recalculating"
    )]
    pub no_content_length: bool,

    #[arg(
        long = "verbatim",
        help = "Send the template bytes without normalization or placeholders"
    )]
    pub verbatim: bool,

    #[arg(long = "no-tls", help = "Use plaintext for targets without a scheme")]
    pub no_tls: bool,

    #[arg(
        short = 'd',
        long = "debug",
        help = "Print the parsed template and the bytes sent"
    )]
    pub debug: bool,

    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,

    #[arg(long = "no-color", help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    pub fn config(&self) -> ConfigParameter {
        let mut config = ConfigParameter::new();
        config.set_timeout(Duration::from_secs(self.timeout));
        config.set_recalculate_content_length(!self.no_content_length);
        config.set_normalize(!self.verbatim);
        config.set_use_tls(!self.no_tls);
        config.set_proxy(self.proxy.clone());
        config.set_debug(self.debug);
        config
    }

    pub fn read_input(&self) -> std::io::Result<Vec<u8>> {
        match &self.input_file {
            Some(path) => {
                info!("Reading template from {}", path.display());
                std::fs::read(path)
            }
            None => {
                let mut data = Vec::new();
                std::io::stdin().lock().read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }
}

/// Resolves the target and applies the front-end rewrites to a template.
///
/// An explicit `target_override` always wins; a template whose own target
/// cannot be resolved is then sent as a whole. Content-Length headers are
/// only rewritten when the normalizer runs, since `||CLEN||` is never
/// expanded otherwise.
pub fn build_request(
    config: &ConfigParameter,
    data: &[u8],
    target_override: Option<&str>,
) -> Result<Request, TargetError> {
    let ParsedInput { target, request } = match (target_override, parse_input(data)) {
        (Some(target), Ok(parsed)) => ParsedInput {
            target: target.to_string(),
            request: parsed.request,
        },
        (Some(target), Err(e)) => {
            debug!("Ignoring template target ({}), using {}", e, target);
            ParsedInput {
                target: target.to_string(),
                request: replace_last_cr(data.to_vec()),
            }
        }
        (None, parsed) => parsed?,
    };

    let request = if config.normalize() && config.recalculate_content_length() {
        rewrite_content_length(&request)
    } else {
        request
    };

    let target = Target::parse(&target, config.use_tls())?;
    debug!(
        "Resolved target {} for host {} ({})",
        target.address(),
        target.host(),
        if target.use_tls() { "tls" } else { "plain" }
    );
    Ok(target.request(request))
}

/// Runs one transaction for `data` and writes the raw response to `out`.
///
/// A partial response is written even when the transaction fails.
pub async fn execute<W: Write>(
    cli: &Cli,
    data: &[u8],
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = cli.config();
    if config.debug() {
        eprintln!("{} {:?}", "Data:".cyan(), String::from_utf8_lossy(data));
    }

    let mut req = build_request(&config, data, cli.target.as_deref())?;
    let client = config.build_client()?;
    let mut resp = Response::new();

    info!("Sending {} bytes to {}", req.raw().len(), req.address());
    let start = Instant::now();
    let result = client.do_request(&mut req, &mut resp).await;
    debug!(
        "Transaction finished after {}ms with {} response bytes",
        start.elapsed().as_millis(),
        resp.len()
    );

    if config.debug() {
        eprintln!("{} {:?}", "Sent:".cyan(), String::from_utf8_lossy(req.raw()));
    }

    out.write_all(resp.raw())?;
    out.write_all(b"\n")?;
    out.flush()?;

    match result {
        Ok(()) => Ok(()),
        Err(e @ ClientError::Read(_)) => {
            warn!("Response may be incomplete: {}", e);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
