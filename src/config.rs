// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023
// - Volker Schwaberow <volker@schwaberow.de>

use crate::client::{Client, DEFAULT_TIMEOUT};
use crate::error::TargetResult;
use crate::proxy::Proxy;
use crate::template::{TemplateNormalizer, Verbatim};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConfigParameter {
    timeout: Duration,
    recalculate_content_length: bool,
    normalize: bool,
    use_tls: bool,
    proxy: Option<String>,
    debug: bool,
}

impl Default for ConfigParameter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParameter {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            recalculate_content_length: true,
            normalize: true,
            use_tls: true,
            proxy: None,
            debug: false,
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_recalculate_content_length(&mut self, recalculate: bool) {
        self.recalculate_content_length = recalculate;
    }

    pub fn recalculate_content_length(&self) -> bool {
        self.recalculate_content_length
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn set_use_tls(&mut self, use_tls: bool) {
        self.use_tls = use_tls;
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn set_proxy(&mut self, proxy: Option<String>) {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Builds the transaction engine. Fails only on an unparsable proxy.
    pub fn build_client(&self) -> TargetResult<Client> {
        let client = if self.normalize {
            Client::new(self.timeout, TemplateNormalizer)
        } else {
            Client::new(self.timeout, Verbatim)
        };

        match &self.proxy {
            Some(proxy) => Ok(client.with_proxy(Proxy::parse(proxy)?)),
            None => Ok(client),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
