// File: request.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

/// A raw request as handed to the transaction engine.
///
/// `raw` is rewritten in place by the client's pre-send transform, so the
/// bytes after a transaction are the bytes that went on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    raw: Vec<u8>,
    address: String,
    use_tls: bool,
}

impl Request {
    pub fn new() -> Self {
        Request {
            raw: Vec::new(),
            address: String::new(),
            use_tls: false,
        }
    }

    pub fn new_with_all(raw: Vec<u8>, address: String, use_tls: bool) -> Self {
        Request {
            raw,
            address,
            use_tls,
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn set_raw(&mut self, raw: Vec<u8>) {
        self.raw = raw;
    }

    pub fn set_address(&mut self, address: String) {
        self.address = address;
    }

    pub fn set_use_tls(&mut self, use_tls: bool) {
        self.use_tls = use_tls;
    }

    pub(crate) fn take_raw(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.raw)
    }
}

/// Append-only accumulator for the bytes a peer sent back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    raw: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Response { raw: Vec::new() }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Clears the accumulator so the response can back another transaction.
    pub fn reset(&mut self) {
        self.raw.clear();
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.raw
    }
}
