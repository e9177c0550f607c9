// File: template.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

//! Turns a hand-written request template into wire bytes.
//!
//! The template language is plain text substitution over the whole buffer.
//! There is no escaping: a placeholder that appears inside a body is
//! rewritten like any other occurrence.

use memchr::memmem;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

pub const CLEN_TOKEN: &[u8] = b"||CLEN||";
pub const CR_TOKEN: &[u8] = b"||CR||";
pub const LF_TOKEN: &[u8] = b"||LF||";

const CRLF: &[u8] = b"\r\n";
const LF: &[u8] = b"\n";
const SEPARATOR: &[u8] = b"\r\n\r\n";

static CONTENT_LENGTH_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Content-Length:\s*\d+").unwrap());

/// Pre-send hook applied by the client to every request buffer.
pub trait RequestTransform: Send + Sync {
    fn transform(&self, raw: Vec<u8>) -> Vec<u8>;
}

impl<F> RequestTransform for F
where
    F: Fn(Vec<u8>) -> Vec<u8> + Send + Sync,
{
    fn transform(&self, raw: Vec<u8>) -> Vec<u8> {
        self(raw)
    }
}

/// The default dialect: CRLF line endings plus `||CR||`, `||LF||` and
/// `||CLEN||` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNormalizer;

impl RequestTransform for TemplateNormalizer {
    fn transform(&self, raw: Vec<u8>) -> Vec<u8> {
        normalize(raw)
    }
}

/// Sends the buffer exactly as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl RequestTransform for Verbatim {
    fn transform(&self, raw: Vec<u8>) -> Vec<u8> {
        raw
    }
}

/// Canonicalises line endings and expands placeholders. Never fails;
/// malformed input goes out malformed.
pub fn normalize(raw: Vec<u8>) -> Vec<u8> {
    let raw = replace_all(&raw, CRLF, LF);
    let raw = replace_all(&raw, LF, CRLF);
    let raw = replace_all(&raw, CR_TOKEN, b"\r");
    let raw = replace_all(&raw, LF_TOKEN, b"\n");

    if contains(&raw, CLEN_TOKEN) {
        resolve_content_length(raw)
    } else {
        raw
    }
}

/// Replaces every `||CLEN||` with the byte length of the body, i.e. of
/// everything after the first blank line of the trimmed buffer. Without a
/// blank line the length is 0.
pub fn resolve_content_length(raw: Vec<u8>) -> Vec<u8> {
    let length = body_length(&raw);
    replace_all(&raw, CLEN_TOKEN, length.to_string().as_bytes())
}

/// Byte length of the body as `resolve_content_length` computes it.
pub fn body_length(raw: &[u8]) -> usize {
    let trimmed = trim_whitespace(raw);
    match find(trimmed, SEPARATOR) {
        Some(pos) => trimmed.len() - pos - SEPARATOR.len(),
        None => 0,
    }
}

/// Turns every literal `Content-Length: <digits>` into a `||CLEN||`
/// placeholder so the value is recomputed at send time.
pub fn rewrite_content_length(raw: &[u8]) -> Vec<u8> {
    CONTENT_LENGTH_HEADER
        .replace_all(raw, &b"Content-Length: ||CLEN||"[..])
        .into_owned()
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    memmem::find(haystack, needle)
}

pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

pub(crate) fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return haystack.to_vec();
    }
    let finder = memmem::Finder::new(from);
    let mut out = Vec::with_capacity(haystack.len());
    let mut last = 0;
    for pos in finder.find_iter(haystack) {
        out.extend_from_slice(&haystack[last..pos]);
        out.extend_from_slice(to);
        last = pos + from.len();
    }
    out.extend_from_slice(&haystack[last..]);
    out
}

pub(crate) fn trim_whitespace(data: &[u8]) -> &[u8] {
    let is_space = |b: &u8| matches!(*b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c');
    let start = data.iter().position(|b| !is_space(b)).unwrap_or(data.len());
    let end = data.iter().rposition(|b| !is_space(b)).map_or(start, |p| p + 1);
    &data[start..end]
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
