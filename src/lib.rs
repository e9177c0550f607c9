// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::bool_assert_comparison)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod proxy;
pub mod request;
pub mod target;
pub mod template;

pub use client::Client;
pub use error::{ClientError, TargetError};
pub use request::{Request, Response};
pub use template::{RequestTransform, TemplateNormalizer, Verbatim};
