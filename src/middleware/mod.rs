// SPDX-License-Identifier: MIT

//! Middleware: session extraction and security headers.

pub mod auth;
pub mod security;
