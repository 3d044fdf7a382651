// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Request/response dump middleware for hyper services.
//!
//! Wrap any hyper service with [`Dump`] to get a deterministic, redaction
//! aware text rendering of every exchange: headers, JSON bodies and
//! URL-encoded forms, with object keys always sorted. The text goes to a
//! callback or to standard output once the response has been fully sent.
//!
//! ```rust,no_run
//! use http_dump::{Dump, DumpOption};
//!
//! let dump = Dump::with_options([
//!     DumpOption::ShowRaw(true),
//!     DumpOption::callback(|text| eprintln!("{text}")),
//! ]);
//! # let _ = dump;
//! ```

pub mod body;
pub mod capture;
pub mod config;
pub mod dump;
pub mod error;
pub mod format;
pub mod helpers;
pub mod options;
pub mod redact;
pub mod server;

#[cfg(test)]
pub mod test_helpers;

pub use body::{Replay, RequestBody};
pub use capture::{Capture, CaptureBody};
pub use dump::{Dump, DumpService};
pub use error::DumpError;
pub use format::{format_json_bytes, format_serializable, format_value, Layout};
pub use options::{DumpOption, DumpOptions, Sink};
pub use redact::{redact, RedactionSet};

/// The decoded value tree the formatter and redactor operate on.
pub type DecodedValue = serde_json::Value;
