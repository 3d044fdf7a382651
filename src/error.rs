// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Error types for the dump pipeline.
//!
//! None of these ever reach the HTTP exchange: the orchestrator renders each
//! one as an inline diagnostic line inside the dump text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DumpError {
    /// Malformed JSON payload.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// A value could not be turned into a decoded tree.
    #[error("serialize: {0}")]
    Serialize(String),

    /// Malformed URL-encoded form payload.
    #[error("{0}")]
    Form(String),

    /// Content-Type header that does not hold a media type.
    #[error("mime: {0}")]
    MediaType(String),

    /// Body stream failed while being drained.
    #[error("{0}")]
    Read(String),
}

impl DumpError {
    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::Read(err.to_string())
    }
}
