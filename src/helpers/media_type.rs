// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Content-Type recognition for dumped bodies.

use crate::error::DumpError;

pub const MIME_JSON: &str = "application/json";
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";
pub const MIME_MULTIPART_FORM: &str = "multipart/form-data";
pub const MIME_HTML: &str = "text/html";

/// The body encodings the dump knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    MultipartForm,
    Html,
    Other,
}

impl BodyKind {
    pub fn from_essence(essence: &str) -> Self {
        match essence {
            MIME_JSON => BodyKind::Json,
            MIME_FORM => BodyKind::Form,
            MIME_MULTIPART_FORM => BodyKind::MultipartForm,
            MIME_HTML => BodyKind::Html,
            _ => BodyKind::Other,
        }
    }
}

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

/// Extract the lowercase `type/subtype` from a Content-Type value.
///
/// Parameters after `;` are ignored. An empty value or a value that is not a
/// `token/token` pair is an error.
pub fn parse_media_type(value: &str) -> Result<String, DumpError> {
    let essence = value.split(';').next().unwrap_or("").trim();
    if essence.is_empty() {
        return Err(DumpError::MediaType("no media type".into()));
    }

    let (main, sub) = essence
        .split_once('/')
        .ok_or_else(|| DumpError::MediaType("expected slash after first token".into()))?;

    if !is_token(main) {
        return Err(DumpError::MediaType(format!("invalid type token '{}'", main)));
    }
    if !is_token(sub) {
        return Err(DumpError::MediaType("expected token after slash".into()));
    }

    Ok(essence.to_ascii_lowercase())
}
