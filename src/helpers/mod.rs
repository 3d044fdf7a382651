// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Helper utilities shared by the request and response sides of a dump.
//!
//! This module groups small HTTP-level helpers: the status/body rule,
//! Content-Type recognition, header map conversion and form decoding.

pub mod form;
pub mod headers;
pub mod media_type;
pub mod status;
