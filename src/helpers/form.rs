// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Strict `application/x-www-form-urlencoded` decoding.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::error::DumpError;

/// Decode a form body into `key -> values`, keeping value order per key.
///
/// Malformed percent escapes and `;` separators are rejected instead of being
/// decoded leniently.
pub fn parse_form(input: &str) -> Result<BTreeMap<String, Vec<String>>, DumpError> {
    let mut form: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for pair in input.split('&').filter(|p| !p.is_empty()) {
        if pair.contains(';') {
            return Err(DumpError::Form("invalid semicolon separator in query".into()));
        }
        check_escapes(pair)?;

        for (key, value) in form_urlencoded::parse(pair.as_bytes()) {
            form.entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    Ok(form)
}

fn check_escapes(s: &str) -> Result<(), DumpError> {
    let bytes = s.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1..i + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
            _ => {
                let end = (i + 3).min(bytes.len());
                return Err(DumpError::Form(format!(
                    "invalid URL escape \"{}\"",
                    String::from_utf8_lossy(&bytes[i..end])
                )));
            }
        }
    }
    Ok(())
}
