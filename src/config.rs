// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Configuration loading.
//!
//! TOML format, every key optional:
//!
//! ```toml
//! [general]
//! listen = "127.0.0.1:3000"
//!
//! [dump]
//! show_request = true
//! show_response = true
//! show_body = true
//! show_headers = true
//! show_cookies = false
//! show_raw = false
//! hidden_headers = ["authorization"]
//! hidden_body_fields = ["password"]
//!
//! [layout]
//! indent = 4
//! newline = "\n"
//! max_string_length = 0
//! ```

use serde::Deserialize;

use crate::format::Layout;
use crate::options::DumpOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Listen address, e.g. 127.0.0.1:3000
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// The `[dump]` table; mirrors the toggles of [`DumpOptions`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DumpSection {
    pub show_request: bool,
    pub show_response: bool,
    pub show_body: bool,
    pub show_headers: bool,
    pub show_cookies: bool,
    pub show_raw: bool,
    pub hidden_headers: Vec<String>,
    pub hidden_body_fields: Vec<String>,
}

impl Default for DumpSection {
    fn default() -> Self {
        let d = DumpOptions::default();
        Self {
            show_request: d.show_request,
            show_response: d.show_response,
            show_body: d.show_body,
            show_headers: d.show_headers,
            show_cookies: d.show_cookies,
            show_raw: d.show_raw,
            hidden_headers: d.hidden_headers,
            hidden_body_fields: d.hidden_body_fields,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub dump: DumpSection,
    pub layout: Layout,
}

impl Config {
    /// Load configuration from a TOML file.
    pub async fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let s = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Dump options described by this configuration, without a sink.
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            show_request: self.dump.show_request,
            show_response: self.dump.show_response,
            show_body: self.dump.show_body,
            show_headers: self.dump.show_headers,
            show_cookies: self.dump.show_cookies,
            show_raw: self.dump.show_raw,
            hidden_headers: self.dump.hidden_headers.clone(),
            hidden_body_fields: self.dump.hidden_body_fields.clone(),
            layout: self.layout.clone(),
            sink: None,
        }
    }
}
