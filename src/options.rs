// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Dump toggles, redaction lists and the output sink.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::format::Layout;
use crate::redact::RedactionSet;

/// Header names hidden when cookies are not shown.
pub const COOKIE_HEADERS: &[&str] = &["cookie", "set-cookie"];

/// Receives the finished dump text, once per request.
pub type Sink = Arc<dyn Fn(String) + Send + Sync>;

/// Sink used when no callback is configured: writes to standard output.
pub fn stdout_sink() -> Sink {
    Arc::new(|text: String| {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    })
}

#[derive(Clone)]
pub struct DumpOptions {
    pub show_request: bool,
    pub show_response: bool,
    pub show_body: bool,
    pub show_headers: bool,
    /// When false, `Cookie` and `Set-Cookie` are stripped from header dumps.
    pub show_cookies: bool,
    /// Also emit the body bytes as received, before the canonical rendering.
    pub show_raw: bool,
    /// Extra header names stripped from header dumps.
    pub hidden_headers: Vec<String>,
    /// Top-level body fields stripped from JSON and form dumps.
    pub hidden_body_fields: Vec<String>,
    pub layout: Layout,
    /// `None` prints to standard output.
    pub sink: Option<Sink>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            show_request: true,
            show_response: true,
            show_body: true,
            show_headers: true,
            show_cookies: false,
            show_raw: false,
            hidden_headers: Vec::new(),
            hidden_body_fields: Vec::new(),
            layout: Layout::default(),
            sink: None,
        }
    }
}

impl fmt::Debug for DumpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpOptions")
            .field("show_request", &self.show_request)
            .field("show_response", &self.show_response)
            .field("show_body", &self.show_body)
            .field("show_headers", &self.show_headers)
            .field("show_cookies", &self.show_cookies)
            .field("show_raw", &self.show_raw)
            .field("hidden_headers", &self.hidden_headers)
            .field("hidden_body_fields", &self.hidden_body_fields)
            .field("layout", &self.layout)
            .field("sink", &self.sink.as_ref().map(|_| "callback"))
            .finish()
    }
}

impl DumpOptions {
    pub fn apply(&mut self, option: DumpOption) {
        match option {
            DumpOption::ShowRequest(v) => self.show_request = v,
            DumpOption::ShowResponse(v) => self.show_response = v,
            DumpOption::ShowBody(v) => self.show_body = v,
            DumpOption::ShowHeaders(v) => self.show_headers = v,
            DumpOption::ShowCookies(v) => self.show_cookies = v,
            DumpOption::ShowRaw(v) => self.show_raw = v,
            DumpOption::HideHeaders(names) => self.hidden_headers.extend(names),
            DumpOption::HideBodyFields(names) => self.hidden_body_fields.extend(names),
            DumpOption::Layout(layout) => self.layout = layout,
            DumpOption::Callback(sink) => self.sink = Some(sink),
        }
    }

    /// Chainable form of [`DumpOptions::apply`].
    pub fn with(mut self, option: DumpOption) -> Self {
        self.apply(option);
        self
    }

    /// Names stripped from request and response header dumps.
    pub fn header_redactions(&self) -> RedactionSet {
        let mut set: RedactionSet = self.hidden_headers.iter().collect();
        if !self.show_cookies {
            set.extend(COOKIE_HEADERS);
        }
        set
    }

    /// Names stripped from top-level body objects.
    pub fn body_redactions(&self) -> RedactionSet {
        self.hidden_body_fields.iter().collect()
    }
}

/// One entry of the option list accepted by [`crate::dump::Dump::with_options`].
#[derive(Clone)]
pub enum DumpOption {
    ShowRequest(bool),
    ShowResponse(bool),
    ShowBody(bool),
    ShowHeaders(bool),
    ShowCookies(bool),
    ShowRaw(bool),
    HideHeaders(Vec<String>),
    HideBodyFields(Vec<String>),
    Layout(Layout),
    Callback(Sink),
}

impl DumpOption {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        DumpOption::Callback(Arc::new(f))
    }
}
