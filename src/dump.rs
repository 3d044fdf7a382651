// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! The dump middleware.
//!
//! [`Dump`] holds the immutable configuration and wraps an inner hyper
//! service into a [`DumpService`]. Per request the service:
//!
//! 1. renders the request headers and, when a body is declared, drains it,
//!    hands the downstream service a fresh body over the same bytes and
//!    renders it according to its Content-Type;
//! 2. calls the inner service exactly once;
//! 3. renders the response headers and wraps the response body in a
//!    [`CaptureBody`];
//! 4. once the body has been fully sent, renders the captured bytes and
//!    passes the whole text to the sink.
//!
//! Every step either appends its section or an inline diagnostic line, then
//! falls through to the next one. Nothing here can fail the exchange itself.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use hyper::body::Body;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::service::Service;
use hyper::{HeaderMap, Method, Request, Response};
use tracing::{debug, warn};

use crate::body::{read_body, RequestBody};
use crate::capture::{Capture, CaptureBody};
use crate::error::DumpError;
use crate::format::{format_json_bytes, format_serializable, Layout};
use crate::helpers::form::parse_form;
use crate::helpers::headers::{get_header_str, header_map_to_value};
use crate::helpers::media_type::{parse_media_type, BodyKind};
use crate::helpers::status::body_allowed_for_status;
use crate::options::{stdout_sink, DumpOption, DumpOptions, Sink};
use crate::redact::RedactionSet;

/// Note emitted when the response body was dropped before it was ever polled.
pub const WRITER_OVERRIDDEN_NOTE: &str =
    "\nresponse body writer was overridden, can not read captured body\n";

/// Resolved, read-only settings shared by every request of one middleware.
struct DumpConfig {
    options: DumpOptions,
    hidden_headers: RedactionSet,
    hidden_body: RedactionSet,
    sink: Sink,
}

impl DumpConfig {
    fn layout(&self) -> &Layout {
        &self.options.layout
    }
}

/// Request/response dump middleware.
#[derive(Clone)]
pub struct Dump {
    config: Arc<DumpConfig>,
}

impl Dump {
    /// Dump everything with the default options, printing to stdout.
    pub fn new() -> Self {
        Self::from_options(DumpOptions::default())
    }

    /// Default options, delivering each dump to `sink`.
    pub fn with_callback<F>(sink: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self::with_options([DumpOption::callback(sink)])
    }

    /// Default options adjusted by `options`, applied in order.
    pub fn with_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = DumpOption>,
    {
        let mut resolved = DumpOptions::default();
        for option in options {
            resolved.apply(option);
        }
        Self::from_options(resolved)
    }

    pub fn from_options(options: DumpOptions) -> Self {
        let hidden_headers = options.header_redactions();
        let hidden_body = options.body_redactions();
        let sink = options.sink.clone().unwrap_or_else(stdout_sink);
        Self {
            config: Arc::new(DumpConfig {
                options,
                hidden_headers,
                hidden_body,
                sink,
            }),
        }
    }

    pub fn options(&self) -> &DumpOptions {
        &self.config.options
    }

    /// Wrap `inner`; it will see every request after the dump has read it.
    pub fn layer<S>(&self, inner: S) -> DumpService<S> {
        DumpService {
            inner,
            dump: self.clone(),
        }
    }
}

impl Default for Dump {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dump")
            .field("options", &self.config.options)
            .finish()
    }
}

/// A hyper service that dumps traffic around `S`.
#[derive(Clone, Debug)]
pub struct DumpService<S> {
    inner: S,
    dump: Dump,
}

type DumpFuture<R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send>>;

impl<S, B, RB> Service<Request<B>> for DumpService<S>
where
    S: Service<Request<RequestBody<B>>, Response = Response<RB>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: fmt::Display + Send,
    RB: Body<Data = Bytes> + Send + 'static,
    RB::Error: fmt::Display,
{
    type Response = Response<CaptureBody<RB>>;
    type Error = S::Error;
    type Future = DumpFuture<Self::Response, Self::Error>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        let config = self.dump.config.clone();

        Box::pin(async move {
            let mut record = DumpRecord::new(&req, config.sink.clone());
            let is_head = req.method() == Method::HEAD;

            let req = dump_request(req, &config, &mut record).await;

            let pending = inner.call(req);
            match pending.await {
                Ok(response) => Ok(dump_response(response, is_head, config, record)),
                Err(e) => {
                    record.deliver();
                    Err(e)
                }
            }
        })
    }
}

/// Accumulated dump text for one request.
///
/// The text reaches the sink exactly once: on [`DumpRecord::deliver`], or on
/// drop when the request was abandoned half way.
struct DumpRecord {
    target: String,
    text: String,
    sink: Option<Sink>,
}

impl DumpRecord {
    fn new<B>(req: &Request<B>, sink: Sink) -> Self {
        Self {
            target: format!("{} {}", req.method(), req.uri()),
            text: String::new(),
            sink: Some(sink),
        }
    }

    fn push(&mut self, section: impl AsRef<str>) {
        self.text.push_str(section.as_ref());
    }

    fn deliver(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        if let Some(sink) = self.sink.take() {
            let text = std::mem::take(&mut self.text);
            debug!(target_request = %self.target, len = text.len(), "delivering dump");
            sink(text);
        }
    }
}

impl Drop for DumpRecord {
    fn drop(&mut self) {
        self.flush();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Request,
    Response,
}

impl Side {
    fn title(self) -> &'static str {
        match self {
            Side::Request => "Request",
            Side::Response => "Response",
        }
    }

    fn lower(self) -> &'static str {
        match self {
            Side::Request => "request",
            Side::Response => "response",
        }
    }
}

fn declared_length<B: Body>(req: &Request<B>) -> u64 {
    get_header_str(req.headers(), CONTENT_LENGTH.as_str())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .or_else(|| req.body().size_hint().exact())
        .unwrap_or(0)
}

fn dump_headers(side: Side, headers: &HeaderMap, config: &DumpConfig, record: &mut DumpRecord) {
    let rendered = format_serializable(
        &header_map_to_value(headers),
        &config.hidden_headers,
        true,
        config.layout(),
    );
    match rendered {
        Ok(s) => {
            if side == Side::Response {
                record.push("\n");
            }
            record.push(format!("{}-Header:\n", side.title()));
            record.push(s);
        }
        Err(e) => record.push(format!("\nparse {} header error: {}\n", side.lower(), e)),
    }
    record.push("\n");
}

async fn dump_request<B>(
    req: Request<B>,
    config: &DumpConfig,
    record: &mut DumpRecord,
) -> Request<RequestBody<B>>
where
    B: Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    let opts = &config.options;
    if !opts.show_request {
        return req.map(RequestBody::passthrough);
    }

    if opts.show_headers {
        dump_headers(Side::Request, req.headers(), config, record);
    }

    if !opts.show_body || declared_length(&req) == 0 {
        return req.map(RequestBody::passthrough);
    }

    let (parts, body) = req.into_parts();
    let replay = read_body(body).await;
    let bytes = replay.bytes().clone();
    let read_error = replay.error().map(DumpError::read);
    let req = Request::from_parts(parts, RequestBody::replay(replay));

    if let Some(e) = read_error {
        warn!(error = %e, "request body read failed, skipping body dump");
        record.push(format!("\nread request body err: {}\n", e));
        return req;
    }

    dump_body(Side::Request, req.headers(), &bytes, config, record);
    req
}

fn dump_body(
    side: Side,
    headers: &HeaderMap,
    bytes: &[u8],
    config: &DumpConfig,
    record: &mut DumpRecord,
) {
    let content_type = get_header_str(headers, CONTENT_TYPE.as_str()).unwrap_or("");
    let essence = match parse_media_type(content_type) {
        Ok(essence) => essence,
        Err(e) => {
            record.push(format!(
                "\ncontent-type: {}, parse err: {}\n",
                content_type, e
            ));
            return;
        }
    };

    let rendered = match (side, BodyKind::from_essence(&essence)) {
        (_, BodyKind::Json) => {
            push_raw(side, bytes, config, record);
            format_json_bytes(bytes, &config.hidden_body, false, config.layout())
        }
        (Side::Request, BodyKind::Form) => {
            push_raw(side, bytes, config, record);
            parse_form(&String::from_utf8_lossy(bytes)).and_then(|form| {
                format_serializable(&form, &config.hidden_body, true, config.layout())
            })
        }
        // multipart, html and everything else is not dumped
        _ => return,
    };

    match rendered {
        Ok(s) => record.push(format!("\n{}-Body:\n{}\n", side.title(), s)),
        Err(e) => record.push(format!("\nparse {} body err: {}\n", side.lower(), e)),
    }
}

fn push_raw(side: Side, bytes: &[u8], config: &DumpConfig, record: &mut DumpRecord) {
    if config.options.show_raw {
        record.push(format!(
            "\n{}-Body (raw):\n{}\n",
            side.title(),
            String::from_utf8_lossy(bytes)
        ));
    }
}

fn dump_response<RB>(
    response: Response<RB>,
    is_head: bool,
    config: Arc<DumpConfig>,
    mut record: DumpRecord,
) -> Response<CaptureBody<RB>>
where
    RB: Body<Data = Bytes> + Send + 'static,
{
    let opts = &config.options;
    if opts.show_response && opts.show_headers {
        dump_headers(Side::Response, response.headers(), &config, &mut record);
    }

    // HEAD responses never put their body on the wire.
    if !(opts.show_response && opts.show_body) || is_head {
        record.deliver();
        return response.map(CaptureBody::passthrough);
    }

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    response.map(move |body| {
        CaptureBody::new(body, move |capture| {
            finish_response(capture, status, &headers, &config, record)
        })
    })
}

fn finish_response(
    capture: Capture,
    status: u16,
    headers: &HeaderMap,
    config: &DumpConfig,
    mut record: DumpRecord,
) {
    // Checked first: bodies of 1xx/204/304 are discarded by the server, which
    // looks exactly like an overridden writer.
    if !body_allowed_for_status(status) {
        record.deliver();
        return;
    }

    match capture {
        Capture::Complete(bytes) => {
            if !bytes.is_empty() {
                dump_body(Side::Response, headers, &bytes, config, &mut record);
            }
        }
        Capture::Failed { error, .. } => {
            warn!(%error, "response body stream failed");
            record.push(format!("\nread response body err: {}\n", error));
        }
        Capture::Aborted(partial) => {
            warn!(sent = partial.len(), "response body aborted mid-stream");
            record.push(format!("\nresponse aborted after {} bytes\n", partial.len()));
        }
        Capture::Detached(_) => {
            warn!("response body dropped before it was polled");
            record.push(WRITER_OVERRIDDEN_NOTE);
        }
    }
    record.deliver();
}
