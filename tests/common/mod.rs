// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Frame};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};

use http_dump::RequestBody;

pub const MIME_JSON: &str = "application/json";
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// Sink that stores every delivered dump.
pub fn collecting_sink() -> (
    impl Fn(String) + Send + Sync + 'static,
    Arc<Mutex<Vec<String>>>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let store = seen.clone();
    (
        move |text: String| store.lock().expect("sink lock").push(text),
        seen,
    )
}

/// Take the single dump recorded by a collecting sink.
pub fn only_dump(seen: &Arc<Mutex<Vec<String>>>) -> String {
    let dumps = seen.lock().expect("sink lock");
    assert_eq!(dumps.len(), 1, "expected exactly one dump, got {:?}", *dumps);
    dumps[0].clone()
}

/// Build a request the way a browser-ish client would send it.
pub fn perform_request(
    method: &str,
    content_type: &str,
    path: &str,
    body: &str,
) -> anyhow::Result<Request<Full<Bytes>>> {
    Ok(Request::builder()
        .method(method)
        .uri(path)
        .header(CONTENT_TYPE, content_type)
        .header("content-length", body.len().to_string())
        .header(
            "accept-language",
            "zh-CN,zh;q=0.9,ja;q=0.8,en;q=0.7,en-GB;q=0.6,en-US;q=0.5",
        )
        .body(Full::new(Bytes::copy_from_slice(body.as_bytes())))?)
}

/// Drain the request, then answer with a fixed JSON document.
pub async fn json_handler<B>(
    req: Request<RequestBody<B>>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
{
    let _ = req.into_body().collect().await;
    Ok(json_response(StatusCode::OK, r#"{"ok":true,"data":"http-dump"}"#))
}

pub fn json_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, MIME_JSON.parse().expect("static header"));
    resp
}

/// A request body that yields one chunk and then fails.
pub struct FailingBody {
    sent: bool,
}

impl FailingBody {
    pub fn new() -> Self {
        Self { sent: false }
    }
}

impl Body for FailingBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if !self.sent {
            self.sent = true;
            return Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"{\"par")))));
        }
        Poll::Ready(Some(Err(std::io::Error::other("simulated body error"))))
    }
}

/// A streamed body that yields its chunks one frame at a time.
pub struct ChunkedBody {
    chunks: VecDeque<Bytes>,
}

impl ChunkedBody {
    pub fn new(chunks: &[&'static str]) -> Self {
        Self {
            chunks: chunks
                .iter()
                .map(|c| Bytes::from_static(c.as_bytes()))
                .collect(),
        }
    }
}

impl Body for ChunkedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.chunks.pop_front().map(|c| Ok(Frame::data(c))))
    }
}
