// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Shared test utilities to reduce duplication across test modules.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::Service;
use hyper::{Request, Response};

/// A sink that records every dump it receives.
pub fn collecting_sink() -> (
    impl Fn(String) + Send + Sync + 'static,
    Arc<Mutex<Vec<String>>>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let store = seen.clone();
    let sink = move |text: String| {
        store.lock().expect("sink lock").push(text);
    };
    (sink, seen)
}

/// Build a POST request with a JSON body and matching Content-Length.
pub fn json_request(body: &str) -> anyhow::Result<Request<Full<Bytes>>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/dump")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .header("accept-language", "en-US,en;q=0.5")
        .body(Full::new(Bytes::copy_from_slice(body.as_bytes())))?)
}

/// Call `svc` and stream the whole response body, as a connection would.
pub async fn run_to_completion<S, B, RB>(svc: &S, req: Request<B>) -> anyhow::Result<Bytes>
where
    S: Service<Request<B>, Response = Response<RB>>,
    S::Error: std::error::Error + Send + Sync + 'static,
    RB: Body,
    RB::Error: std::error::Error + Send + Sync + 'static,
{
    let resp = svc.call(req).await?;
    Ok(resp.into_body().collect().await?.to_bytes())
}
