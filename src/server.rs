// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Small echo server wrapped in the dump middleware.
//!
//! Handy for trying the dump output from a terminal with curl; the library
//! itself does not depend on it.

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::body::RequestBody;
use crate::dump::Dump;

/// Answer with the request body and its Content-Type; empty bodies get 204.
pub async fn echo<B>(req: Request<RequestBody<B>>) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    let content_type = req.headers().get(CONTENT_TYPE).cloned();

    let bytes = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let mut resp = Response::new(Full::new(Bytes::from(format!("request body error: {}", e))));
            *resp.status_mut() = StatusCode::BAD_REQUEST;
            return Ok(resp);
        }
    };

    if bytes.is_empty() {
        let mut resp = Response::new(Full::new(Bytes::new()));
        *resp.status_mut() = StatusCode::NO_CONTENT;
        return Ok(resp);
    }

    let mut resp = Response::new(Full::new(bytes));
    if let Some(ct) = content_type {
        resp.headers_mut().insert(CONTENT_TYPE, ct);
    }
    Ok(resp)
}

pub async fn run_server(listen: SocketAddr, dump: Dump) -> anyhow::Result<()> {
    run_server_with_limit(listen, dump, None).await
}

/// Testable variant of `run_server` that accepts an optional `accept_limit`.
/// When `accept_limit` is `Some(n)`, the accept loop returns after the Nth
/// connection; connection handlers may still be running at that point.
pub async fn run_server_with_limit(
    listen: SocketAddr,
    dump: Dump,
    accept_limit: Option<usize>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!(%listen, "listening");
    serve(listener, dump, accept_limit).await
}

/// Accept loop over an already bound listener.
pub async fn serve(
    listener: TcpListener,
    dump: Dump,
    accept_limit: Option<usize>,
) -> anyhow::Result<()> {
    let server_builder = AutoConnBuilder::new(TokioExecutor::new());

    let mut remaining = accept_limit;
    loop {
        if let Some(0) = remaining {
            break;
        }

        let (stream, remote_addr) = listener.accept().await?;

        if let Some(ref mut n) = remaining {
            *n -= 1;
        }

        let service = dump.layer(service_fn(echo::<Incoming>));
        let builder_clone = server_builder.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            if let Err(e) = builder_clone.serve_connection(io, service).await {
                error!(%e, %remote_addr, "connection error");
            }
        });
    }

    Ok(())
}
