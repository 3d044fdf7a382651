// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Request body draining and replacement.
//!
//! Once the dump has read a request body into memory, the downstream service
//! receives a fresh body over the same frames. Handlers see the original
//! payload and trailers, and a read that failed fails again for them.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use hyper::body::{Body, Frame, SizeHint};
use hyper::HeaderMap;

/// What was read from a request body: the data, any trailers, and the error
/// that stopped the read, if one did.
///
/// As a body it yields the same sequence again: the data in one frame, the
/// trailers, then the stored error.
pub struct Replay<E> {
    bytes: Bytes,
    data: Option<Bytes>,
    trailers: Option<HeaderMap>,
    error: Option<E>,
}

impl<E> Replay<E> {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            data: Some(bytes.clone()).filter(|b| !b.is_empty()),
            bytes,
            trailers: None,
            error: None,
        }
    }

    /// Every data byte read, whether or not the read finished.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn trailers(&self) -> Option<&HeaderMap> {
        self.trailers.as_ref()
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    fn next_frame(&mut self) -> Option<Result<Frame<Bytes>, E>> {
        if let Some(data) = self.data.take() {
            return Some(Ok(Frame::data(data)));
        }
        if let Some(trailers) = self.trailers.take() {
            return Some(Ok(Frame::trailers(trailers)));
        }
        self.error.take().map(Err)
    }

    fn is_drained(&self) -> bool {
        self.data.is_none() && self.trailers.is_none() && self.error.is_none()
    }

    fn remaining_hint(&self) -> SizeHint {
        let remaining = self.data.as_ref().map_or(0, |d| d.len() as u64);
        if self.error.is_some() {
            let mut hint = SizeHint::new();
            hint.set_lower(remaining);
            hint
        } else {
            SizeHint::with_exact(remaining)
        }
    }
}

/// Body handed to the rest of the pipeline.
pub enum RequestBody<B: Body> {
    /// Frames already read by the dump, replayed as they were received.
    Buffered(Box<Replay<B::Error>>),
    /// The untouched original body.
    Passthrough(Pin<Box<B>>),
}

impl<B: Body> RequestBody<B> {
    pub fn buffered(bytes: Bytes) -> Self {
        RequestBody::Buffered(Box::new(Replay::new(bytes)))
    }

    pub fn replay(replay: Replay<B::Error>) -> Self {
        RequestBody::Buffered(Box::new(replay))
    }

    pub fn passthrough(body: B) -> Self {
        RequestBody::Passthrough(Box::pin(body))
    }
}

impl<B> Body for RequestBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            RequestBody::Buffered(replay) => Poll::Ready(replay.next_frame()),
            RequestBody::Passthrough(inner) => inner.as_mut().poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            RequestBody::Buffered(replay) => replay.is_drained(),
            RequestBody::Passthrough(inner) => inner.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            RequestBody::Buffered(replay) => replay.remaining_hint(),
            RequestBody::Passthrough(inner) => inner.size_hint(),
        }
    }
}

/// Drain `body` frame by frame.
///
/// A read error ends the loop; the bytes read so far and the error are both
/// kept so the replay fails the same way the original would have.
pub async fn read_body<B>(body: B) -> Replay<B::Error>
where
    B: Body<Data = Bytes>,
{
    let mut body = std::pin::pin!(body);
    let mut collected = BytesMut::new();
    let mut trailers: Option<HeaderMap> = None;
    let mut error = None;

    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                error = Some(e);
                break;
            }
        };
        match frame.into_data() {
            Ok(data) => collected.extend_from_slice(&data),
            Err(frame) => {
                if let Ok(t) = frame.into_trailers() {
                    trailers.get_or_insert_with(HeaderMap::new).extend(t);
                }
            }
        }
    }

    let mut replay = Replay::new(collected.freeze());
    replay.trailers = trailers;
    replay.error = error;
    replay
}
