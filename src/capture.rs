// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Response body capture.
//!
//! [`CaptureBody`] wraps the body a service returns. Every frame is handed to
//! the connection unchanged while data frames are also appended to an
//! in-memory buffer. Status and headers live in the response parts and are
//! never touched. When the stream ends, fails, or the wrapper is dropped
//! early, the completion hook runs exactly once with the captured bytes.
//!
//! A wrapper dropped after it started streaming was aborted (usually the
//! client went away). One dropped before its first frame never reached the
//! connection: something downstream replaced or discarded it.
//!
//! The buffer is owned by one response and never shared, so there is no
//! locking.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use hyper::body::{Body, Frame, SizeHint};
use tracing::trace;

/// Outcome handed to the completion hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// The body reached its end; holds every data byte that was sent.
    Complete(Bytes),
    /// The wrapped body yielded an error after `captured` bytes.
    Failed { captured: Bytes, error: String },
    /// The wrapper was dropped mid-stream after sending these bytes.
    Aborted(Bytes),
    /// The wrapper was dropped before its first frame was polled.
    Detached(Bytes),
}

type CompletionHook = Box<dyn FnOnce(Capture) + Send>;

pub struct CaptureBody<B: Body> {
    inner: Pin<Box<B>>,
    captured: BytesMut,
    frames: usize,
    on_complete: Option<CompletionHook>,
}

impl<B: Body> CaptureBody<B> {
    /// Wrap `inner`, buffering its data and calling `on_complete` once.
    pub fn new<F>(inner: B, on_complete: F) -> Self
    where
        F: FnOnce(Capture) + Send + 'static,
    {
        Self {
            inner: Box::pin(inner),
            captured: BytesMut::new(),
            frames: 0,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    /// Wrap `inner` without buffering anything.
    pub fn passthrough(inner: B) -> Self {
        Self {
            inner: Box::pin(inner),
            captured: BytesMut::new(),
            frames: 0,
            on_complete: None,
        }
    }

    /// Bytes captured so far.
    pub fn captured(&self) -> &[u8] {
        &self.captured
    }

    pub fn is_capturing(&self) -> bool {
        self.on_complete.is_some()
    }

    fn finish(&mut self, outcome: impl FnOnce(Bytes) -> Capture) {
        if let Some(hook) = self.on_complete.take() {
            let captured = std::mem::take(&mut self.captured).freeze();
            hook(outcome(captured));
        }
    }
}

impl<B> Body for CaptureBody<B>
where
    B: Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                this.frames += 1;
                if this.on_complete.is_some() {
                    if let Some(data) = frame.data_ref() {
                        this.captured.extend_from_slice(data);
                        trace!(len = data.len(), total = this.captured.len(), "captured frame");
                    }
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => {
                let error = e.to_string();
                this.finish(|captured| Capture::Failed { captured, error });
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish(Capture::Complete);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B: Body> Drop for CaptureBody<B> {
    fn drop(&mut self) {
        if self.on_complete.is_none() {
            return;
        }
        // Bodies known to be empty are often dropped without being polled.
        if self.inner.is_end_stream() {
            self.finish(Capture::Complete);
        } else if self.frames > 0 {
            self.finish(Capture::Aborted);
        } else {
            self.finish(Capture::Detached);
        }
    }
}

impl<B: Body> fmt::Debug for CaptureBody<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBody")
            .field("captured", &self.captured.len())
            .field("frames", &self.frames)
            .field("capturing", &self.on_complete.is_some())
            .finish()
    }
}
