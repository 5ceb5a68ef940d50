//! In-memory `HttpFetch` used by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FetchRequest, FetchResponse, HttpFetch};
use crate::error::{Error, ErrorKind, HttpErrorKind};

/// Replays canned responses in order and records every request it receives.
/// Once the responses run out, requests fail as network errors.
pub struct RecordingFetch {
    responses: Mutex<VecDeque<FetchResponse>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl RecordingFetch {
    pub fn new(responses: Vec<FetchResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A fetch that must never be called.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for RecordingFetch {
    async fn request(&self, request: FetchRequest) -> Result<FetchResponse, Error> {
        self.requests.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().ok_or(Error {
            source: Some("no canned response left".into()),
            error_kind: ErrorKind::Http(HttpErrorKind::Network),
        })
    }
}
