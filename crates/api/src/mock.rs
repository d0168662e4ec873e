//! `MockApi`: a recording test double for [`Posty5Api`].
//!
//! Responses are queued in order; once the queue is drained every further
//! call answers with the fallback (an empty object unless overridden).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{ApiError, ApiRequest, Posty5Api, UploadResponse};

/// One interaction seen by the mock, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send(ApiRequest),
    Upload { url: String, bytes: Vec<u8> },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    responses: VecDeque<Result<Value, ApiError>>,
    uploads: VecDeque<Result<UploadResponse, ApiError>>,
    fallback: Option<Result<Value, ApiError>>,
}

/// Cloning shares the recorded state, so a test can keep a handle after
/// moving the mock into an `Arc<dyn Posty5Api>`.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `send` fails with the given error.
    pub fn failing(err: ApiError) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().fallback = Some(Err(err));
        mock
    }

    pub fn push_ok(&self, payload: Value) -> &Self {
        self.state.lock().unwrap().responses.push_back(Ok(payload));
        self
    }

    pub fn push_err(&self, err: ApiError) -> &Self {
        self.state.lock().unwrap().responses.push_back(Err(err));
        self
    }

    /// Queue a failure for the next upload. Uploads succeed with `200` otherwise.
    pub fn push_upload_err(&self, err: ApiError) -> &Self {
        self.state.lock().unwrap().uploads.push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn sent_requests(&self) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(request) => Some(request),
                Call::Upload { .. } => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { url, bytes } => Some((url, bytes)),
                Call::Send(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Posty5Api for MockApi {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Send(request));
        match state.responses.pop_front() {
            Some(response) => response,
            None => state.fallback.clone().unwrap_or_else(|| Ok(json!({}))),
        }
    }

    async fn upload(&self, upload_url: &str, bytes: Vec<u8>) -> Result<UploadResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Upload { url: upload_url.to_owned(), bytes });
        state.uploads.pop_front().unwrap_or_else(|| {
            Ok(UploadResponse { status: 200, body: String::new() })
        })
    }
}
