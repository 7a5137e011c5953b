//! Scripted transport for service tests.

use std::sync::Mutex;

use super::error::FonError;
use super::soap::{self, SoapTransport};

/// Pops pre-recorded responses in order and records every request.
pub(crate) struct FakeTransport {
    responses: Mutex<Vec<Result<String, FonError>>>,
    pub requests: Mutex<Vec<(String, String)>>,
}

impl FakeTransport {
    pub fn new(responses: Vec<Result<String, FonError>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Wrap a body in a SOAP envelope the way the portal would.
    pub fn respond(body: &str) -> String {
        soap::envelope(body)
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl SoapTransport for FakeTransport {
    async fn call(&self, endpoint: &str, envelope: &str) -> Result<String, FonError> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), envelope.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(FonError::Transport("no scripted response".into())))
    }
}
