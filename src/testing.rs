//! In-memory doubles for the network-facing seams.

use crate::analysis::{AnalysisRequest, AnalysisService, ResponseFormat, Role, ServiceResponse};
use crate::error::ServiceError;
use crate::fetchers::{HttpResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

type Reply = Result<HttpResponse, TransportError>;

/// Serves scripted replies per URL and records each call's time and timeout.
/// The last reply of a script repeats.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, Instant, Duration)>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(u, _, _)| u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _, _)| u == url)
            .map(|(_, t, _)| *t)
            .collect()
    }

    pub fn timeouts_for(&self, url: &str) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _, _)| u == url)
            .map(|(_, _, timeout)| *timeout)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Connection("empty script".into()))),
            None => Err(TransportError::Connection(format!("no route for {}", url))),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now(), timeout));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.next_reply(url)
    }
}

type Responder =
    Box<dyn Fn(&AnalysisRequest, usize) -> Result<ServiceResponse, ServiceError> + Send + Sync>;

/// Answers analysis requests through a closure and records every request
pub(crate) struct ScriptedService {
    respond: Responder,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedService {
    pub fn new(
        respond: impl Fn(&AnalysisRequest, usize) -> Result<ServiceResponse, ServiceError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Free text for unconstrained passes, valid JSON for constrained ones
    pub fn well_behaved() -> Self {
        Self::new(|request, n| Ok(reply(n, canned_content(request, n))))
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn complete(&self, request: AnalysisRequest) -> Result<ServiceResponse, ServiceError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        (self.respond)(&request, n)
    }
}

pub(crate) fn reply(n: usize, content: impl Into<String>) -> ServiceResponse {
    ServiceResponse {
        id: format!("resp-{}", n),
        model: "test-model".to_string(),
        content: content.into(),
    }
}

pub(crate) fn canned_content(request: &AnalysisRequest, n: usize) -> String {
    let last_user = request
        .conversation
        .turns()
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
        .unwrap_or_default();

    match request.format {
        ResponseFormat::JsonObject if last_user.contains("productsOrServices") => {
            PRODUCT_JSON.to_string()
        }
        ResponseFormat::JsonObject => GENERAL_JSON.to_string(),
        ResponseFormat::Text => format!("notes from pass {}", n),
    }
}

pub(crate) const PRODUCT_JSON: &str = r#"{
  "productsOrServices": [{
    "name": "SimplyDynamic",
    "description": "Dynamic electricity tariff",
    "primaryPurpose": "Lower bills through hourly prices",
    "strategicImportance": "Core offer",
    "integrationInEcosystem": "Pairs with smart meters",
    "marketPotentialAssessment": {
      "trend": "rapid growth",
      "reasoning": "Smart meter rollout",
      "scalingChallenges": [{
        "challenge": "Meter availability",
        "explanation": "Rollout is slow",
        "examples": "Installation backlogs",
        "sources": "https://www.bundesnetzagentur.de",
        "competitiveContext": "Tibber faces the same",
        "futurePerspective": "Improves with mandatory rollout"
      }]
    }
  }]
}"#;

pub(crate) const GENERAL_JSON: &str = r#"{
  "summary": "Company overview",
  "keyPoints": ["Founded in Berlin", "Green power"],
  "relevantInsights": "Focus on digital customers"
}"#;
