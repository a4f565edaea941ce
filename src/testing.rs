//! Deterministic stand-ins for the clock and the remote services.
//!
//! These let the pipeline be exercised without sleeping or touching the
//! network. They are used by the unit tests and by `tests/pipeline.rs`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::delay_manager::Clock;
use crate::error::{EnrichError, Result};
use crate::extraction_client::{ChatRequest, LlmReply, LlmTransport};
use crate::language::{LanguageDetector, Translator};
use crate::rate_limiter::RateLimiter;
use crate::search_engine::WebSearch;

/// A clock that only moves when slept on or advanced.
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// Counts acquisitions and never blocks.
#[derive(Default)]
pub struct CountingLimiter {
    count: AtomicUsize,
}

impl CountingLimiter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl RateLimiter for CountingLimiter {
    fn acquire(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Search results keyed by exact query; unknown queries fail.
#[derive(Default)]
pub struct ScriptedSearch {
    pages: HashMap<String, String>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, query: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(query.into(), html.into());
        self
    }

    /// Handle to the queries seen, in call order.
    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }
}

impl WebSearch for ScriptedSearch {
    fn search(&self, query: &str) -> Option<String> {
        self.queries.lock().unwrap().push(query.to_string());
        self.pages.get(query).cloned()
    }
}

/// Reports one fixed language, or fails when built with `None`.
pub struct FixedDetector {
    language: Option<String>,
}

impl FixedDetector {
    pub fn new(language: Option<&str>) -> Self {
        FixedDetector { language: language.map(str::to_string) }
    }
}

impl LanguageDetector for FixedDetector {
    fn detect(&self, _text: &str) -> Result<String> {
        self.language
            .clone()
            .ok_or_else(|| EnrichError::LanguageDetection("no features in text".to_string()))
    }
}

pub type TranslationCalls = Arc<Mutex<Vec<(String, String, String)>>>;

/// Returns a canned translation (or fails) and records `(text, src, dest)`.
pub struct RecordingTranslator {
    output: Option<String>,
    calls: TranslationCalls,
}

impl RecordingTranslator {
    pub fn returning(output: impl Into<String>) -> Self {
        RecordingTranslator { output: Some(output.into()), calls: Arc::default() }
    }

    pub fn failing() -> Self {
        RecordingTranslator { output: None, calls: Arc::default() }
    }

    pub fn calls(&self) -> TranslationCalls {
        Arc::clone(&self.calls)
    }
}

impl Translator for RecordingTranslator {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), src.to_string(), dest.to_string()));
        self.output
            .clone()
            .ok_or_else(|| EnrichError::Translation("provider unavailable".to_string()))
    }
}

/// Replays queued replies in order; `Err` entries become provider errors.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<std::result::Result<LlmReply, String>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<std::result::Result<LlmReply, String>>) -> Self {
        ScriptedTransport {
            replies: Mutex::new(replies.into()),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmTransport for ScriptedTransport {
    fn send(&self, request: &ChatRequest) -> Result<LlmReply> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(EnrichError::Provider(message)),
            None => Err(EnrichError::Provider("no scripted reply left".to_string())),
        }
    }
}
