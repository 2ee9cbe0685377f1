//! Canned answer engine shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use gsearch_core::api::{AnswerEngine, AnswerRequest, ChunkStream, EngineError};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    Fail,
    Chunks(Vec<Chunk>),
}

#[derive(Debug, Clone)]
pub enum Chunk {
    Text(&'static str),
    Fail,
}

pub fn text(s: impl Into<String>) -> Reply {
    Reply::Text(s.into())
}

type SearchScript = Box<dyn Fn(&str, u32) -> Reply + Send + Sync>;
type SummaryScript = Box<dyn Fn(&str) -> Reply + Send + Sync>;
type DelayScript = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Replies are scripted per query; search attempts are numbered per query from 1.
pub struct CannedEngine {
    search: SearchScript,
    summary: SummaryScript,
    delay: DelayScript,
    attempts: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<AnswerRequest>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CannedEngine {
    pub fn new() -> Self {
        Self {
            search: Box::new(|q, _| Reply::Text(format!("answer for {q}"))),
            summary: Box::new(|q| Reply::Text(format!("summary of {q}"))),
            delay: Box::new(|_| Duration::ZERO),
            attempts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn on_search(mut self, f: impl Fn(&str, u32) -> Reply + Send + Sync + 'static) -> Self {
        self.search = Box::new(f);
        self
    }

    pub fn on_summary(mut self, f: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        self.summary = Box::new(f);
        self
    }

    pub fn with_delay(mut self, f: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Box::new(f);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AnswerRequest> {
        self.requests.lock().unwrap().clone()
    }

    async fn reply_for(&self, request: &AnswerRequest) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let (is_summary, query) = classify(&request.prompt);
        let delay = (self.delay)(&query);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if is_summary {
            (self.summary)(&query)
        } else {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                let n = attempts.entry(query.clone()).or_insert(0);
                *n += 1;
                *n
            };
            (self.search)(&query, attempt)
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn canned_failure() -> EngineError {
    EngineError::Transport(anyhow::anyhow!("canned transport failure"))
}

/// Pulls the query back out of a search or summary prompt.
fn classify(prompt: &str) -> (bool, String) {
    if let Some(rest) = prompt.strip_prefix("Query: ") {
        let query = rest.split("\n\nSearch Results:").next().unwrap_or(rest);
        return (true, query.to_string());
    }
    let query = prompt
        .split("<query>\n")
        .nth(1)
        .and_then(|s| s.split("\n</query>").next())
        .unwrap_or(prompt);
    (false, query.to_string())
}

#[async_trait]
impl AnswerEngine for CannedEngine {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, request: &AnswerRequest) -> Result<String, EngineError> {
        match self.reply_for(request).await {
            Reply::Text(t) => Ok(t),
            Reply::Empty => Ok(String::new()),
            Reply::Fail => Err(canned_failure()),
            Reply::Chunks(chunks) => Ok(chunks
                .iter()
                .filter_map(|c| match c {
                    Chunk::Text(s) => Some(*s),
                    Chunk::Fail => None,
                })
                .collect()),
        }
    }

    async fn generate_stream(&self, request: &AnswerRequest) -> Result<ChunkStream, EngineError> {
        let chunks = match self.reply_for(request).await {
            Reply::Text(t) => vec![Ok(t)],
            Reply::Empty => Vec::new(),
            Reply::Fail => return Err(canned_failure()),
            Reply::Chunks(chunks) => chunks
                .into_iter()
                .map(|c| match c {
                    Chunk::Text(s) => Ok(s.to_string()),
                    Chunk::Fail => Err(canned_failure()),
                })
                .collect(),
        };
        Ok(futures::stream::iter(chunks).boxed())
    }
}
