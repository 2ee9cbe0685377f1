//! Integration tests for the retrying and streaming executors and the summarizer.
mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use common::{text, CannedEngine, Chunk, Reply};
use gsearch_core::api::{
    QueryExecutor, QueryOutcome, SearchSettings, SummaryError, TextMarkers, ToolCapability,
};
use gsearch_core::search::{
    EMPTY_RESPONSE, EMPTY_STREAM_RESPONSE, SEARCH_FAILED, STREAM_SEARCH_FAILED, SUMMARY_FAILED,
};

fn executor(engine: &Arc<CannedEngine>) -> QueryExecutor {
    QueryExecutor::new(engine.clone(), SearchSettings::default())
}

async fn stream_to_string(exec: &QueryExecutor, query: &str) -> (QueryOutcome, String) {
    let mut out: Vec<u8> = Vec::new();
    let outcome = exec
        .execute_streaming(query, &mut out, &TextMarkers::unicode())
        .await;
    (outcome, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn success_on_first_attempt() {
    let engine = Arc::new(CannedEngine::new());
    let outcome = executor(&engine).execute("What is Go?").await;

    assert!(outcome.success);
    assert_eq!(outcome.query, "What is Go?");
    assert_eq!(outcome.answer_text, "answer for What is Go?");
    assert!(outcome.failure_reason.is_none());
    assert!(outcome.summary_text.is_none());
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn search_request_carries_settings_and_date() {
    let engine = Arc::new(CannedEngine::new());
    let exec = executor(&engine).with_date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    exec.execute("rust").await;

    let req = &engine.requests()[0];
    assert_eq!(req.thinking_budget, Some(512));
    assert_eq!(
        req.tools,
        vec![ToolCapability::WebSearch, ToolCapability::UrlContext]
    );
    assert_eq!(req.system_instruction, SearchSettings::default().system_instruction);
    assert!(req.prompt.contains("<query>\nrust\n</query>"));
    assert!(req.prompt.contains("today is 2025-01-02"));
}

#[tokio::test(start_paused = true)]
async fn empty_first_attempt_retries_and_uses_second_text() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, attempt| {
        if attempt == 1 {
            Reply::Empty
        } else {
            text("second try")
        }
    }));
    let outcome = executor(&engine).execute("go").await;

    assert!(outcome.success);
    assert_eq!(outcome.answer_text, "second try");
    assert_eq!(engine.calls(), 2);
    // the fixed delay sits inside the measured window
    assert!(outcome.elapsed >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn empty_twice_is_empty_response() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, _| Reply::Empty));
    let outcome = executor(&engine).execute("go").await;

    assert!(!outcome.success);
    assert!(outcome.answer_text.is_empty());
    assert_eq!(outcome.failure_reason.as_deref(), Some(EMPTY_RESPONSE));
    assert_eq!(engine.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn errors_twice_is_search_failed() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, _| Reply::Fail));
    let outcome = executor(&engine).execute("go").await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_reason.as_deref(), Some(SEARCH_FAILED));
    assert_eq!(engine.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn error_then_success_recovers() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, attempt| {
        if attempt == 1 {
            Reply::Fail
        } else {
            text("recovered")
        }
    }));
    let outcome = executor(&engine).execute("go").await;
    assert!(outcome.success);
    assert_eq!(outcome.answer_text, "recovered");
}

#[tokio::test]
async fn stream_echoes_chunks_and_accumulates() {
    let engine = Arc::new(
        CannedEngine::new()
            .on_search(|_, _| Reply::Chunks(vec![Chunk::Text("Hel"), Chunk::Text("lo")])),
    );
    let exec = executor(&engine);
    let (outcome, live) = stream_to_string(&exec, "greeting").await;

    assert!(outcome.success);
    assert_eq!(outcome.answer_text, "Hello");
    assert!(live.starts_with("\n=== greeting ===\n"));
    assert!(live.contains("Hello"));
    assert!(live.ends_with(&format!("\n{}\n", TextMarkers::unicode().rule)));
    assert!(!live.contains("[Retrying...]"));
}

#[tokio::test(start_paused = true)]
async fn stream_empty_twice_is_empty_stream_response() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, _| Reply::Chunks(vec![])));
    let exec = executor(&engine);
    let (outcome, live) = stream_to_string(&exec, "go").await;

    assert!(!outcome.success);
    assert!(outcome.answer_text.is_empty());
    assert_eq!(outcome.failure_reason.as_deref(), Some(EMPTY_STREAM_RESPONSE));
    assert!(live.contains("\n[Retrying...]\n"));
    assert_eq!(engine.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn stream_open_failure_twice_is_stream_search_failed() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, _| Reply::Fail));
    let exec = executor(&engine);
    let (outcome, live) = stream_to_string(&exec, "go").await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_reason.as_deref(), Some(STREAM_SEARCH_FAILED));
    // the block is still closed off
    assert!(live.ends_with(&format!("{}\n", TextMarkers::unicode().rule)));
}

#[tokio::test(start_paused = true)]
async fn stream_error_before_text_retries() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, attempt| {
        if attempt == 1 {
            Reply::Chunks(vec![Chunk::Fail])
        } else {
            Reply::Chunks(vec![Chunk::Text("fresh")])
        }
    }));
    let exec = executor(&engine);
    let (outcome, live) = stream_to_string(&exec, "go").await;

    assert!(outcome.success);
    assert_eq!(outcome.answer_text, "fresh");
    assert!(live.contains("[Retrying...]"));
}

#[tokio::test(start_paused = true)]
async fn stream_error_after_text_is_retried() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, attempt| {
        if attempt == 1 {
            Reply::Chunks(vec![Chunk::Text("trunc"), Chunk::Fail])
        } else {
            Reply::Chunks(vec![Chunk::Text("full answer")])
        }
    }));
    let exec = executor(&engine);
    let (outcome, live) = stream_to_string(&exec, "go").await;

    assert_eq!(engine.calls(), 2);
    assert!(outcome.success);
    assert_eq!(outcome.answer_text, "full answer");
    // the truncated text was already shown and stays on screen
    assert!(live.contains("trunc\n[Retrying...]\nfull answer"));
}

#[tokio::test(start_paused = true)]
async fn stream_partial_text_on_last_attempt_is_kept() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, _| {
        Reply::Chunks(vec![Chunk::Text("partial "), Chunk::Text("answer"), Chunk::Fail])
    }));
    let exec = executor(&engine);
    let (outcome, _) = stream_to_string(&exec, "go").await;

    assert_eq!(engine.calls(), 2);
    assert!(outcome.success);
    assert_eq!(outcome.answer_text, "partial answer");
}

#[tokio::test(start_paused = true)]
async fn stream_error_then_empty_is_stream_search_failed() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, attempt| {
        if attempt == 1 {
            Reply::Fail
        } else {
            Reply::Chunks(vec![])
        }
    }));
    let exec = executor(&engine);
    let (outcome, _) = stream_to_string(&exec, "go").await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_reason.as_deref(), Some(STREAM_SEARCH_FAILED));
}

#[tokio::test(start_paused = true)]
async fn error_then_empty_is_search_failed() {
    let engine = Arc::new(CannedEngine::new().on_search(|_, attempt| {
        if attempt == 1 {
            Reply::Fail
        } else {
            Reply::Empty
        }
    }));
    let outcome = executor(&engine).execute("go").await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_reason.as_deref(), Some(SEARCH_FAILED));
}

#[tokio::test]
async fn summary_uses_summary_instruction_without_tools() {
    let engine = Arc::new(CannedEngine::new());
    let summary = executor(&engine)
        .summarize("Go", "Go is a language.")
        .await
        .unwrap();
    assert_eq!(summary, "summary of Go");

    let req = &engine.requests()[0];
    assert!(req.tools.is_empty());
    assert_eq!(req.system_instruction, SearchSettings::default().summary_instruction);
    assert_eq!(req.prompt, "Query: Go\n\nSearch Results:\nGo is a language.");
}

#[tokio::test(start_paused = true)]
async fn summary_failures_are_typed() {
    let failing = Arc::new(CannedEngine::new().on_summary(|_| Reply::Fail));
    let err = executor(&failing).summarize("Go", "answer").await.unwrap_err();
    assert!(matches!(err, SummaryError::Engine(_)));
    assert_eq!(failing.calls(), 2);

    let empty = Arc::new(CannedEngine::new().on_summary(|_| Reply::Empty));
    let err = executor(&empty).summarize("Go", "answer").await.unwrap_err();
    assert!(matches!(err, SummaryError::Empty));
}

#[tokio::test(start_paused = true)]
async fn summary_failure_degrades_to_sentinel() {
    let engine = Arc::new(CannedEngine::new().on_summary(|_| Reply::Fail));
    let exec = executor(&engine);
    let outcome = exec.execute("Go").await;
    let summary = exec.summarize_or_sentinel("Go", &outcome.answer_text).await;
    let outcome = outcome.with_summary(summary);

    assert!(outcome.success);
    assert_eq!(outcome.summary_text.as_deref(), Some(SUMMARY_FAILED));
}
