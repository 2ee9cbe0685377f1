//! Text and JSON rendering of outcomes.
//!
//! Everything here is pure: the caller decides where `stdout` and `stderr`
//! go and maps `ok` to the exit code.

mod markers;

pub use markers::{TextMarkers, RULE_WIDTH};

use serde::Serialize;

use crate::outcome::{BatchOutcome, QueryOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOpts {
    pub format: OutputFormat,
    pub stream: bool,
    pub include_summary: bool,
    pub markers: TextMarkers,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: String,
    pub stderr: String,
    pub ok: bool,
}

/// Pretty JSON with two-space indent and a trailing newline.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    Ok(s)
}

/// Single-query record.
pub fn render_outcome(outcome: &QueryOutcome, opts: &RenderOpts) -> Result<Rendered, serde_json::Error> {
    if opts.format == OutputFormat::Json {
        return Ok(Rendered {
            stdout: to_json(outcome)?,
            stderr: String::new(),
            ok: outcome.success,
        });
    }

    if !outcome.success {
        return Ok(failed_single(outcome));
    }

    let mut out = String::new();
    if let Some(summary) = outcome.summary_text.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("## SUMMARY\n{summary}\n\n"));
        out.push_str("## DETAILED RESPONSE\n");
    }
    out.push_str(&outcome.answer_text);
    out.push('\n');

    Ok(Rendered {
        stdout: out,
        stderr: String::new(),
        ok: true,
    })
}

/// What is left to print after a live stream: the answer is already on screen.
pub fn render_stream_tail(outcome: &QueryOutcome, opts: &RenderOpts) -> Result<Rendered, serde_json::Error> {
    if opts.format == OutputFormat::Json {
        return render_outcome(outcome, opts);
    }
    if !outcome.success {
        return Ok(failed_single(outcome));
    }

    let stdout = match outcome.summary_text.as_deref().filter(|s| !s.is_empty()) {
        Some(summary) => format!("\n## SUMMARY\n{summary}\n"),
        None => String::new(),
    };
    Ok(Rendered {
        stdout,
        stderr: String::new(),
        ok: true,
    })
}

fn failed_single(outcome: &QueryOutcome) -> Rendered {
    Rendered {
        stdout: String::new(),
        stderr: format!("Search failed: {}\n", outcome.reason()),
        ok: false,
    }
}

/// Multi-query record.
///
/// JSON ignores the stream and summary switches and serializes whatever the
/// batch holds.
pub fn render_batch(batch: &BatchOutcome, opts: &RenderOpts) -> Result<Rendered, serde_json::Error> {
    let ok = batch.all_succeeded;
    if opts.format == OutputFormat::Json {
        return Ok(Rendered {
            stdout: to_json(batch)?,
            stderr: String::new(),
            ok,
        });
    }

    let succeeded = batch.succeeded_count();
    let total = batch.outcomes.len();
    let m = &opts.markers;

    if opts.stream {
        return Ok(Rendered {
            stdout: format!("\n{} COMPLETED: {succeeded}/{total} queries\n", m.done),
            stderr: String::new(),
            ok,
        });
    }

    let mut out = String::new();
    if opts.include_summary {
        out.push_str("## SEARCH RESULTS\n");
        out.push_str(&format!(
            "{succeeded}/{total} queries completed successfully, here is a summary for each query:\n\n"
        ));
        for o in &batch.outcomes {
            if o.success {
                let summary = o
                    .summary_text
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("No summary available");
                out.push_str(&format!("{} {}: {summary}\n", m.ok, o.query));
            } else {
                out.push_str(&format!("{} {}: {}\n", m.fail, o.query, o.reason()));
            }
        }
        out.push('\n');
        out.push_str("## DETAILED RESPONSES\n\n");
    }

    for o in &batch.outcomes {
        if total > 1 {
            out.push_str(&format!("=== {} ===\n", o.query));
        }
        if o.success {
            out.push_str(&o.answer_text);
            out.push('\n');
        } else {
            out.push_str(&format!("Status: FAILED - {}\n", o.reason()));
        }
        out.push('\n');
    }

    Ok(Rendered {
        stdout: out,
        stderr: String::new(),
        ok,
    })
}
