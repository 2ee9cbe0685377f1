//! Turns parsed flags plus loaded config into a validated run plan.
//!
//! Nothing here touches the network; every rejection is a configuration error.

use std::time::Duration;

use gsearch_core::api::{
    parse_duration, AppConfig, BatchOpts, ConfigError, OutputFormat, RenderOpts, TextMarkers,
};
use gsearch_core::config::validate_workers;

use super::cli::Args;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single(String),
    Batch(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct RunPlan {
    pub mode: Mode,
    pub stream: bool,
    pub include_summary: bool,
    pub render: RenderOpts,
    pub batch: BatchOpts,
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Validation(msg.to_string())
}

pub fn build_plan(args: &Args, cfg: &AppConfig) -> Result<RunPlan, ConfigError> {
    let positional = (!args.positional.is_empty()).then(|| args.positional.join(" "));
    let single = match (&args.query, positional) {
        (Some(_), Some(_)) => {
            return Err(invalid(
                "cannot use both --query and a positional query simultaneously",
            ))
        }
        (Some(q), None) => Some(q.clone()),
        (None, p) => p,
    };

    let queries: Vec<String> = match single {
        Some(_) if !args.queries.is_empty() => {
            return Err(invalid("cannot use both --query and -q flags simultaneously"))
        }
        Some(q) => vec![q],
        None => args.queries.clone(),
    };

    if queries.is_empty() {
        return Err(invalid(
            "search query is required (use --query, -q, or positional argument)",
        ));
    }
    if queries.iter().any(|q| q.trim().is_empty()) {
        return Err(invalid("search query must not be blank"));
    }

    let workers = args.workers.unwrap_or(cfg.batch.workers);
    validate_workers(workers)?;

    let timeout = match args.timeout.as_deref() {
        Some(t) => parse_duration(t)?,
        None => Duration::from_secs(cfg.batch.timeout_secs),
    };
    if timeout.is_zero() {
        return Err(invalid("timeout must be greater than zero"));
    }

    if args.stream && queries.len() > 1 {
        return Err(invalid(
            "streaming mode is not supported for multiple queries (use single query only)",
        ));
    }
    if args.stream && args.json {
        return Err(invalid("streaming mode cannot be combined with --json"));
    }

    let include_summary = args.include_summary.unwrap_or(queries.len() > 1);

    let render = RenderOpts {
        format: if args.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        stream: args.stream,
        include_summary,
        markers: if args.ascii {
            TextMarkers::ascii()
        } else {
            TextMarkers::unicode()
        },
    };
    let batch = BatchOpts {
        workers,
        timeout,
        include_summary,
        verbose: args.verbose,
    };

    let mode = if queries.len() == 1 {
        Mode::Single(queries.into_iter().next().unwrap_or_default())
    } else {
        Mode::Batch(queries)
    };

    Ok(RunPlan {
        mode,
        stream: args.stream,
        include_summary,
        render,
        batch,
    })
}
