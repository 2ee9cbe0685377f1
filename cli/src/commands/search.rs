use std::io::Write;

use gsearch_core::api::{
    load_default, load_from, render_batch, render_outcome, render_stream_tail, run_batch,
    AppConfig, CliError, QueryExecutor, Rendered, SearchSettings,
};
use gsearch_plugins::build_engine;

use super::cli::Args;
use super::plan::{build_plan, Mode, RunPlan};

/// Runs one invocation end to end and returns the process exit code.
pub async fn run(args: Args) -> Result<i32, CliError> {
    let cfg = load_config(&args)?;
    let plan = build_plan(&args, &cfg)?;

    let engine = build_engine(&cfg).map_err(CliError::EngineInit)?;
    let executor = QueryExecutor::new(engine, SearchSettings::from(&cfg.search));
    tracing::info!(
        target: "gsearch.search",
        engine = executor.engine_name(),
        model = %cfg.search.model,
        "answer engine initialized"
    );

    let rendered = execute_plan(&executor, &plan).await?;
    write_rendered(&rendered)?;
    Ok(exit_code(&rendered))
}

async fn execute_plan(executor: &QueryExecutor, plan: &RunPlan) -> Result<Rendered, CliError> {
    match &plan.mode {
        Mode::Single(query) if plan.stream => run_streaming(executor, query, plan).await,
        Mode::Single(query) => run_single(executor, query, plan).await,
        Mode::Batch(queries) => {
            let batch = run_batch(executor, queries, &plan.batch).await;
            Ok(render_batch(&batch, &plan.render)?)
        }
    }
}

/// 0 when everything rendered succeeded, 1 otherwise.
fn exit_code(rendered: &Rendered) -> i32 {
    if rendered.ok {
        0
    } else {
        1
    }
}

fn load_config(args: &Args) -> Result<AppConfig, CliError> {
    let mut cfg = match &args.config {
        Some(path) => load_from(path)?,
        None => load_default()?,
    };
    if let Some(model) = &args.model {
        cfg.search.model = model.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

async fn run_single(
    executor: &QueryExecutor,
    query: &str,
    plan: &RunPlan,
) -> Result<Rendered, CliError> {
    let mut outcome = executor.execute(query).await;
    if plan.include_summary && outcome.success {
        let summary = executor.summarize_or_sentinel(query, &outcome.answer_text).await;
        outcome = outcome.with_summary(summary);
    }
    Ok(render_outcome(&outcome, &plan.render)?)
}

async fn run_streaming(
    executor: &QueryExecutor,
    query: &str,
    plan: &RunPlan,
) -> Result<Rendered, CliError> {
    let mut stdout = std::io::stdout();
    let mut outcome = executor
        .execute_streaming(query, &mut stdout, &plan.render.markers)
        .await;
    if plan.include_summary && outcome.success {
        let summary = executor.summarize_or_sentinel(query, &outcome.answer_text).await;
        outcome = outcome.with_summary(summary);
    }
    Ok(render_stream_tail(&outcome, &plan.render)?)
}

fn write_rendered(rendered: &Rendered) -> Result<(), CliError> {
    if !rendered.stdout.is_empty() {
        let mut out = std::io::stdout().lock();
        out.write_all(rendered.stdout.as_bytes())?;
        out.flush()?;
    }
    if !rendered.stderr.is_empty() {
        let mut err = std::io::stderr().lock();
        err.write_all(rendered.stderr.as_bytes())?;
        err.flush()?;
    }
    Ok(())
}
