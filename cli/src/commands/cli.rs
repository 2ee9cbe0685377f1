use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "gsearch",
    version,
    about = "A command-line search engine powered by Gemini",
    after_help = "Examples:\n  gsearch \"What is Go programming?\"\n  gsearch --include-summary \"What is Go programming?\"\n  gsearch -q Go -q Python -q Rust\n  gsearch -q Go -q Python --include-summary=false\n  gsearch --stream \"What is Go programming?\""
)]
pub struct Args {
    /// Query text; several words are joined with spaces.
    #[arg(value_name = "QUERY")]
    pub positional: Vec<String>,

    /// Single search query.
    #[arg(long)]
    pub query: Option<String>,

    /// Search query, can be repeated.
    #[arg(short = 'q', value_name = "QUERY", action = ArgAction::Append)]
    pub queries: Vec<String>,

    /// Output in JSON format.
    #[arg(long)]
    pub json: bool,

    /// Print the answer live as it is generated (single query only).
    #[arg(long)]
    pub stream: bool,

    /// Include AI-generated summaries (default: off for one query, on for several).
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub include_summary: Option<bool>,

    /// Max concurrent queries (1-5).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Total time budget for a multi-query run, e.g. 180s, 2m, 1m30s.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Plain ASCII status markers.
    #[arg(long)]
    pub ascii: bool,

    /// Model name, overrides the configuration file.
    #[arg(long)]
    pub model: Option<String>,

    /// Configuration file (default: ./gsearch.toml when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
