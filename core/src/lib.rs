pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod render;
pub mod search;
