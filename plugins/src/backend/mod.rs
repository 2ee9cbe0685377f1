pub mod gemini;

pub use gemini::GeminiEngine;
