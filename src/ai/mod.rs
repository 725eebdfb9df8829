//! AI text transforms: prompt building, the network client and request bookkeeping.

mod client;
mod transform;

pub use client::{GeminiClient, TextGenerator};
pub use transform::{TransformManager, TransformOutcome};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("API key is not configured.")]
    MissingCredential,
    #[error("Please provide some text to work on.")]
    EmptyInput,
    /// Transport or HTTP failure. The detail is logged, never shown.
    #[error("Failed to generate text. Please check your connection or API key.")]
    Request(String),
    #[error("The AI service returned no text.")]
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOp {
    Summarize,
    Rewrite,
    FixGrammar,
}

impl TransformOp {
    pub fn all() -> &'static [TransformOp] {
        &[TransformOp::Summarize, TransformOp::Rewrite, TransformOp::FixGrammar]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransformOp::Summarize => "Summarize",
            TransformOp::Rewrite => "Rewrite",
            TransformOp::FixGrammar => "Fix Grammar",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            TransformOp::Summarize => "Summarize the following text concisely:",
            TransformOp::Rewrite => "Rewrite the following text in a more engaging and clear tone:",
            TransformOp::FixGrammar => {
                "Correct any spelling and grammar mistakes in the following text. Only return the corrected text, without any introductory phrases:"
            }
        }
    }
}

pub fn build_prompt(op: TransformOp, text: &str) -> String {
    format!("{}\n\n---\n\n{}", op.prompt(), text)
}
