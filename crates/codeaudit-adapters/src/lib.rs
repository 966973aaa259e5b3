//! AI oracle adapters
//!
//! The three analysis oracles (semantic review, security, refactoring) are
//! consumed as black boxes behind traits. The bundled implementations talk
//! to an OpenAI-compatible chat-completions endpoint and decode the model's
//! JSON strictly, falling back to documented structural defaults when the
//! response cannot be used as-is.

pub mod ai;
pub mod oracles;
pub mod prompts;

pub use ai::{AiClient, AiConfig};
pub use oracles::{
    LlmRefactoringOracle, LlmReviewOracle, LlmSecurityOracle, RefactoringOracle, ReviewOracle,
    SecurityOracle,
};
