//! Text generation: tailored resume, cover letter and improvement suggestions

pub mod advisor;
pub mod client;
pub mod prompts;

pub use advisor::{CareerAdvisor, GeneratedContent};
pub use client::{OpenAiClient, TextGenerator};
