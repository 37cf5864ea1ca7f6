//! FAQ Assist: grounded Q&A over a fixed corpus, with a guided intake.

pub mod auth;
pub mod config;
pub mod error;
pub mod intake;
pub mod llm;
pub mod rag;
pub mod server;
pub mod session;
