//! Structured intake, the fixed five-step data-collection dialogue.
//!
//! A session starts in `IntakeState::Start`. The first message only emits the
//! compensation prompt; every later message answers the outstanding prompt
//! and, if valid, emits the next one. After the filing status is accepted the
//! session is complete and all further input goes to question answering.

pub mod model;
pub mod parse;
pub mod prompts;
pub mod state;

pub use model::{FilingStatus, IntakeRecord};
pub use parse::{
    AmountRejection, FilingStatusRejection, MAX_AMOUNT, parse_amount, parse_filing_status,
};
pub use state::{IntakeState, StepOutcome};
