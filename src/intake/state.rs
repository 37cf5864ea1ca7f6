//! Tracks which question an intake session is waiting on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::IntakeRecord;
use super::parse::{parse_amount, parse_filing_status};
use super::prompts;

/// The states of the intake dialogue.
///
/// Progresses linearly: Start → AwaitingCompensation → AwaitingPremium →
/// AwaitingExpenses → AwaitingFilingStatus → Complete. Each variant carries
/// exactly the answers collected so far, so a field can never be present
/// before its step has been answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum IntakeState {
    /// Nothing asked yet.
    Start,
    AwaitingCompensation,
    AwaitingPremium {
        compensation: Decimal,
    },
    AwaitingExpenses {
        compensation: Decimal,
        premium: Decimal,
    },
    AwaitingFilingStatus {
        compensation: Decimal,
        premium: Decimal,
        expenses: Decimal,
    },
    Complete(IntakeRecord),
}

impl Default for IntakeState {
    fn default() -> Self {
        Self::Start
    }
}

/// What a single intake step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Answer accepted (or first contact); `message` is the next prompt.
    Advanced { message: String },
    /// Answer rejected; state unchanged, `message` asks again.
    Rejected { message: String },
    /// Last answer accepted; intake is now complete.
    Completed {
        record: IntakeRecord,
        message: String,
    },
}

impl StepOutcome {
    /// Text to send back to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Advanced { message }
            | Self::Rejected { message }
            | Self::Completed { message, .. } => message,
        }
    }
}

impl IntakeState {
    /// Step counter: 1 before the first prompt, 2-5 while a prompt is
    /// outstanding. A completed intake stays at 5.
    pub fn step(&self) -> u8 {
        match self {
            Self::Start => 1,
            Self::AwaitingCompensation => 2,
            Self::AwaitingPremium { .. } => 3,
            Self::AwaitingExpenses { .. } => 4,
            Self::AwaitingFilingStatus { .. } | Self::Complete(_) => 5,
        }
    }

    /// Whether the intake has finished.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// The finished record, if the intake is complete.
    pub fn record(&self) -> Option<&IntakeRecord> {
        match self {
            Self::Complete(record) => Some(record),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AwaitingCompensation => "awaiting_compensation",
            Self::AwaitingPremium { .. } => "awaiting_premium",
            Self::AwaitingExpenses { .. } => "awaiting_expenses",
            Self::AwaitingFilingStatus { .. } => "awaiting_filing_status",
            Self::Complete(_) => "complete",
        }
    }

    /// Consume one (trimmed) answer and move the dialogue forward.
    ///
    /// Returns `None` once the intake is complete; callers route such input
    /// to question answering instead. A rejected answer leaves `self`
    /// untouched.
    pub fn advance(&mut self, input: &str) -> Option<StepOutcome> {
        let input = input.trim();
        let (next, outcome) = match &*self {
            Self::Complete(_) => return None,

            Self::Start => (
                Self::AwaitingCompensation,
                StepOutcome::Advanced {
                    message: prompts::COMPENSATION_PROMPT.to_string(),
                },
            ),

            Self::AwaitingCompensation => match parse_amount(input) {
                Ok(compensation) => (
                    Self::AwaitingPremium { compensation },
                    StepOutcome::Advanced {
                        message: prompts::PREMIUM_PROMPT.to_string(),
                    },
                ),
                Err(reason) => return Some(reject(self, &reason, prompts::INVALID_COMPENSATION)),
            },

            Self::AwaitingPremium { compensation } => match parse_amount(input) {
                Ok(premium) => (
                    Self::AwaitingExpenses {
                        compensation: *compensation,
                        premium,
                    },
                    StepOutcome::Advanced {
                        message: prompts::EXPENSES_PROMPT.to_string(),
                    },
                ),
                Err(reason) => return Some(reject(self, &reason, prompts::INVALID_PREMIUM)),
            },

            Self::AwaitingExpenses {
                compensation,
                premium,
            } => match parse_amount(input) {
                Ok(expenses) => (
                    Self::AwaitingFilingStatus {
                        compensation: *compensation,
                        premium: *premium,
                        expenses,
                    },
                    StepOutcome::Advanced {
                        message: prompts::filing_status_menu(),
                    },
                ),
                Err(reason) => return Some(reject(self, &reason, prompts::INVALID_EXPENSES)),
            },

            Self::AwaitingFilingStatus {
                compensation,
                premium,
                expenses,
            } => match parse_filing_status(input) {
                Ok(filing_status) => {
                    let record = IntakeRecord {
                        compensation: *compensation,
                        premium: *premium,
                        expenses: *expenses,
                        filing_status,
                    };
                    let message = prompts::completion_summary(&record);
                    (
                        Self::Complete(record.clone()),
                        StepOutcome::Completed { record, message },
                    )
                }
                Err(reason) => {
                    return Some(reject(self, &reason, prompts::INVALID_FILING_STATUS));
                }
            },
        };

        debug!(from = self.name(), to = next.name(), "Intake advanced");
        *self = next;
        Some(outcome)
    }
}

fn reject(state: &IntakeState, reason: &dyn std::fmt::Display, message: &str) -> StepOutcome {
    debug!(state = state.name(), reason = %reason, "Intake answer rejected");
    StepOutcome::Rejected {
        message: message.to_string(),
    }
}
