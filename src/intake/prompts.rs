//! User-facing intake messages.

use rust_decimal::Decimal;

use super::model::{FilingStatus, IntakeRecord};

pub const COMPENSATION_PROMPT: &str =
    "Step 1️⃣: What is your total compensation from your employer? (e.g., 80000)";
pub const PREMIUM_PROMPT: &str = "Step 2️⃣: What is your Plan Premium? (e.g., 5000)";
pub const EXPENSES_PROMPT: &str = "Step 3️⃣: Estimate your Healthcare Expenses (e.g., 2000)";

pub const INVALID_COMPENSATION: &str = "❌ Please enter a number for compensation.";
pub const INVALID_PREMIUM: &str = "❌ Please enter a number for premium.";
pub const INVALID_EXPENSES: &str = "❌ Please enter a number for expenses.";
pub const INVALID_FILING_STATUS: &str = "❌ Please enter a valid filing status (1-4).";

/// Returned (with 400) when the question is empty or whitespace.
pub const EMPTY_INPUT: &str = "Please enter something.";

const OPTION_MARKERS: [&str; 4] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣"];

/// The numbered filing status menu.
pub fn filing_status_menu() -> String {
    let mut menu = String::from("Step 4️⃣: Pick your Filing Status:");
    for (marker, status) in OPTION_MARKERS.iter().zip(FilingStatus::ALL) {
        menu.push('\n');
        menu.push_str(marker);
        menu.push(' ');
        menu.push_str(status.label());
    }
    menu
}

/// Render an amount without trailing zeros (`5000.50` → `5000.5`).
pub fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Closing message listing what was collected and the adjusted amount.
pub fn completion_summary(record: &IntakeRecord) -> String {
    format!(
        "✅ Thank you! Here's what we collected:\n\n\
         💼 Compensation: ${compensation}\n\
         💳 Premium: ${premium}\n\
         🩺 Expenses: ${expenses}\n\
         📄 Filing Status: {status}\n\
         📊 Adjusted Amount: ${adjusted}\n\n\
         You can now ask me any question! 🤖",
        compensation = format_amount(record.compensation),
        premium = format_amount(record.premium),
        expenses = format_amount(record.expenses),
        status = record.filing_status,
        adjusted = format_amount(record.adjusted_amount()),
    )
}
