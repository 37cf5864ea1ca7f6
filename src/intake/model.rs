//! Intake data types: filing status and the completed record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax filing status, chosen from a numbered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    HeadOfHousehold,
    MarriedFilingJointly,
    MarriedFilingSeparately,
}

impl FilingStatus {
    /// All statuses in menu order.
    pub const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::HeadOfHousehold,
        FilingStatus::MarriedFilingJointly,
        FilingStatus::MarriedFilingSeparately,
    ];

    /// Map a menu number (1-4) to a status.
    pub fn from_choice(choice: u8) -> Option<Self> {
        match choice {
            1 => Some(Self::Single),
            2 => Some(Self::HeadOfHousehold),
            3 => Some(Self::MarriedFilingJointly),
            4 => Some(Self::MarriedFilingSeparately),
            _ => None,
        }
    }

    /// Menu number for this status.
    pub fn choice(&self) -> u8 {
        match self {
            Self::Single => 1,
            Self::HeadOfHousehold => 2,
            Self::MarriedFilingJointly => 3,
            Self::MarriedFilingSeparately => 4,
        }
    }

    /// Human-readable label, as shown in the menu.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::HeadOfHousehold => "Head of Household",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
        }
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything collected by a finished intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub compensation: Decimal,
    pub premium: Decimal,
    pub expenses: Decimal,
    pub filing_status: FilingStatus,
}

impl IntakeRecord {
    /// Compensation minus premium minus expenses. Amounts from
    /// `parse_amount` are bounded by `MAX_AMOUNT`, so this cannot overflow.
    pub fn adjusted_amount(&self) -> Decimal {
        self.compensation - self.premium - self.expenses
    }
}
