//! Parse-and-validate functions for free-text intake answers.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::model::FilingStatus;

/// Plain decimal with optional sign, `$` and thousands separators.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?\$?((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+)$").unwrap()
});

/// Largest magnitude accepted for a single amount. Keeps the adjusted
/// amount (three amounts combined) well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Why an amount answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountRejection {
    #[error("no amount given")]
    Empty,

    #[error("{0:?} is not a number")]
    NotANumber(String),

    #[error("{0:?} is out of range")]
    OutOfRange(String),
}

/// Why a filing status answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilingStatusRejection {
    #[error("no filing status given")]
    Empty,

    #[error("{0:?} is not one of the menu options 1-4")]
    UnknownOption(String),
}

/// Parse a money amount such as `80000`, `$5,000` or `1234.56`.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountRejection::Empty);
    }

    let caps = AMOUNT_PATTERN
        .captures(trimmed)
        .ok_or_else(|| AmountRejection::NotANumber(trimmed.to_string()))?;

    let sign = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let digits = caps.get(2).map(|m| m.as_str()).unwrap_or("").replace(',', "");

    let amount = Decimal::from_str(&format!("{}{}", if sign == "-" { "-" } else { "" }, digits))
        .map_err(|_| AmountRejection::OutOfRange(trimmed.to_string()))?;
    if amount.abs() > MAX_AMOUNT {
        return Err(AmountRejection::OutOfRange(trimmed.to_string()));
    }
    Ok(amount)
}

/// Parse a filing status menu answer: `1`-`4`, or the option's label.
pub fn parse_filing_status(input: &str) -> Result<FilingStatus, FilingStatusRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FilingStatusRejection::Empty);
    }

    if let Ok(choice) = trimmed.parse::<u8>() {
        return FilingStatus::from_choice(choice)
            .ok_or_else(|| FilingStatusRejection::UnknownOption(trimmed.to_string()));
    }

    FilingStatus::ALL
        .into_iter()
        .find(|status| status.label().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| FilingStatusRejection::UnknownOption(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn plain_integers() {
        assert_eq!(parse_amount("80000"), Ok(dec!(80000)));
        assert_eq!(parse_amount("  2000 "), Ok(dec!(2000)));
        assert_eq!(parse_amount("0"), Ok(dec!(0)));
    }

    #[test]
    fn decorated_amounts() {
        assert_eq!(parse_amount("$5,000"), Ok(dec!(5000)));
        assert_eq!(parse_amount("1,234,567.89"), Ok(dec!(1234567.89)));
        assert_eq!(parse_amount(".5"), Ok(dec!(0.5)));
        assert_eq!(parse_amount("-250"), Ok(dec!(-250)));
        assert_eq!(parse_amount("+250"), Ok(dec!(250)));
    }

    #[test]
    fn rejects_non_numbers() {
        for input in ["abc", "12abc", "1e5", "0x10", "Infinity", "NaN", "1,23", "1.2.3", "$", "-"] {
            assert!(
                matches!(parse_amount(input), Err(AmountRejection::NotANumber(_))),
                "{input:?} should be rejected"
            );
        }
        assert_eq!(parse_amount("   "), Err(AmountRejection::Empty));
    }

    #[test]
    fn rejects_overflow() {
        let huge = "9".repeat(40);
        assert!(matches!(parse_amount(&huge), Err(AmountRejection::OutOfRange(_))));
    }

    #[test]
    fn bounds_amount_magnitude() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
        assert_eq!(parse_amount("1000000000000000"), Ok(MAX_AMOUNT));
        assert_eq!(parse_amount("-1,000,000,000,000,000"), Ok(-MAX_AMOUNT));
        for input in [
            "1000000000000000.01",
            "-1000000000000001",
            "79228162514264337593543950335",
            "-79228162514264337593543950335",
        ] {
            assert!(
                matches!(parse_amount(input), Err(AmountRejection::OutOfRange(_))),
                "{input:?} should be out of range"
            );
        }
    }

    #[test]
    fn filing_status_numbers() {
        assert_eq!(parse_filing_status("1"), Ok(FilingStatus::Single));
        assert_eq!(parse_filing_status(" 3 "), Ok(FilingStatus::MarriedFilingJointly));
        assert_eq!(parse_filing_status("4"), Ok(FilingStatus::MarriedFilingSeparately));
    }

    #[test]
    fn filing_status_out_of_menu() {
        for input in ["0", "5", "-1", "300", "3abc", "2.0"] {
            assert!(
                matches!(parse_filing_status(input), Err(FilingStatusRejection::UnknownOption(_))),
                "{input:?} should be rejected"
            );
        }
        assert_eq!(parse_filing_status(""), Err(FilingStatusRejection::Empty));
    }

    #[test]
    fn filing_status_labels() {
        assert_eq!(parse_filing_status("single"), Ok(FilingStatus::Single));
        assert_eq!(
            parse_filing_status("Head of Household"),
            Ok(FilingStatus::HeadOfHousehold)
        );
    }
}
