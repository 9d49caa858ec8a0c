use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::audit::ActivityLogResponse;

pub use crate::entities::journal_entries::EntryType;

fn default_decimal() -> Decimal {
    Decimal::ZERO
}

/// One debit/credit line as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineInput {
    pub account: String,
    #[serde(default = "default_decimal")]
    pub debit: Decimal,
    #[serde(default = "default_decimal")]
    pub credit: Decimal,
    #[serde(default)]
    pub memo: String,
}

impl LineInput {
    /// Per-line invariant: amounts non-negative, never debit and credit together.
    pub fn validate(&self) -> AppResult<()> {
        if self.debit < Decimal::ZERO || self.credit < Decimal::ZERO {
            return Err(AppError::InvalidLine(
                "Debit and credit amounts must be non-negative".to_string(),
            ));
        }
        if self.debit > Decimal::ZERO && self.credit > Decimal::ZERO {
            return Err(AppError::InvalidLine(
                "A line cannot have both debit and credit amounts".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn total_debit(lines: &[LineInput]) -> Decimal {
    lines.iter().map(|l| l.debit).sum()
}

pub fn total_credit(lines: &[LineInput]) -> Decimal {
    lines.iter().map(|l| l.credit).sum()
}

/// Entry-level invariant: every line valid, totals balanced exactly.
/// An empty line set is skipped; the balance only applies once lines exist.
pub fn validate_lines(lines: &[LineInput]) -> AppResult<()> {
    if lines.is_empty() {
        return Ok(());
    }
    for line in lines {
        line.validate()?;
    }
    let debit = total_debit(lines);
    let credit = total_credit(lines);
    if debit != credit {
        return Err(AppError::ImbalancedEntry { debit, credit });
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEntryRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub reference: String,
    pub description: String,
    pub entry_type: EntryType,
    pub lines: Vec<LineInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateEntryRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub reference: String,
    pub description: String,
    pub entry_type: Option<EntryType>,
    pub lines: Vec<LineInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn account(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

/// Simplified sale form: expands to debit Cash/Card, credit Revenue.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaleRequest {
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub description: String,
    #[serde(default)]
    pub reference: String,
}

/// Simplified expense form: expands to debit <category>, credit Cash/Card.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseRequest {
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub reference: String,
}

/// List/export filters. `period` is one of day/week/month/year; `date`
/// accompanies `period=day`. The explicit range wins over nothing set.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EntryFilter {
    pub period: Option<String>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryLineResponse {
    pub id: i64,
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub memo: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryResponse {
    pub id: i64,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub entry_type: EntryType,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryDetailResponse {
    #[serde(flatten)]
    pub entry: EntryResponse,
    pub lines: Vec<EntryLineResponse>,
    pub activity: Vec<ActivityLogResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(account: &str, debit: Decimal, credit: Decimal) -> LineInput {
        LineInput {
            account: account.to_string(),
            debit,
            credit,
            memo: String::new(),
        }
    }

    #[test]
    fn test_balanced_lines_pass() {
        let lines = vec![
            line("Cash", dec!(100.00), dec!(0)),
            line("Revenue", dec!(0), dec!(100.00)),
        ];
        assert!(validate_lines(&lines).is_ok());
        assert_eq!(total_debit(&lines), dec!(100.00));
        assert_eq!(total_credit(&lines), dec!(100.00));
    }

    #[test]
    fn test_imbalanced_lines_fail() {
        let lines = vec![
            line("Cash", dec!(100.00), dec!(0)),
            line("Revenue", dec!(0), dec!(99.99)),
        ];
        match validate_lines(&lines) {
            Err(AppError::ImbalancedEntry { debit, credit }) => {
                assert_eq!(debit, dec!(100.00));
                assert_eq!(credit, dec!(99.99));
            }
            other => panic!("expected ImbalancedEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_line_with_both_sides_fails() {
        let l = line("Cash", dec!(50), dec!(50));
        assert!(matches!(l.validate(), Err(AppError::InvalidLine(_))));
        // the entry-level check catches it too, even though totals balance
        assert!(matches!(
            validate_lines(&[l]),
            Err(AppError::InvalidLine(_))
        ));
    }

    #[test]
    fn test_negative_amount_fails() {
        let l = line("Cash", dec!(-1), dec!(0));
        assert!(matches!(l.validate(), Err(AppError::InvalidLine(_))));
    }

    #[test]
    fn test_empty_line_set_skipped() {
        // creation window: an entry with no lines yet is not balance-checked
        assert!(validate_lines(&[]).is_ok());
    }

    #[test]
    fn test_multi_line_balance_is_exact() {
        let lines = vec![
            line("Cash", dec!(33.33), dec!(0)),
            line("Card", dec!(66.67), dec!(0)),
            line("Revenue", dec!(0), dec!(100.00)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }
}
