//! Sum and average of transaction amounts.
//!
//! Amounts arrive as text. Absent or unreadable amounts count as zero so a
//! single bad row never blanks a statistic. Results are exact decimals;
//! rounding for display is left to the caller.

use core::borrow::Borrow;
use core::str::FromStr as _;

use rust_decimal::Decimal;

use crate::models::Transaction;

/// Statistics over one filtered collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of transactions considered.
    pub count: usize,
    /// Sum of the amounts.
    pub sum: Decimal,
    /// Mean of the amounts; zero for an empty collection.
    pub average: Decimal,
    /// Transactions whose amount was absent or unreadable and counted as
    /// zero.
    pub malformed: usize,
}

/// Parses an amount, returning zero when it is absent or not a decimal
/// number.
///
/// Plain (`"12.50"`, `"-3"`) and scientific (`"1e3"`) notation are accepted;
/// surrounding whitespace is ignored. Digit separators (`"1_000"`) are not.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use txn_dashboard::aggregate::parse_amount;
///
/// assert_eq!(parse_amount(Some("100")), Decimal::from(100));
/// assert_eq!(parse_amount(Some("abc")), Decimal::ZERO);
/// assert_eq!(parse_amount(None), Decimal::ZERO);
/// ```
#[inline]
#[must_use]
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    try_parse_amount(raw).unwrap_or(Decimal::ZERO)
}

/// Parses an amount, `None` when absent or unreadable.
fn try_parse_amount(raw: Option<&str>) -> Option<Decimal> {
    let text = raw?.trim();
    if text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Sum of the amounts; zero for an empty collection.
#[inline]
#[must_use]
pub fn sum<T: Borrow<Transaction>>(transactions: &[T]) -> Decimal {
    summarize(transactions).sum
}

/// Mean of the amounts; zero for an empty collection.
#[inline]
#[must_use]
pub fn average<T: Borrow<Transaction>>(transactions: &[T]) -> Decimal {
    summarize(transactions).average
}

/// Computes count, sum, average and the number of zero-fallback amounts in
/// one pass.
///
/// An amount that would overflow the running sum is counted as zero and as
/// malformed, like an unreadable one.
#[inline]
#[must_use]
pub fn summarize<T: Borrow<Transaction>>(transactions: &[T]) -> Summary {
    let mut summary = Summary::default();
    for item in transactions {
        let tx = item.borrow();
        summary.count += 1;
        let added = try_parse_amount(tx.amount.as_deref())
            .and_then(|amount| summary.sum.checked_add(amount));
        match added {
            Some(next) => summary.sum = next,
            None => {
                summary.malformed += 1;
                tracing::debug!(
                    id = %tx.id,
                    amount = tx.amount.as_deref().unwrap_or("<absent>"),
                    "amount counted as zero"
                );
            }
        }
    }
    summary.average = mean(summary.sum, summary.count);
    summary
}

/// `total / count`, or zero when `count` is zero.
fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    total
        .checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;

    fn with_amount(id: i64, amount: Option<&str>) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            bank_name: None,
            sender: "Alice".to_owned(),
            receiver: None,
            transfer_time: Some("15/01/2024 10:00:00".to_owned()),
            amount: amount.map(ToOwned::to_owned),
            txn_hash: None,
        }
    }

    #[test]
    fn empty_collection_is_zero() {
        let empty: Vec<Transaction> = Vec::new();
        assert_eq!(sum(&empty), Decimal::ZERO);
        assert_eq!(average(&empty), Decimal::ZERO);
        assert_eq!(summarize(&empty), Summary::default());
    }

    #[test]
    fn average_of_two() {
        let txs = vec![with_amount(1, Some("100")), with_amount(2, Some("50"))];
        assert_eq!(sum(&txs), Decimal::from(150));
        assert_eq!(average(&txs), Decimal::from(75));
    }

    #[test]
    fn malformed_amount_contributes_zero() {
        let txs = vec![
            with_amount(1, Some("abc")),
            with_amount(2, Some("40")),
            with_amount(3, None),
        ];
        let summary = summarize(&txs);
        assert_eq!(summary.sum, Decimal::from(40));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.malformed, 2);
        assert_eq!(summary.average.round_dp(2), Decimal::new(1333, 2));
    }

    #[test]
    fn decimals_are_exact() {
        let txs = vec![with_amount(1, Some("0.1")), with_amount(2, Some("0.2"))];
        assert_eq!(sum(&txs), Decimal::new(3, 1));
        assert_eq!(average(&txs), Decimal::new(15, 2));
    }

    #[test]
    fn works_on_filtered_references() {
        let txs = vec![with_amount(1, Some("10")), with_amount(2, Some("30"))];
        let refs: Vec<&Transaction> = txs.iter().collect();
        assert_eq!(sum(&refs), Decimal::from(40));
        assert_eq!(average(&refs), Decimal::from(20));
    }

    #[test]
    fn parse_amount_accepts_common_notations() {
        assert_eq!(parse_amount(Some(" 12.50 ")), Decimal::new(1250, 2));
        assert_eq!(parse_amount(Some("-3")), Decimal::from(-3));
        assert_eq!(parse_amount(Some("1e3")), Decimal::from(1000));
        assert_eq!(parse_amount(Some("")), Decimal::ZERO);
        assert_eq!(parse_amount(Some("12abc")), Decimal::ZERO);
        assert_eq!(parse_amount(Some("1_000")), Decimal::ZERO);
    }

    #[test]
    fn overflowing_amount_counts_as_malformed() {
        let max = "79228162514264337593543950335";
        let txs = vec![with_amount(1, Some(max)), with_amount(2, Some(max))];
        let summary = summarize(&txs);
        assert_eq!(summary.sum, Decimal::MAX);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.malformed, 1);
    }
}
