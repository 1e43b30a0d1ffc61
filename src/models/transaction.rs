//! Transaction model.

use serde::{Deserialize, Deserializer, Serialize};

use super::TransactionId;
use crate::date::{NormalizedDate, normalize};

/// A transfer between two parties as stored in the data store.
///
/// Rows are read-only once received: filtering and aggregation only derive
/// values from these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique row identifier.
    pub id: TransactionId,
    /// Display name of the bank.
    #[serde(default, alias = "bank_name")]
    pub bank_name: Option<String>,
    /// Sender name.
    pub sender: String,
    /// Receiver name.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Raw transfer timestamp, day-first (`DD/MM/YYYY HH:MM:SS`).
    #[serde(default, alias = "transfer_time")]
    pub transfer_time: Option<String>,
    /// Decimal amount as text.
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: Option<String>,
    /// Opaque transaction hash.
    #[serde(default, alias = "txn_hash")]
    pub txn_hash: Option<String>,
}

impl Transaction {
    /// Normalizes [`Self::transfer_time`] into a canonical date.
    #[inline]
    #[must_use]
    pub fn transfer_date(&self) -> NormalizedDate {
        normalize(self.transfer_time.as_deref())
    }
}

/// Amount as it may arrive on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    /// Textual decimal, the documented shape.
    Text(String),
    /// Bare JSON number, produced for `numeric` columns.
    Number(serde_json::Number),
}

/// Accepts a string, a number or `null` for the `amount` column and keeps
/// the textual form.
fn amount_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        RawAmount::Text(text) => text,
        RawAmount::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_camel_case_row() {
        let json = r#"{
            "id": 1,
            "bankName": "First Bank",
            "sender": "Alice",
            "receiver": "Bob",
            "transferTime": "15/01/2024 10:00:00",
            "amount": "100.50",
            "txnHash": "0xabc"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, TransactionId::new(1));
        assert_eq!(tx.bank_name.as_deref(), Some("First Bank"));
        assert_eq!(tx.sender, "Alice");
        assert_eq!(tx.transfer_time.as_deref(), Some("15/01/2024 10:00:00"));
        assert_eq!(tx.amount.as_deref(), Some("100.50"));
    }

    #[test]
    fn deserialize_snake_case_row_with_missing_optionals() {
        let json = r#"{
            "id": 2,
            "bank_name": null,
            "sender": "Carol",
            "transfer_time": "01/02/2024"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.bank_name, None);
        assert_eq!(tx.receiver, None);
        assert_eq!(tx.transfer_time.as_deref(), Some("01/02/2024"));
        assert_eq!(tx.amount, None);
        assert_eq!(tx.txn_hash, None);
    }

    #[test]
    fn deserialize_numeric_amount_keeps_text() {
        let json = r#"{"id": 3, "sender": "Dave", "amount": 250.75}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount.as_deref(), Some("250.75"));
    }

    #[test]
    fn deserialize_requires_sender() {
        let json = r#"{"id": 4, "amount": "1"}"#;
        let result = serde_json::from_str::<Transaction>(json);
        assert!(result.is_err());
    }

    #[test]
    fn transfer_date_is_day_first() {
        let json = r#"{"id": 5, "sender": "Eve", "transferTime": "05/03/2024"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        let date = tx.transfer_date();
        let parsed = date.parsed().unwrap();
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 5);
    }
}
