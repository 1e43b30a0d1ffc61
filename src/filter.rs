//! Per-card filter specifications and the predicates that apply them.
//!
//! A [`FilterSpec`] holds one string per [`FilterKey`]; an empty string
//! leaves that field inactive. Every active field must match for a
//! transaction to pass.

use crate::models::Transaction;

/// The fields a filter can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    /// Year and month of the transfer time (`YYYY-MM`).
    Month,
    /// Calendar day of the transfer time (`YYYY-MM-DD`).
    Date,
    /// Case-insensitive substring of the sender name.
    Sender,
    /// Case-insensitive substring of the receiver name.
    Receiver,
}

impl FilterKey {
    /// Every key, in display order.
    pub const ALL: [Self; 4] = [Self::Month, Self::Date, Self::Sender, Self::Receiver];

    /// Wire name of the key, as used by UI callbacks.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Date => "date",
            Self::Sender => "sender",
            Self::Receiver => "receiver",
        }
    }
}

impl core::fmt::Display for FilterKey {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`FilterKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter key: {0}")]
pub struct UnknownFilterKey(String);

impl core::str::FromStr for FilterKey {
    type Err = UnknownFilterKey;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownFilterKey(s.to_owned()))
    }
}

/// Filter values for one card.
///
/// Edits go through [`FilterSpec::with`], which returns a new spec; a spec
/// held by one consumer never changes under it.
///
/// # Examples
///
/// ```
/// use txn_dashboard::filter::{FilterKey, FilterSpec};
///
/// let spec = FilterSpec::new()
///     .with(FilterKey::Month, "2024-01")
///     .with(FilterKey::Sender, "alice");
/// assert_eq!(spec.get(FilterKey::Month), "2024-01");
/// assert!(!spec.is_empty());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    /// `YYYY-MM`, or empty.
    month: String,
    /// `YYYY-MM-DD`, or empty.
    date: String,
    /// Sender substring, or empty.
    sender: String,
    /// Receiver substring, or empty.
    receiver: String,
}

impl FilterSpec {
    /// Creates an empty spec that matches every transaction.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this spec with `key` set to `value`.
    ///
    /// An empty `value` clears the field.
    #[inline]
    #[must_use]
    pub fn with<T: Into<String>>(&self, key: FilterKey, value: T) -> Self {
        let mut next = self.clone();
        *next.slot_mut(key) = value.into();
        next
    }

    /// Current value of `key`; empty when inactive.
    #[inline]
    #[must_use]
    pub fn get(&self, key: FilterKey) -> &str {
        match key {
            FilterKey::Month => &self.month,
            FilterKey::Date => &self.date,
            FilterKey::Sender => &self.sender,
            FilterKey::Receiver => &self.receiver,
        }
    }

    /// Returns `true` if no field is active.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.into_iter().all(|key| self.get(key).is_empty())
    }

    /// Returns `true` if the transaction satisfies every active field.
    ///
    /// A transaction whose transfer time cannot be normalized fails any
    /// active month or date field.
    #[inline]
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_when(tx) && self.matches_sender(tx) && self.matches_receiver(tx)
    }

    /// Mutable access to the storage of `key`.
    const fn slot_mut(&mut self, key: FilterKey) -> &mut String {
        match key {
            FilterKey::Month => &mut self.month,
            FilterKey::Date => &mut self.date,
            FilterKey::Sender => &mut self.sender,
            FilterKey::Receiver => &mut self.receiver,
        }
    }

    /// Checks month and date criteria, normalizing the transfer time only
    /// when one of them is active.
    fn matches_when(&self, tx: &Transaction) -> bool {
        if self.month.is_empty() && self.date.is_empty() {
            return true;
        }
        let Some(when) = tx.transfer_date().parsed() else {
            tracing::trace!(id = %tx.id, "unparseable transfer time under date filter");
            return false;
        };
        let month_ok = self.month.is_empty() || when.month_key() == self.month;
        let date_ok = self.date.is_empty() || when.day_key() == self.date;
        if !(month_ok && date_ok) {
            tracing::trace!(id = %tx.id, month_ok, date_ok, "rejected by date filter");
        }
        month_ok && date_ok
    }

    /// Checks sender criteria.
    fn matches_sender(&self, tx: &Transaction) -> bool {
        self.sender.is_empty() || contains_folded(&tx.sender, &self.sender)
    }

    /// Checks receiver criteria; an absent receiver never matches.
    fn matches_receiver(&self, tx: &Transaction) -> bool {
        self.receiver.is_empty()
            || tx
                .receiver
                .as_deref()
                .is_some_and(|receiver| contains_folded(receiver, &self.receiver))
    }
}

/// Case-insensitive substring test.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Returns the transactions matching `spec`, in their original order.
#[inline]
#[must_use]
pub fn filter_collection<'tx>(
    transactions: &'tx [Transaction],
    spec: &FilterSpec,
) -> Vec<&'tx Transaction> {
    transactions.iter().filter(|tx| spec.matches(tx)).collect()
}
