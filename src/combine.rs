//! Merging per-card filters into the filter applied to the shared table.
//!
//! Each card owns its own [`FilterSpec`]. The table shows a single
//! [`EffectiveFilterSpec`] derived from all of them through a [`MergeTable`]:
//! for every field the table lists the cards to consult, in priority order,
//! and the first non-empty value wins. A field with no cards listed is
//! always inactive.

use crate::filter::{FilterKey, FilterSpec, filter_collection};
use crate::models::Transaction;

/// A dashboard card that owns a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Card {
    /// Card showing the sum of the filtered amounts.
    Total,
    /// Card showing the average of the filtered amounts.
    Average,
}

impl Card {
    /// Every card, in display order.
    pub const ALL: [Self; 2] = [Self::Total, Self::Average];

    /// Display label of the card.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::Average => "Average",
        }
    }
}

/// Per-field priority lists deciding which card supplies each field of the
/// effective filter.
///
/// # Examples
///
/// ```
/// use txn_dashboard::combine::{Card, MergeTable};
/// use txn_dashboard::filter::{FilterKey, FilterSpec};
///
/// let total = FilterSpec::new().with(FilterKey::Month, "2024-01");
/// let average = FilterSpec::new().with(FilterKey::Month, "2024-03");
/// let effective = MergeTable::dashboard()
///     .combine(&[(Card::Total, &total), (Card::Average, &average)]);
/// assert_eq!(effective.get(FilterKey::Month), "2024-01");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeTable {
    /// Cards consulted for `month`.
    month: Vec<Card>,
    /// Cards consulted for `date`.
    date: Vec<Card>,
    /// Cards consulted for `sender`.
    sender: Vec<Card>,
    /// Cards consulted for `receiver`.
    receiver: Vec<Card>,
}

impl MergeTable {
    /// Creates a table with no sources; every effective field is inactive.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The dashboard wiring: the total card's month and date take priority
    /// over the average card's, the sender comes only from the average
    /// card, and the receiver is never populated.
    #[inline]
    #[must_use]
    pub fn dashboard() -> Self {
        Self::new()
            .field(FilterKey::Month, &[Card::Total, Card::Average])
            .field(FilterKey::Date, &[Card::Total, Card::Average])
            .field(FilterKey::Sender, &[Card::Average])
    }

    /// Replaces the priority list for `key`.
    #[inline]
    #[must_use]
    pub fn field(mut self, key: FilterKey, cards: &[Card]) -> Self {
        *self.slot_mut(key) = cards.to_vec();
        self
    }

    /// Cards consulted for `key`, highest priority first.
    #[inline]
    #[must_use]
    pub fn priority(&self, key: FilterKey) -> &[Card] {
        match key {
            FilterKey::Month => &self.month,
            FilterKey::Date => &self.date,
            FilterKey::Sender => &self.sender,
            FilterKey::Receiver => &self.receiver,
        }
    }

    /// Merges the card specs into the effective filter.
    ///
    /// For each field, the cards in [`Self::priority`] are consulted in order
    /// and the first non-empty value is taken. Cards missing from `sources`
    /// are skipped; when a card appears more than once, its first entry is
    /// used.
    #[inline]
    #[must_use]
    pub fn combine(&self, sources: &[(Card, &FilterSpec)]) -> EffectiveFilterSpec {
        let merged = FilterKey::ALL
            .into_iter()
            .fold(FilterSpec::new(), |spec, key| {
                match self.first_value(key, sources) {
                    Some(value) => spec.with(key, value),
                    None => spec,
                }
            });
        EffectiveFilterSpec(merged)
    }

    /// First non-empty value for `key` among the prioritized cards.
    fn first_value<'spec>(
        &self,
        key: FilterKey,
        sources: &[(Card, &'spec FilterSpec)],
    ) -> Option<&'spec str> {
        self.priority(key).iter().find_map(|card| {
            sources
                .iter()
                .find(|&&(owner, _)| owner == *card)
                .map(|&(_, spec)| spec.get(key))
                .filter(|value| !value.is_empty())
        })
    }

    /// Mutable access to the priority list of `key`.
    const fn slot_mut(&mut self, key: FilterKey) -> &mut Vec<Card> {
        match key {
            FilterKey::Month => &mut self.month,
            FilterKey::Date => &mut self.date,
            FilterKey::Sender => &mut self.sender,
            FilterKey::Receiver => &mut self.receiver,
        }
    }
}

/// The filter actually applied to the shared table.
///
/// Only [`MergeTable::combine`] produces one; it has no setters and is
/// rebuilt whenever a card's filter changes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct EffectiveFilterSpec(FilterSpec);

impl EffectiveFilterSpec {
    /// Read access to the merged values.
    #[inline]
    #[must_use]
    pub const fn spec(&self) -> &FilterSpec {
        &self.0
    }

    /// Current value of `key`; empty when inactive.
    #[inline]
    #[must_use]
    pub fn get(&self, key: FilterKey) -> &str {
        self.0.get(key)
    }

    /// Returns `true` if the transaction satisfies every merged field.
    #[inline]
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.0.matches(tx)
    }

    /// Returns the matching transactions in their original order.
    #[inline]
    #[must_use]
    pub fn filter<'tx>(&self, transactions: &'tx [Transaction]) -> Vec<&'tx Transaction> {
        filter_collection(transactions, &self.0)
    }
}
