//! Dashboard state: the loaded dataset, one filter per card, and the
//! statistics derived from them.
//!
//! Every statistic and the table rows are recomputed in full from the
//! in-memory collection on each call. Loading goes through numbered fetch
//! tickets so that a slow, superseded fetch can never overwrite the result
//! of a newer one.

use rust_decimal::Decimal;

use crate::aggregate::{Summary, summarize};
use crate::combine::{Card, EffectiveFilterSpec, MergeTable};
use crate::error::Result;
use crate::filter::{FilterKey, FilterSpec, filter_collection};
use crate::gateway::DatasetGateway;
use crate::models::Transaction;

/// Lifecycle of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// A fetch is in flight and no data is available yet.
    Loading,
    /// The dataset was fetched; it may be empty.
    Ready(Vec<Transaction>),
    /// The last fetch failed; holds the message shown to the user.
    Failed(String),
}

/// Identifies one fetch attempt.
///
/// Only the ticket of the most recent [`Dashboard::begin_fetch`] is
/// accepted by [`Dashboard::complete_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Dashboard state owning the dataset and the per-card filters.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use txn_dashboard::combine::Card;
/// use txn_dashboard::dashboard::Dashboard;
/// use txn_dashboard::filter::FilterKey;
/// use txn_dashboard::models::Transaction;
///
/// let rows: Vec<Transaction> = serde_json::from_str(
///     r#"[{"id": 1, "sender": "Alice", "transferTime": "15/01/2024", "amount": "100"},
///         {"id": 2, "sender": "Bob", "transferTime": "20/02/2024", "amount": "50"}]"#,
/// )
/// .unwrap();
///
/// let mut dashboard = Dashboard::new();
/// let ticket = dashboard.begin_fetch();
/// assert!(dashboard.complete_fetch(ticket, Ok(rows)));
///
/// dashboard.on_filter_change(Card::Total, FilterKey::Month, "2024-01");
/// assert_eq!(dashboard.total(), Decimal::from(100));
/// assert_eq!(dashboard.average(), Decimal::from(75));
/// ```
#[derive(Debug)]
pub struct Dashboard {
    /// Current dataset state.
    state: LoadState,
    /// Filter of the total card.
    total_filter: FilterSpec,
    /// Filter of the average card.
    average_filter: FilterSpec,
    /// Rule deriving the table filter from the card filters.
    merge_table: MergeTable,
    /// Number of the most recently issued fetch.
    generation: u64,
}

impl Default for Dashboard {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Creates a dashboard with the standard card wiring
    /// ([`MergeTable::dashboard`]) and no data.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_merge_table(MergeTable::dashboard())
    }

    /// Creates a dashboard with a custom merge table.
    #[inline]
    #[must_use]
    pub fn with_merge_table(merge_table: MergeTable) -> Self {
        Self {
            state: LoadState::Loading,
            total_filter: FilterSpec::new(),
            average_filter: FilterSpec::new(),
            merge_table,
            generation: 0,
        }
    }

    /// Current dataset state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// The loaded rows; empty while loading or after a failure.
    #[inline]
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        match self.state {
            LoadState::Ready(ref rows) => rows,
            LoadState::Loading | LoadState::Failed(_) => &[],
        }
    }

    /// Starts a fetch attempt and returns its ticket.
    ///
    /// Any earlier ticket becomes stale.
    #[inline]
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        tracing::debug!(generation = self.generation, "fetch started");
        FetchTicket(self.generation)
    }

    /// Applies the outcome of a fetch.
    ///
    /// Returns `false` and leaves the state untouched if `ticket` belongs to
    /// a superseded attempt.
    #[inline]
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<Transaction>>,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::warn!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }
        self.state = match outcome {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "fetch completed");
                LoadState::Ready(rows)
            }
            Err(err) => {
                tracing::debug!(error = %err, "fetch failed");
                LoadState::Failed(err.to_string())
            }
        };
        true
    }

    /// Fetches the dataset through `gateway`, replacing the current state.
    ///
    /// Failures are recorded in [`LoadState::Failed`]; calling this again
    /// retries.
    #[inline]
    pub fn reload<G: DatasetGateway>(&mut self, gateway: &G) {
        let ticket = self.begin_fetch();
        let outcome = gateway.fetch();
        let _applied = self.complete_fetch(ticket, outcome);
    }

    /// Filter currently owned by `card`.
    #[inline]
    #[must_use]
    pub const fn filter(&self, card: Card) -> &FilterSpec {
        match card {
            Card::Total => &self.total_filter,
            Card::Average => &self.average_filter,
        }
    }

    /// Sets one field of `card`'s filter; an empty `value` clears it.
    ///
    /// The card's spec is replaced with a new one rather than edited in
    /// place.
    #[inline]
    pub fn on_filter_change<T: Into<String>>(&mut self, card: Card, key: FilterKey, value: T) {
        let next = self.filter(card).with(key, value);
        tracing::trace!(
            card = card.label(),
            key = key.as_str(),
            value = next.get(key),
            "filter changed"
        );
        *self.filter_mut(card) = next;
    }

    /// Clears every field of `card`'s filter. Calling it again is a no-op.
    #[inline]
    pub fn clear_all(&mut self, card: Card) {
        for key in FilterKey::ALL {
            self.on_filter_change(card, key, "");
        }
    }

    /// Rows passing `card`'s own filter, in dataset order.
    #[inline]
    #[must_use]
    pub fn card_rows(&self, card: Card) -> Vec<&Transaction> {
        filter_collection(self.transactions(), self.filter(card))
    }

    /// Count, sum and average over `card`'s rows.
    #[inline]
    #[must_use]
    pub fn card_summary(&self, card: Card) -> Summary {
        summarize(&self.card_rows(card))
    }

    /// Sum shown on the total card.
    #[inline]
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.card_summary(Card::Total).sum
    }

    /// Average shown on the average card.
    #[inline]
    #[must_use]
    pub fn average(&self) -> Decimal {
        self.card_summary(Card::Average).average
    }

    /// Filter applied to the shared table.
    #[inline]
    #[must_use]
    pub fn effective_filter(&self) -> EffectiveFilterSpec {
        self.merge_table.combine(&[
            (Card::Total, &self.total_filter),
            (Card::Average, &self.average_filter),
        ])
    }

    /// Rows of the shared table, in dataset order.
    #[inline]
    #[must_use]
    pub fn table_rows(&self) -> Vec<&Transaction> {
        self.effective_filter().filter(self.transactions())
    }

    /// Mutable slot of `card`'s filter.
    const fn filter_mut(&mut self, card: Card) -> &mut FilterSpec {
        match card {
            Card::Total => &mut self.total_filter,
            Card::Average => &mut self.average_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::FetchError;
    use crate::models::TransactionId;

    fn tx(id: i64, sender: &str, transfer_time: Option<&str>, amount: Option<&str>) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            bank_name: None,
            sender: sender.to_owned(),
            receiver: Some("Shop".to_owned()),
            transfer_time: transfer_time.map(ToOwned::to_owned),
            amount: amount.map(ToOwned::to_owned),
            txn_hash: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(1, "Alice", Some("15/01/2024 10:00:00"), Some("100")),
            tx(2, "Bob", Some("20/01/2024 12:00:00"), Some("50")),
            tx(3, "Alice", Some("03/02/2024"), Some("30")),
            tx(4, "Carol", Some("garbage"), Some("abc")),
        ]
    }

    fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new();
        let ticket = dashboard.begin_fetch();
        assert!(dashboard.complete_fetch(ticket, Ok(sample())));
        dashboard
    }

    fn ids(rows: &[&Transaction]) -> Vec<i64> {
        rows.iter().map(|row| row.id.into_inner()).collect()
    }

    /// Gateway returning queued results in order.
    #[derive(Debug)]
    struct QueuedGateway {
        /// Remaining results.
        results: Mutex<Vec<Result<Vec<Transaction>>>>,
    }

    impl DatasetGateway for QueuedGateway {
        fn fetch(&self) -> Result<Vec<Transaction>> {
            self.results.lock().unwrap().remove(0)
        }
    }

    #[test]
    fn unfiltered_statistics_cover_everything() {
        let dashboard = loaded();
        assert_eq!(dashboard.total(), Decimal::from(180));
        assert_eq!(dashboard.average(), Decimal::from(45));
        assert_eq!(ids(&dashboard.table_rows()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn cards_filter_independently() {
        let mut dashboard = loaded();
        dashboard.on_filter_change(Card::Total, FilterKey::Month, "2024-01");
        dashboard.on_filter_change(Card::Average, FilterKey::Sender, "alice");

        assert_eq!(dashboard.total(), Decimal::from(150));
        assert_eq!(dashboard.average(), Decimal::from(65));
        let total = dashboard.card_summary(Card::Total);
        assert_eq!(total.count, 2);
    }

    #[test]
    fn table_uses_effective_filter() {
        let mut dashboard = loaded();
        dashboard.on_filter_change(Card::Total, FilterKey::Month, "2024-01");
        dashboard.on_filter_change(Card::Average, FilterKey::Month, "2024-02");
        dashboard.on_filter_change(Card::Average, FilterKey::Sender, "alice");

        assert_eq!(dashboard.effective_filter().get(FilterKey::Month), "2024-01");
        assert_eq!(ids(&dashboard.table_rows()), vec![1]);
    }

    #[test]
    fn empty_result_yields_zero_statistics() {
        let mut dashboard = loaded();
        dashboard.on_filter_change(Card::Total, FilterKey::Date, "1999-01-01");
        dashboard.on_filter_change(Card::Average, FilterKey::Sender, "nobody");
        assert_eq!(dashboard.total(), Decimal::ZERO);
        assert_eq!(dashboard.average(), Decimal::ZERO);
    }

    #[test]
    fn clear_all_restores_unfiltered_values_and_is_idempotent() {
        let mut dashboard = loaded();
        dashboard.on_filter_change(Card::Total, FilterKey::Month, "2024-01");
        dashboard.on_filter_change(Card::Average, FilterKey::Sender, "bob");
        dashboard.clear_all(Card::Total);
        dashboard.clear_all(Card::Average);
        dashboard.clear_all(Card::Average);

        assert!(dashboard.filter(Card::Total).is_empty());
        assert!(dashboard.filter(Card::Average).is_empty());
        assert_eq!(dashboard.total(), Decimal::from(180));
        assert_eq!(dashboard.average(), Decimal::from(45));
        assert_eq!(ids(&dashboard.table_rows()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn no_data_behaves_as_empty_collection() {
        let dashboard = Dashboard::new();
        assert_eq!(dashboard.state(), &LoadState::Loading);
        assert_eq!(dashboard.total(), Decimal::ZERO);
        assert_eq!(dashboard.average(), Decimal::ZERO);
        assert!(dashboard.table_rows().is_empty());
    }

    #[test]
    fn stale_fetch_does_not_overwrite_newer_one() {
        let mut dashboard = Dashboard::new();
        let first = dashboard.begin_fetch();
        let second = dashboard.begin_fetch();

        assert!(dashboard.complete_fetch(second, Ok(sample())));
        assert!(!dashboard.complete_fetch(first, Ok(Vec::new())));
        assert_eq!(dashboard.transactions().len(), 4);
    }

    #[test]
    fn stale_failure_is_ignored_while_loading() {
        let mut dashboard = Dashboard::new();
        let first = dashboard.begin_fetch();
        let _second = dashboard.begin_fetch();

        let stale = Err(FetchError::Api {
            status: 500,
            message: "boom".to_owned(),
        });
        assert!(!dashboard.complete_fetch(first, stale));
        assert_eq!(dashboard.state(), &LoadState::Loading);
    }

    #[test]
    fn reload_records_failure_then_recovers() {
        let gateway = QueuedGateway {
            results: Mutex::new(vec![
                Err(FetchError::AccessDenied {
                    status: 401,
                    message: "Invalid API key".to_owned(),
                }),
                Ok(sample()),
            ]),
        };
        let mut dashboard = Dashboard::new();

        dashboard.reload(&gateway);
        assert!(
            matches!(dashboard.state(), LoadState::Failed(message) if message.contains("access denied"))
        );
        assert!(dashboard.transactions().is_empty());

        dashboard.reload(&gateway);
        assert_eq!(dashboard.transactions().len(), 4);
    }

    #[test]
    fn empty_dataset_is_ready_not_failed() {
        let mut dashboard = Dashboard::new();
        let ticket = dashboard.begin_fetch();
        assert!(dashboard.complete_fetch(ticket, Ok(Vec::new())));
        assert_eq!(dashboard.state(), &LoadState::Ready(Vec::new()));
    }

    #[test]
    fn filters_survive_reload() {
        let mut dashboard = loaded();
        dashboard.on_filter_change(Card::Total, FilterKey::Month, "2024-02");
        let ticket = dashboard.begin_fetch();
        assert!(dashboard.complete_fetch(ticket, Ok(sample())));
        assert_eq!(dashboard.total(), Decimal::from(30));
    }
}
