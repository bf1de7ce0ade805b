use std::sync::Arc;

use tokio::sync::watch;

use crate::models::PeriodSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    generation: u64,
    selector: Option<PeriodSelector>,
}

/// Tracks the most recent selector so late responses for older queries can be dropped.
///
/// Last selector change wins: a query is current only if no `select` happened
/// after it began and the active selector is still the one it was started for.
#[derive(Debug, Clone)]
pub struct QueryGuard {
    tx: Arc<watch::Sender<Selection>>,
}

/// Captured at query start; checked when the response arrives.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    rx: watch::Receiver<Selection>,
    generation: u64,
    selector: PeriodSelector,
}

impl Default for QueryGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryGuard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Selection {
            generation: 0,
            selector: None,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Switch to `selector`, invalidating every ticket issued before.
    pub fn select(&self, selector: PeriodSelector) -> u64 {
        self.tx.send_modify(|s| {
            s.generation += 1;
            s.selector = Some(selector);
        });
        self.generation()
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    pub fn current(&self) -> Option<PeriodSelector> {
        self.tx.borrow().selector
    }

    pub fn begin(&self, selector: PeriodSelector) -> QueryTicket {
        let rx = self.tx.subscribe();
        let generation = rx.borrow().generation;
        QueryTicket {
            rx,
            generation,
            selector,
        }
    }
}

impl QueryTicket {
    pub fn selector(&self) -> PeriodSelector {
        self.selector
    }

    pub fn is_current(&self) -> bool {
        let now = *self.rx.borrow();
        now.generation == self.generation
            && now.selector.map_or(true, |active| active == self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_is_current_until_selection_changes() {
        let guard = QueryGuard::new();
        guard.select(PeriodSelector::Today);
        let ticket = guard.begin(PeriodSelector::Today);
        assert!(ticket.is_current());

        guard.select(PeriodSelector::LastDays { days: 7 });
        assert!(!ticket.is_current());
    }

    #[test]
    fn reselecting_the_same_period_still_invalidates() {
        let guard = QueryGuard::new();
        let ticket = guard.begin(PeriodSelector::Today);
        guard.select(PeriodSelector::Today);
        assert!(!ticket.is_current());
        assert!(guard.begin(PeriodSelector::Today).is_current());
    }

    #[test]
    fn query_for_a_selector_other_than_the_active_one_is_stale() {
        let guard = QueryGuard::new();
        guard.select(PeriodSelector::LastDays { days: 7 });
        assert!(!guard.begin(PeriodSelector::Today).is_current());
    }

    #[test]
    fn clones_share_state() {
        let guard = QueryGuard::new();
        let ticket = guard.begin(PeriodSelector::Today);
        guard.clone().select(PeriodSelector::Today);
        assert!(!ticket.is_current());
        assert_eq!(guard.generation(), 1);
        assert_eq!(guard.current(), Some(PeriodSelector::Today));
    }
}
