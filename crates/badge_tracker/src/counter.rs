use std::collections::{HashMap, HashSet};

use badge_shared_util::{AccountId, CounterSourceId};

/// Collects the unread counters that individual features report, so the host can
/// show combined badges per account and for the whole app.
pub trait BadgeAggregator: Send + Sync {
    /// Declare that `source` will report counts.
    fn register(&self, source: &CounterSourceId);

    fn set_count(&self, source: &CounterSourceId, count: u32, account: &AccountId);
}

#[derive(Debug, Default)]
struct Counters {
    sources: HashSet<CounterSourceId>,
    counts: HashMap<AccountId, HashMap<CounterSourceId, u32>>,
}

/// In-memory [`BadgeAggregator`].
#[derive(Debug, Default)]
pub struct CounterRegistry {
    // std mutex: never held across an await.
    counters: std::sync::Mutex<Counters>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, source: &CounterSourceId) -> bool {
        self.counters.lock().unwrap().sources.contains(source) // unwrap: mutex poisoning is okay
    }

    /// The last count `source` reported for `account`.
    pub fn count(&self, source: &CounterSourceId, account: &AccountId) -> Option<u32> {
        let counters = self.counters.lock().unwrap(); // unwrap: mutex poisoning is okay
        counters.counts.get(account).and_then(|per_source| per_source.get(source)).copied()
    }

    /// Sum of all sources' counts for one account.
    pub fn account_total(&self, account: &AccountId) -> u32 {
        let counters = self.counters.lock().unwrap(); // unwrap: mutex poisoning is okay
        counters.counts.get(account).map(|per_source| per_source.values().sum()).unwrap_or(0)
    }

    /// Sum over every account, as shown on the application icon.
    pub fn app_total(&self) -> u32 {
        let counters = self.counters.lock().unwrap(); // unwrap: mutex poisoning is okay
        counters.counts.values().flat_map(|per_source| per_source.values()).sum()
    }
}

impl BadgeAggregator for CounterRegistry {
    fn register(&self, source: &CounterSourceId) {
        let mut counters = self.counters.lock().unwrap(); // unwrap: mutex poisoning is okay
        if counters.sources.insert(source.clone()) {
            log::debug!("registered badge counter source {}", source);
        }
    }

    fn set_count(&self, source: &CounterSourceId, count: u32, account: &AccountId) {
        let mut counters = self.counters.lock().unwrap(); // unwrap: mutex poisoning is okay
        if !counters.sources.contains(source) {
            log::debug!("ignoring count for unregistered counter source {}", source);
            return;
        }
        counters.counts.entry(account.clone()).or_default().insert(source.clone(), count);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_totals() {
        let registry = CounterRegistry::new();
        let notifications = CounterSourceId::from("notifications");
        let messages = CounterSourceId::from("messages");
        registry.register(&notifications);
        registry.register(&messages);

        registry.set_count(&notifications, 5, &"a".into());
        registry.set_count(&messages, 2, &"a".into());
        registry.set_count(&notifications, 1, &"b".into());

        assert_eq!(registry.count(&notifications, &"a".into()), Some(5));
        assert_eq!(registry.account_total(&"a".into()), 7);
        assert_eq!(registry.account_total(&"b".into()), 1);
        assert_eq!(registry.account_total(&"c".into()), 0);
        assert_eq!(registry.app_total(), 8);

        registry.set_count(&notifications, 0, &"a".into());
        assert_eq!(registry.account_total(&"a".into()), 2);
        assert_eq!(registry.app_total(), 3);
    }

    #[test]
    fn test_unregistered_source_is_ignored() {
        let registry = CounterRegistry::new();
        let source = CounterSourceId::from("notifications");
        assert!(!registry.is_registered(&source));

        registry.set_count(&source, 4, &"a".into());
        assert_eq!(registry.count(&source, &"a".into()), None);
        assert_eq!(registry.app_total(), 0);

        registry.register(&source);
        registry.register(&source);
        assert!(registry.is_registered(&source));
        registry.set_count(&source, 4, &"a".into());
        assert_eq!(registry.count(&source, &"a".into()), Some(4));
    }
}
