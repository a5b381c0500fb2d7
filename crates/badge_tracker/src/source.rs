use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use badge_shared_util::AccountId;
use futures::{future::BoxFuture, FutureExt};

use crate::FetchError;

/// Provides the authoritative unread-notification count of an account.
///
/// The returned future owns everything it needs, so it can be awaited from a spawned task.
pub trait CountSource: Send + Sync {
    fn unread_count(&self, account: &AccountId) -> BoxFuture<'static, Result<u32, FetchError>>;
}

/// [`CountSource`] answering from a table of known counts.
///
/// Accounts without an entry, and accounts marked as failing, produce an error.
/// An optional delay simulates a slow backend.
#[derive(Debug, Default)]
pub struct FixedCounts {
    counts: std::sync::Mutex<HashMap<AccountId, u32>>,
    failing: std::sync::Mutex<HashSet<AccountId>>,
    delay: Duration,
}

impl FixedCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: HashMap<AccountId, u32>) -> Self {
        FixedCounts { counts: std::sync::Mutex::new(counts), ..Self::default() }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_count(&self, account: AccountId, count: u32) {
        self.counts.lock().unwrap().insert(account, count); // unwrap: mutex poisoning is okay
    }

    /// Make every fetch for `account` fail until this is called again with `false`.
    pub fn set_failing(&self, account: AccountId, failing: bool) {
        let mut failing_accounts = self.failing.lock().unwrap(); // unwrap: mutex poisoning is okay
        if failing {
            failing_accounts.insert(account);
        } else {
            failing_accounts.remove(&account);
        }
    }

    fn lookup(&self, account: &AccountId) -> Result<u32, FetchError> {
        let is_failing = self.failing.lock().unwrap().contains(account); // unwrap: mutex poisoning is okay
        if is_failing {
            return Err(FetchError::Unavailable(format!("fetching notifications of {} failed", account)));
        }
        let counts = self.counts.lock().unwrap(); // unwrap: mutex poisoning is okay
        counts.get(account).copied().ok_or_else(|| FetchError::UnknownAccount(account.clone()))
    }
}

impl CountSource for FixedCounts {
    fn unread_count(&self, account: &AccountId) -> BoxFuture<'static, Result<u32, FetchError>> {
        let result = self.lookup(account);
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
        .boxed()
    }
}
