use badge_shared_util::AccountId;

use crate::AppEvent;

/// Knows which account is currently logged in.
pub trait SessionRegistry: Send + Sync {
    fn active_account(&self) -> Option<AccountId>;

    fn is_active_account(&self, account: &AccountId) -> bool {
        self.active_account().as_ref() == Some(account)
    }
}

/// In-memory [`SessionRegistry`] holding at most one active account.
#[derive(Debug, Default)]
pub struct Sessions {
    // std mutex: never held across an await.
    active: std::sync::Mutex<Option<AccountId>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active(account: AccountId) -> Self {
        Sessions { active: std::sync::Mutex::new(Some(account)) }
    }

    pub fn login(&self, account: AccountId) {
        log::info!("session started for {}", account);
        *self.active.lock().unwrap() = Some(account); // unwrap: mutex poisoning is okay
    }

    pub fn logout(&self) {
        let previous = self.active.lock().unwrap().take(); // unwrap: mutex poisoning is okay
        if let Some(account) = previous {
            log::info!("session ended for {}", account);
        }
    }

    /// Follow the session-related events of the bus.
    pub fn apply(&self, event: &AppEvent) {
        match event {
            AppEvent::Login { account } => self.login(account.clone()),
            AppEvent::SessionEnded => self.logout(),
            _ => {}
        }
    }
}

impl SessionRegistry for Sessions {
    fn active_account(&self) -> Option<AccountId> {
        self.active.lock().unwrap().clone() // unwrap: mutex poisoning is okay
    }
}
