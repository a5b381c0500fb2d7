use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use badge_shared_util::{AccountId, CounterSourceId};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{AppEvent, BadgeAggregator, CountSource, EventBus, MainMenuHandler, MenuEntry, SessionRegistry};

/// Name of the notifications entry, also used as its badge counter source.
pub const NOTIFICATIONS_HANDLER_NAME: &str = "notifications";
pub const NOTIFICATIONS_PRIORITY: i32 = 700;

/// What the notifications menu entry currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// Empty, or the unread count as a decimal number.
    pub badge_text: String,
    /// Set until a fetch attempt completes after creation or the last reset.
    pub is_loading: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        DisplayState { badge_text: String::new(), is_loading: true }
    }
}

/// An unread count of zero shows no badge at all.
pub fn badge_text_for(count: u32) -> String {
    if count > 0 {
        count.to_string()
    } else {
        String::new()
    }
}

/// Main menu handler showing the unread notification count of the active account.
///
/// This is a cheap handle: clones share the same state and collaborators.
#[derive(Clone)]
pub struct NotificationsBadge {
    state: Arc<watch::Sender<DisplayState>>,
    initialized: Arc<AtomicBool>,
    counter_source: CounterSourceId,
    sessions: Arc<dyn SessionRegistry>,
    source: Arc<dyn CountSource>,
    counters: Arc<dyn BadgeAggregator>,
}

impl std::fmt::Debug for NotificationsBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationsBadge")
            .field("state", &*self.state.borrow())
            .field("counter_source", &self.counter_source)
            .finish()
    }
}

impl NotificationsBadge {
    pub fn new(sessions: Arc<dyn SessionRegistry>, source: Arc<dyn CountSource>, counters: Arc<dyn BadgeAggregator>) -> Self {
        let (state, _) = watch::channel(DisplayState::default());
        NotificationsBadge {
            state: Arc::new(state),
            initialized: Arc::new(AtomicBool::new(false)),
            counter_source: CounterSourceId::from(NOTIFICATIONS_HANDLER_NAME),
            sessions,
            source,
            counters,
        }
    }

    /// Register the badge counter and start reacting to events from `bus` until `shutdown` is cancelled.
    ///
    /// Only the first call does anything; later calls return `None`.
    /// Returns `None` without initializing when called outside of a tokio runtime.
    pub fn initialize(&self, bus: &EventBus, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("Cannot initialize notifications badge: {}", err);
                return None;
            }
        };
        if self.initialized.swap(true, Ordering::SeqCst) {
            log::warn!("notifications badge is already initialized");
            return None;
        }

        self.counters.register(&self.counter_source);

        let mut events = bus.subscribe();
        let badge = self.clone();
        Some(runtime.spawn(async move {
            log::debug!("notifications badge listening for events");
            crate::loop_select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        badge.handle_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("notifications badge missed {} events, refreshing", skipped);
                        badge.refresh_in_background(None);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
            log::debug!("notifications badge stopped listening for events");
        }))
    }

    /// React to a single event. Returns the spawned refresh, if the event caused one.
    pub fn handle_event(&self, event: &AppEvent) -> Option<JoinHandle<()>> {
        match event {
            AppEvent::ReadChanged { account } | AppEvent::SyncCompleted { account } => {
                self.refresh_in_background(Some(account.clone()))
            }
            AppEvent::SessionEnded => {
                self.reset();
                None
            }
            AppEvent::PushReceived(push) => {
                let site = push.site.as_ref()?;
                if push.is_notification() && self.sessions.is_active_account(site) {
                    self.refresh_in_background(Some(site.clone()))
                } else {
                    log::trace!("ignoring push for {} (notif: {})", site, push.notif);
                    None
                }
            }
            AppEvent::Login { .. } => None,
        }
    }

    /// Current display state.
    pub fn state(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    /// Watch the display state, e.g. to re-render when it changes.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.subscribe()
    }

    /// Go back to the initial, loading state.
    pub fn reset(&self) {
        self.state.send_replace(DisplayState::default());
    }

    /// Start a refresh without waiting for it.
    ///
    /// Returns `None` when called outside of a tokio runtime, in which case nothing happens.
    pub fn refresh_in_background(&self, account: Option<AccountId>) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("Cannot refresh notifications badge: {}", err);
                return None;
            }
        };
        let badge = self.clone();
        Some(runtime.spawn(async move { badge.refresh(account).await }))
    }

    /// Fetch the unread count of `account`, or of the active account, and update the badge.
    ///
    /// Fetch errors clear the badge rather than propagating. Concurrent refreshes are not
    /// coordinated: whichever completes last determines the state.
    pub async fn refresh(&self, account: Option<AccountId>) {
        let account = account.filter(|account| !account.as_str().is_empty()).or_else(|| self.sessions.active_account());
        let Some(account) = account else {
            log::debug!("no active account, not refreshing notifications badge");
            return;
        };

        match self.source.unread_count(&account).await {
            Ok(count) => {
                log::debug!("{} unread notifications for {}", count, account);
                self.state.send_modify(|state| {
                    state.badge_text = badge_text_for(count);
                    state.is_loading = false;
                });
                self.counters.set_count(&self.counter_source, count, &account);
            }
            Err(err) => {
                log::warn!("Failed to fetch unread notifications for {}: {}", account, err);
                self.state.send_modify(|state| {
                    state.badge_text.clear();
                    state.is_loading = false;
                });
            }
        }
    }
}

impl MainMenuHandler for NotificationsBadge {
    fn name(&self) -> &str {
        NOTIFICATIONS_HANDLER_NAME
    }

    fn priority(&self) -> i32 {
        NOTIFICATIONS_PRIORITY
    }

    fn display_data(&self) -> MenuEntry {
        let state = self.state();
        MenuEntry {
            name: NOTIFICATIONS_HANDLER_NAME.to_string(),
            priority: NOTIFICATIONS_PRIORITY,
            icon: "fas-bell".to_string(),
            title: "addon.notifications.notifications".to_string(),
            route: "notifications".to_string(),
            class: "addon-notifications-handler".to_string(),
            show_badge: true,
            badge_text: state.badge_text,
            is_loading: state.is_loading,
        }
    }

    fn request_refresh(&self) {
        self.refresh_in_background(None);
    }
}
