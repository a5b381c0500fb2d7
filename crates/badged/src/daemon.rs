use std::sync::Arc;

use anyhow::{Context, Result};
use badge_tracker::{AppEvent, CounterRegistry, EventBus, MainMenuDelegate, NotificationsBadge, Sessions};
use itertools::Itertools;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::config::BadgedConfig;

/// Composition root: owns the bus, the collaborators and the main menu.
pub struct Daemon {
    bus: EventBus,
    sessions: Arc<Sessions>,
    counters: Arc<CounterRegistry>,
    badge: NotificationsBadge,
    menu: MainMenuDelegate,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon").field("badge", &self.badge).field("menu", &self.menu).finish()
    }
}

impl Daemon {
    pub fn new(config: &BadgedConfig, shutdown: CancellationToken) -> Result<Self> {
        let sessions = Arc::new(Sessions::new());
        if let Some(account) = &config.active_account {
            sessions.login(account.clone());
        }
        let counters = Arc::new(CounterRegistry::new());
        let badge = NotificationsBadge::new(sessions.clone(), Arc::new(config.count_source()), counters.clone());

        let mut menu = MainMenuDelegate::new();
        menu.register_handler(Arc::new(badge.clone())).context("Failed to register the notifications menu entry")?;

        Ok(Daemon { bus: EventBus::new(), sessions, counters, badge, menu, shutdown })
    }

    /// Start listening for events. Needs a running tokio runtime.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        self.badge.initialize(&self.bus, self.shutdown.clone())
    }

    /// The main menu as text, one entry per line, followed by the combined unread count.
    pub fn render_menu(&self) -> String {
        let entries = self.menu.entries().iter().map(|entry| entry.to_string()).join("\n");
        format!("{}\nunread total: {}\n", entries, self.counters.app_total())
    }

    /// Refresh the badge for the active account and wait for the result.
    pub async fn refresh_once(&self) {
        self.badge.refresh(None).await;
    }

    /// Validate an event line, track session changes and publish it on the bus.
    pub fn handle_line(&self, line: &str) -> Result<AppEvent> {
        let event = AppEvent::from_json(line).with_context(|| format!("Ignoring malformed event line `{}`", line))?;
        self.sessions.apply(&event);
        self.bus.publish(event.clone());
        Ok(event)
    }

    /// Feed events from `input` into the bus until it is exhausted or the daemon shuts down,
    /// printing the main menu to `output` after every event and whenever the badge changes.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut badge_changes = self.badge.subscribe();

        self.write_menu(output).await?;
        badge_tracker::loop_select! {
            _ = self.shutdown.cancelled() => break,
            Ok(()) = badge_changes.changed() => {
                self.write_menu(output).await?;
            }
            line = lines.next_line() => match line.context("Failed to read event input")? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match self.handle_line(&line) {
                    Ok(event) => {
                        log::debug!("handled {} event", event.name());
                        self.write_menu(output).await?;
                    }
                    Err(err) => log::error!("{:?}", err),
                },
                None => break,
            },
        }
        Ok(())
    }

    async fn write_menu<W: AsyncWrite + Unpin>(&self, output: &mut W) -> Result<()> {
        output.write_all(self.render_menu().as_bytes()).await.context("Failed to write menu")?;
        output.flush().await.context("Failed to write menu")?;
        Ok(())
    }
}
