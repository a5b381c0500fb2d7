use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;

use crate::{Error, Result};

/// Everything the host needs to render one main menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub name: String,
    pub priority: i32,
    pub icon: String,
    /// Untranslated string key.
    pub title: String,
    pub route: String,
    pub class: String,
    pub show_badge: bool,
    pub badge_text: String,
    pub is_loading: bool,
}

impl std::fmt::Display for MenuEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} /{}", self.priority, self.name, self.route)?;
        if self.show_badge {
            if self.is_loading {
                write!(f, " […]")?;
            } else if !self.badge_text.is_empty() {
                write!(f, " [{}]", self.badge_text)?;
            }
        }
        Ok(())
    }
}

/// A feature that contributes an entry to the main menu.
pub trait MainMenuHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Entries with a higher priority are shown first.
    fn priority(&self) -> i32;

    fn is_enabled(&self) -> bool {
        true
    }

    /// Current render data. Must not block or start any work.
    fn display_data(&self) -> MenuEntry;

    /// Ask the handler to bring its badge up to date in the background.
    fn request_refresh(&self) {}
}

/// Registry of [`MainMenuHandler`]s, read by the host when it renders the menu.
#[derive(Default)]
pub struct MainMenuDelegate {
    handlers: Vec<Arc<dyn MainMenuHandler>>,
}

impl std::fmt::Debug for MainMenuDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainMenuDelegate").field("handlers", &self.handlers.iter().map(|h| h.name()).collect_vec()).finish()
    }
}

impl MainMenuDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handler(&mut self, handler: Arc<dyn MainMenuHandler>) -> Result<()> {
        if self.handler(handler.name()).is_some() {
            return Err(Error::DuplicateHandler(handler.name().to_string()));
        }
        log::debug!("registered main menu handler {}", handler.name());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn handler(&self, name: &str) -> Option<&Arc<dyn MainMenuHandler>> {
        self.handlers.iter().find(|handler| handler.name() == name)
    }

    /// Render data of every enabled handler, highest priority first.
    ///
    /// A badge that has not loaded yet gets a background refresh requested; the
    /// returned entry still shows the loading state.
    pub fn entries(&self) -> Vec<MenuEntry> {
        self.handlers
            .iter()
            .filter(|handler| handler.is_enabled())
            .map(|handler| {
                let entry = handler.display_data();
                if entry.show_badge && entry.is_loading {
                    handler.request_refresh();
                }
                entry
            })
            .sorted_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticHandler {
        name: &'static str,
        priority: i32,
        enabled: bool,
        loading: bool,
        refresh_requests: AtomicUsize,
    }

    impl StaticHandler {
        fn new(name: &'static str, priority: i32) -> Self {
            StaticHandler { name, priority, enabled: true, loading: false, refresh_requests: AtomicUsize::new(0) }
        }
    }

    impl MainMenuHandler for StaticHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn display_data(&self) -> MenuEntry {
            MenuEntry {
                name: self.name.to_string(),
                priority: self.priority,
                icon: "fas-star".to_string(),
                title: format!("{}.title", self.name),
                route: self.name.to_string(),
                class: String::new(),
                show_badge: true,
                badge_text: String::new(),
                is_loading: self.loading,
            }
        }

        fn request_refresh(&self) {
            self.refresh_requests.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_entries_sorted_by_priority() {
        let mut delegate = MainMenuDelegate::new();
        delegate.register_handler(Arc::new(StaticHandler::new("calendar", 300))).unwrap();
        delegate.register_handler(Arc::new(StaticHandler::new("notifications", 700))).unwrap();
        delegate.register_handler(Arc::new(StaticHandler::new("blog", 300))).unwrap();
        delegate.register_handler(Arc::new(StaticHandler { enabled: false, ..StaticHandler::new("hidden", 900) })).unwrap();

        let names = delegate.entries().into_iter().map(|entry| entry.name).collect_vec();
        assert_eq!(names, vec!["notifications", "blog", "calendar"]);
    }

    #[test]
    fn test_duplicate_handler_rejected() {
        let mut delegate = MainMenuDelegate::new();
        delegate.register_handler(Arc::new(StaticHandler::new("notifications", 700))).unwrap();
        let result = delegate.register_handler(Arc::new(StaticHandler::new("notifications", 100)));
        assert!(matches!(result, Err(Error::DuplicateHandler(name)) if name == "notifications"));
        assert_eq!(delegate.handler("notifications").map(|h| h.priority()), Some(700));
    }

    #[test]
    fn test_refresh_requested_only_while_loading() {
        let loading = Arc::new(StaticHandler { loading: true, ..StaticHandler::new("loading", 1) });
        let loaded = Arc::new(StaticHandler::new("loaded", 2));
        let mut delegate = MainMenuDelegate::new();
        delegate.register_handler(loading.clone()).unwrap();
        delegate.register_handler(loaded.clone()).unwrap();

        delegate.entries();
        assert_eq!(loading.refresh_requests.load(Ordering::SeqCst), 1);
        assert_eq!(loaded.refresh_requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_entry_display() {
        let mut entry = StaticHandler::new("notifications", 700).display_data();
        assert_eq!(entry.to_string(), "700 notifications /notifications");
        entry.badge_text = "5".to_string();
        assert_eq!(entry.to_string(), "700 notifications /notifications [5]");
        entry.is_loading = true;
        assert_eq!(entry.to_string(), "700 notifications /notifications […]");
    }
}
