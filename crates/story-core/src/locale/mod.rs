//! Active locale with change notification.
//!
//! One [`LocaleStore`] lives for the whole process. It is initialised from the
//! persisted `locale` entry and only changes through
//! [`LocaleStore::set_locale`], which persists the new value and notifies
//! every listener in registration order.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::storage::{LOCALE_KEY, Storage};

mod catalog;

pub use catalog::{Catalog, builtin_message};

/// Supported language tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Indonesian (default)
    #[default]
    Id,
    /// English
    En,
}

/// Locale whose catalog backs every missing message.
pub const DEFAULT_LOCALE: Locale = Locale::Id;

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::Id => "id",
            Locale::En => "en",
        }
    }

    pub fn all() -> &'static [Locale] {
        &[Locale::Id, Locale::En]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "id" => Ok(Locale::Id),
            "en" => Ok(Locale::En),
            other => Err(format!("Unsupported locale: {other}")),
        }
    }
}

/// Callback invoked with the new locale. Identity is the `Arc` allocation.
pub type LocaleListener = Arc<dyn Fn(Locale) + Send + Sync>;

pub struct LocaleStore {
    catalog: Catalog,
    storage: Arc<dyn Storage>,
    current: RwLock<Locale>,
    listeners: Mutex<Vec<LocaleListener>>,
}

impl LocaleStore {
    /// Restores the persisted locale, or uses `fallback` when the entry is
    /// absent, unparsable, or not in `catalog`.
    pub fn new(storage: Arc<dyn Storage>, catalog: Catalog, fallback: Locale) -> Self {
        let persisted = storage
            .get(LOCALE_KEY)
            .and_then(|tag| tag.parse::<Locale>().ok())
            .filter(|locale| catalog.supports(*locale));
        let current = persisted.unwrap_or(fallback);
        tracing::debug!(locale = %current, restored = persisted.is_some(), "locale initialised");

        Self {
            catalog,
            storage,
            current: RwLock::new(current),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn get_locale(&self) -> Locale {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches to `tag` and notifies listeners.
    ///
    /// Unsupported tags are ignored: nothing changes and nobody is notified.
    /// Setting the current locale again still notifies. Returns whether the
    /// locale was applied.
    pub fn set_locale(&self, tag: &str) -> bool {
        let Some(locale) = tag
            .parse::<Locale>()
            .ok()
            .filter(|locale| self.catalog.supports(*locale))
        else {
            tracing::debug!(tag, "ignoring unsupported locale");
            return false;
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = locale;
        if let Err(err) = self.storage.set(LOCALE_KEY, locale.tag()) {
            tracing::warn!(error = %err, "failed to persist locale");
        }

        // Listeners may add or remove listeners while being notified.
        let snapshot: Vec<LocaleListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in snapshot {
            listener(locale);
        }
        true
    }

    /// Looks `key` up in the active catalog, then the default catalog, then
    /// returns the key itself.
    pub fn get_message(&self, key: &str) -> String {
        let locale = self.get_locale();
        self.catalog
            .lookup(locale, key)
            .or_else(|| self.catalog.lookup(DEFAULT_LOCALE, key))
            .unwrap_or(key)
            .to_string()
    }

    pub fn add_listener(&self, listener: &LocaleListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(listener));
    }

    /// Removes `listener` by identity. Unknown listeners are ignored.
    pub fn remove_listener(&self, listener: &LocaleListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|registered| !Arc::ptr_eq(registered, listener));
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleStore")
            .field("current", &self.get_locale())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::storage::MemoryStorage;

    fn store_with(storage: Arc<MemoryStorage>) -> LocaleStore {
        LocaleStore::new(storage, Catalog::builtin(), DEFAULT_LOCALE)
    }

    fn recording_listener() -> (LocaleListener, Arc<Mutex<Vec<Locale>>>) {
        let seen: Arc<Mutex<Vec<Locale>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: LocaleListener =
            Arc::new(move |locale: Locale| sink.lock().unwrap().push(locale));
        (listener, seen)
    }

    #[test]
    fn test_defaults_when_nothing_persisted() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        assert_eq!(store.get_locale(), Locale::Id);
    }

    #[test]
    fn test_restores_persisted_locale() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(LOCALE_KEY, "en").unwrap();

        assert_eq!(store_with(storage).get_locale(), Locale::En);
    }

    #[test]
    fn test_invalid_persisted_locale_uses_fallback() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(LOCALE_KEY, "klingon").unwrap();

        let store = LocaleStore::new(storage, Catalog::builtin(), Locale::En);
        assert_eq!(store.get_locale(), Locale::En);
    }

    #[test]
    fn test_set_locale_persists_and_notifies() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage));
        let (listener, seen) = recording_listener();
        store.add_listener(&listener);

        assert!(store.set_locale("en"));

        assert_eq!(store.get_locale(), Locale::En);
        assert_eq!(storage.get(LOCALE_KEY).as_deref(), Some("en"));
        assert_eq!(*seen.lock().unwrap(), vec![Locale::En]);
    }

    #[test]
    fn test_unsupported_locale_is_noop() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let (listener, seen) = recording_listener();
        store.add_listener(&listener);

        for tag in ["fr", "", "EN", "id-ID"] {
            assert!(!store.set_locale(tag), "{tag:?} should be rejected");
        }

        assert_eq!(store.get_locale(), Locale::Id);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_locale_missing_from_catalog_is_noop() {
        let catalog = Catalog::new().with(Locale::Id, [("login", "Masuk")]);
        let store = LocaleStore::new(Arc::new(MemoryStorage::new()), catalog, Locale::Id);

        assert!(!store.set_locale("en"));
        assert_eq!(store.get_locale(), Locale::Id);
    }

    #[test]
    fn test_repeated_set_notifies_each_time() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let (listener, seen) = recording_listener();
        store.add_listener(&listener);

        store.set_locale("en");
        store.set_locale("en");

        assert_eq!(*seen.lock().unwrap(), vec![Locale::En, Locale::En]);
    }

    #[test]
    fn test_listeners_notified_in_registration_order() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let order = Arc::new(Mutex::new(Vec::new()));
        let listeners: Vec<LocaleListener> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                Arc::new(move |_: Locale| order.lock().unwrap().push(i)) as LocaleListener
            })
            .collect();
        for listener in &listeners {
            store.add_listener(listener);
        }

        store.set_locale("en");

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_listener_by_identity() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let (kept, kept_seen) = recording_listener();
        let (removed, removed_seen) = recording_listener();
        store.add_listener(&kept);
        store.add_listener(&removed);

        store.remove_listener(&removed);
        // Never registered: no-op.
        let (stranger, _) = recording_listener();
        store.remove_listener(&stranger);

        store.set_locale("en");

        assert_eq!(kept_seen.lock().unwrap().len(), 1);
        assert!(removed_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_listener_may_unregister_during_notification() {
        let store = Arc::new(store_with(Arc::new(MemoryStorage::new())));
        let calls = Arc::new(AtomicUsize::new(0));

        let slot: Arc<Mutex<Option<LocaleListener>>> = Arc::new(Mutex::new(None));
        let listener: LocaleListener = {
            let store = Arc::clone(&store);
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            Arc::new(move |_: Locale| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = slot.lock().unwrap().take() {
                    store.remove_listener(&me);
                }
            })
        };
        *slot.lock().unwrap() = Some(Arc::clone(&listener));
        store.add_listener(&listener);

        store.set_locale("en");
        store.set_locale("id");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_message_three_tier_fallback() {
        let catalog = Catalog::new()
            .with(Locale::Id, [("only-default", "hanya id"), ("both", "keduanya")])
            .with(Locale::En, [("both", "both")]);
        let store = LocaleStore::new(Arc::new(MemoryStorage::new()), catalog, Locale::Id);
        store.set_locale("en");

        assert_eq!(store.get_message("both"), "both");
        assert_eq!(store.get_message("only-default"), "hanya id");
        assert_eq!(store.get_message("missing-key"), "missing-key");
    }

    #[test]
    fn test_locale_parse_and_display() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
        assert_eq!(Locale::Id.to_string(), "id");
    }
}
