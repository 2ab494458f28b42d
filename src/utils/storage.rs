use dioxus::prelude::*;

/// Which half of a grouped view is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPreference {
    Chart,
    #[default]
    Table,
}

impl ViewPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewPreference::Chart => "chart",
            ViewPreference::Table => "table",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chart" => Some(ViewPreference::Chart),
            "table" => Some(ViewPreference::Table),
            _ => None,
        }
    }
}

/// String key/value store the preferences live in.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Process-local store, used when there is no browser (server render, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStore;

thread_local! {
    static MEMORY: std::cell::RefCell<std::collections::HashMap<String, String>> =
        Default::default();
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        MEMORY.with(|m| m.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        MEMORY.with(|m| {
            m.borrow_mut().insert(key.to_string(), value.to_string());
        });
    }
}

#[cfg(feature = "web")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(feature = "web")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

#[cfg(feature = "web")]
impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if let Err(e) = storage.set_item(key, value) {
                dioxus::logger::tracing::warn!("[storage] could not save {key}: {e:?}");
            }
        }
    }
}

#[cfg(feature = "web")]
pub fn browser_store() -> LocalStorage {
    LocalStorage
}

#[cfg(not(feature = "web"))]
pub fn browser_store() -> MemoryStore {
    MemoryStore
}

pub fn load_preference(
    store: &impl PreferenceStore,
    key: &str,
    default: ViewPreference,
) -> ViewPreference {
    store
        .get(key)
        .and_then(|s| ViewPreference::parse(&s))
        .unwrap_or(default)
}

pub fn save_preference(store: &impl PreferenceStore, key: &str, value: ViewPreference) {
    store.set(key, value.as_str());
}

#[derive(Clone, Copy, PartialEq)]
pub struct SavedPreference {
    key: Signal<String>,
    value: Signal<ViewPreference>,
}

impl SavedPreference {
    pub fn get(&self) -> ViewPreference {
        *self.value.read()
    }

    pub fn set(&mut self, value: ViewPreference) {
        self.value.set(value);
        save_preference(&browser_store(), &self.key.peek(), value);
    }
}

/// A view preference persisted under `key`.
///
/// The first render always uses `default` so server and client markup match;
/// the stored value is applied once the component is mounted.
pub fn use_saved_preference(key: String, default: ViewPreference) -> SavedPreference {
    let key = use_signal(|| key);
    let mut value = use_signal(|| default);

    use_effect(move || {
        let stored = load_preference(&browser_store(), &key.peek(), default);
        if stored != *value.peek() {
            value.set(stored);
        }
    });

    SavedPreference { key, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_or_missing_values_fall_back_to_default() {
        let store = MemoryStore;
        assert_eq!(
            load_preference(&store, "nothing-here", ViewPreference::Table),
            ViewPreference::Table
        );
        store.set("garbled", "pie");
        assert_eq!(
            load_preference(&store, "garbled", ViewPreference::Chart),
            ViewPreference::Chart
        );
    }

    #[test]
    fn toggled_choice_survives_a_remount() {
        let key = "Weekly Spending-group-visible";
        // first mount: nothing stored yet
        assert_eq!(
            load_preference(&MemoryStore, key, ViewPreference::default()),
            ViewPreference::Table
        );
        save_preference(&MemoryStore, key, ViewPreference::Chart);
        // second mount reads it back
        assert_eq!(
            load_preference(&MemoryStore, key, ViewPreference::default()),
            ViewPreference::Chart
        );
        assert_eq!(MemoryStore.get(key).as_deref(), Some("chart"));
    }
}
