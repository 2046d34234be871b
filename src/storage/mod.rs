use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// String key-value persistence behind the favorites and onboarding state.
///
/// Injected rather than ambient so the backing store can be swapped for
/// in-memory, file, or server-backed storage.
pub trait KeyValuePersistence: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Volatile store, the test and default backend
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValuePersistence for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// One JSON file per key inside a directory. Write failures are logged
/// and swallowed; losing a favorite is not worth failing an operation.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValuePersistence for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = std::fs::write(self.path_for(key), value) {
            warn!("Failed to persist {key}: {err}");
        }
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}

fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValuePersistence, key: &str) -> T {
    store
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn save_json<T: Serialize>(store: &dyn KeyValuePersistence, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => warn!("Failed to serialize {key}: {err}"),
    }
}

const FAVORITES_KEY: &str = "favorites";
const ONBOARDING_KEY: &str = "onboarding";

/// Listing ids the user has favorited, persisted as a JSON array
pub struct FavoritesStore {
    store: Arc<dyn KeyValuePersistence>,
    ids: Vec<String>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValuePersistence>) -> Self {
        let ids = load_json(store.as_ref(), FAVORITES_KEY);
        Self { store, ids }
    }

    pub fn contains(&self, listing_id: &str) -> bool {
        self.ids.iter().any(|id| id == listing_id)
    }

    pub fn all(&self) -> &[String] {
        &self.ids
    }

    /// Add or remove a favorite; returns whether it is now favorited.
    pub fn toggle(&mut self, listing_id: &str) -> bool {
        let now_favorite = match self.ids.iter().position(|id| id == listing_id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(listing_id.to_string());
                true
            }
        };
        save_json(self.store.as_ref(), FAVORITES_KEY, &self.ids);
        now_favorite
    }

    pub fn reset(&mut self) {
        self.ids.clear();
        self.store.remove(FAVORITES_KEY);
    }
}

/// Onboarding tooltip steps the user has already seen
pub struct OnboardingFlags {
    store: Arc<dyn KeyValuePersistence>,
    seen: Vec<String>,
}

impl OnboardingFlags {
    pub fn new(store: Arc<dyn KeyValuePersistence>) -> Self {
        let seen = load_json(store.as_ref(), ONBOARDING_KEY);
        Self { store, seen }
    }

    pub fn has_seen(&self, step: &str) -> bool {
        self.seen.iter().any(|s| s == step)
    }

    /// Record a step as seen; returns false when it already was.
    pub fn mark_seen(&mut self, step: &str) -> bool {
        if self.has_seen(step) {
            return false;
        }
        self.seen.push(step.to_string());
        save_json(self.store.as_ref(), ONBOARDING_KEY, &self.seen);
        true
    }

    pub fn reset(&mut self) {
        self.seen.clear();
        self.store.remove(ONBOARDING_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorites_toggle_round_trips_through_the_store() {
        let store: Arc<dyn KeyValuePersistence> = Arc::new(MemoryStore::default());
        let mut favorites = FavoritesStore::new(store.clone());
        assert!(favorites.toggle("space-1"));
        assert!(favorites.toggle("space-2"));
        assert!(!favorites.toggle("space-1"));

        // A store built over the same backend sees the persisted state.
        let reloaded = FavoritesStore::new(store);
        assert!(!reloaded.contains("space-1"));
        assert!(reloaded.contains("space-2"));
        assert_eq!(reloaded.all(), ["space-2"]);
    }

    #[test]
    fn favorites_reset_clears_the_backend() {
        let store: Arc<dyn KeyValuePersistence> = Arc::new(MemoryStore::default());
        let mut favorites = FavoritesStore::new(store.clone());
        favorites.toggle("space-1");
        favorites.reset();
        assert!(!FavoritesStore::new(store).contains("space-1"));
    }

    #[test]
    fn onboarding_marks_each_step_once() {
        let store: Arc<dyn KeyValuePersistence> = Arc::new(MemoryStore::default());
        let mut onboarding = OnboardingFlags::new(store.clone());
        assert!(onboarding.mark_seen("search-bar"));
        assert!(!onboarding.mark_seen("search-bar"));

        let reloaded = OnboardingFlags::new(store);
        assert!(reloaded.has_seen("search-bar"));
        assert!(!reloaded.has_seen("filters"));
    }

    #[test]
    fn json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValuePersistence> =
            Arc::new(JsonFileStore::new(dir.path()).unwrap());
        let mut favorites = FavoritesStore::new(store);
        favorites.toggle("space-9");

        let store: Arc<dyn KeyValuePersistence> =
            Arc::new(JsonFileStore::new(dir.path()).unwrap());
        assert!(FavoritesStore::new(store).contains("space-9"));
    }

    #[test]
    fn corrupt_persisted_state_falls_back_to_empty() {
        let store: Arc<dyn KeyValuePersistence> = Arc::new(MemoryStore::default());
        store.set(FAVORITES_KEY, "not json");
        let favorites = FavoritesStore::new(store);
        assert!(favorites.all().is_empty());
    }
}
