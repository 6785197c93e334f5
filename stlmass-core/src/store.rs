/// Advisory key-value cache for the last estimate
///
/// A downstream page or process may read the last result back from here.
/// Nothing guarantees the values survive a restart or match the file
/// currently on screen.
use std::collections::HashMap;
use std::sync::Mutex;

use crate::estimate::Estimate;

pub const VOLUME_KEY: &str = "stlVolume";
pub const WEIGHT_KEY: &str = "stlWeight";

/// String slots keyed by name
pub trait ResultStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory `ResultStore` for tests and callers without browser storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(key.to_string(), value.to_string());
    }
}

/// Write volume (cm³) and weight (g) into their slots at full precision
pub fn persist_estimate(store: &dyn ResultStore, estimate: &Estimate) {
    store.set(VOLUME_KEY, &estimate.volume_cm3.to_string());
    store.set(WEIGHT_KEY, &estimate.weight_g.to_string());
}

/// Read back `(volume_cm3, weight_g)`; `None` if either slot is missing or garbled
pub fn read_estimate(store: &dyn ResultStore) -> Option<(f64, f64)> {
    let volume = store.get(VOLUME_KEY)?.parse().ok()?;
    let weight = store.get(WEIGHT_KEY)?.parse().ok()?;
    Some((volume, weight))
}
