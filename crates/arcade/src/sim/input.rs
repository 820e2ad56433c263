use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Key identifiers shared by the window backend and entity keypress listeners.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
}

/// Keys held down during the current tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeys {
    down: HashSet<Key>,
}

impl PressedKeys {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_key_down(mut self, key: Key, is_down: bool) -> Self {
        self.set(key, is_down);
        self
    }

    pub fn set(&mut self, key: Key, is_down: bool) {
        if is_down {
            self.down.insert(key);
        } else {
            self.down.remove(&key);
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }

    pub fn len(&self) -> usize {
        self.down.len()
    }

    pub fn clear(&mut self) {
        self.down.clear();
    }
}

impl FromIterator<Key> for PressedKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            down: iter.into_iter().collect(),
        }
    }
}

/// Key -> names of the entities listening for it.
///
/// Keys are visited in `Key` order and listeners in the order they were indexed. A name appears
/// at most once per key.
#[derive(Debug, Clone, Default)]
pub struct KeyListenerIndex {
    listeners: BTreeMap<Key, Vec<String>>,
}

impl KeyListenerIndex {
    pub fn insert(&mut self, name: &str, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            let names = self.listeners.entry(key).or_default();
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
    }

    /// Drops every entry for `name`, and any key left without listeners.
    pub fn purge(&mut self, name: &str) {
        self.listeners.retain(|_, names| {
            names.retain(|existing| existing != name);
            !names.is_empty()
        });
    }

    pub fn listeners_for(&self, key: Key) -> &[String] {
        self.listeners
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn listened_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.listeners.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, &[String])> + '_ {
        self.listeners
            .iter()
            .map(|(key, names)| (*key, names.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
