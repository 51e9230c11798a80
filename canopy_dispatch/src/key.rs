// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch keys: the lookup key partitioning listeners by event category.

use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};

use hashbrown::{DefaultHashBuilder, HashMap};
use smallvec::SmallVec;

/// The key under which listeners are indexed and events are looked up.
///
/// Built-in event categories each have a fixed key; custom events are keyed
/// by an interned name (see [`CustomKey`]). Touch uses two distinct keys, one
/// per delivery mode, so the two pools can be ordered and walked
/// independently.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKey {
    /// Touch listeners that claim individual touch points.
    TouchOneByOne,
    /// Touch listeners that receive each batch of touches at once.
    TouchAllAtOnce,
    /// Keyboard press/release.
    Keyboard,
    /// Mouse button/move/scroll.
    Mouse,
    /// Device acceleration.
    Acceleration,
    /// Widget focus changes.
    Focus,
    /// A named user-defined event.
    Custom(CustomKey),
}

/// A compact, interned identifier for a custom event name.
///
/// Produced by the dispatcher when a custom listener is first registered
/// under a name; equal names always intern to the same key for the lifetime
/// of the dispatcher.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct CustomKey(pub(crate) u32);

impl CustomKey {
    /// Returns the raw numeric id.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Interns custom event names into compact [`CustomKey`] handles.
///
/// Names are stored once; lookups hash the borrowed `&str` so dispatching a
/// custom event never allocates. A hash-bucket index (hash → small list of
/// candidate ids) avoids storing duplicate name copies.
#[derive(Debug, Default)]
pub(crate) struct NameTable {
    names: Vec<String>,
    buckets: HashMap<u64, SmallVec<[u32; 2]>>,
    build_hasher: DefaultHashBuilder,
}

impl NameTable {
    /// Interns `name`, returning its key; equal names return the same key.
    pub(crate) fn intern(&mut self, name: &str) -> CustomKey {
        let hash = self.hash(name);
        if let Some(ids) = self.buckets.get(&hash) {
            for &id in ids {
                if self.names[id as usize] == name {
                    return CustomKey(id);
                }
            }
        }

        let id = u32::try_from(self.names.len()).expect("too many interned names for CustomKey");
        self.names.push(String::from(name));
        self.buckets.entry(hash).or_default().push(id);
        CustomKey(id)
    }

    /// Returns the key for `name` if it was ever interned, without interning.
    pub(crate) fn lookup(&self, name: &str) -> Option<CustomKey> {
        let hash = self.hash(name);
        let ids = self.buckets.get(&hash)?;
        ids.iter()
            .copied()
            .find(|&id| self.names[id as usize] == name)
            .map(CustomKey)
    }

    /// Best-effort reverse lookup for debugging.
    pub(crate) fn get(&self, key: CustomKey) -> Option<&str> {
        self.names.get(key.0 as usize).map(String::as_str)
    }

    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.build_hasher.hash_one(key)
    }
}
