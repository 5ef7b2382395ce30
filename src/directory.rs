//! Streaming id to asset name resolution.
//!
//! Frames identify rigid bodies only by a numeric streaming id. The server's
//! description list ties those ids to names, and the ids may be reassigned
//! whenever assets are added or removed, so the directory is rebuilt from
//! scratch on every description update rather than patched.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::types::AssetDescription;

/// Name returned for ids the directory does not know.
pub const UNRESOLVED_NAME: &str = "";

/// id → name and id → description-order mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDirectory {
    names: BTreeMap<i32, String>,
    order: BTreeMap<i32, usize>,
}

impl AssetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a description list.
    pub fn from_descriptions(descriptions: &[AssetDescription]) -> Self {
        let mut directory = Self::new();
        directory.rebuild(descriptions);
        directory
    }

    /// Replace all mappings with those derived from `descriptions`.
    ///
    /// Markersets take a slot in the order index without getting an id mapping;
    /// cameras take neither. A repeated id keeps its first name and logs a
    /// conflict. Unknown descriptor types are logged and skipped.
    pub fn rebuild(&mut self, descriptions: &[AssetDescription]) {
        self.names.clear();
        self.order.clear();

        let mut index = 0usize;
        for description in descriptions {
            match description {
                AssetDescription::MarkerSet { .. } => {
                    index += 1;
                    continue;
                }
                AssetDescription::Camera { .. } => continue,
                AssetDescription::Unknown { type_code } => {
                    warn!(type_code, "Unknown data type in description list");
                    continue;
                }
                _ => {}
            }

            let Some((id, name)) = description.identity() else {
                continue;
            };

            let slot = index;
            index += 1;

            match self.names.get(&id) {
                Some(existing) => {
                    warn!(
                        id,
                        existing = %existing,
                        new = name,
                        kind = description.kind(),
                        "Duplicate asset id in description list, keeping first"
                    );
                }
                None => {
                    self.names.insert(id, name.to_string());
                    self.order.insert(id, slot);
                }
            }
        }

        debug!(assets = self.names.len(), descriptions = descriptions.len(), "Asset directory rebuilt");
    }

    /// Name for `id`, or [`UNRESOLVED_NAME`] if unknown.
    pub fn resolve(&self, id: i32) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or(UNRESOLVED_NAME)
    }

    /// Name for `id`, if known.
    pub fn name_of(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Position of `id` among the markerset-inclusive, camera-exclusive
    /// descriptions of the last rebuild.
    pub fn order_of(&self, id: i32) -> Option<usize> {
        self.order.get(&id).copied()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.names.contains_key(&id)
    }

    /// `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
