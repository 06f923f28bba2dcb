/*
 *  module/variant.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  Variant priority chain for module resolution
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::debug;

use crate::config::PropertyStore;

/// Variant used when no device-specific entry resolves. Always last in the
/// chain, so a search has at least one candidate.
pub const DEFAULT_VARIANT: &str = "default";

/// Property key naming the board (e.g. "trout").
pub const BOARD_PROPERTY: &str = "board";

/// Property key naming the CPU architecture (e.g. "armv6").
pub const ARCH_PROPERTY: &str = "arch";

/// One entry in the variant priority chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSource {
    /// Ask the property store for the named key
    Property(String),

    /// Unconditional constant, used as the trailing fallback
    Fixed(String),
}

impl VariantSource {
    /// Resolve this entry to a variant string.
    ///
    /// Property entries yield `None` when the key is absent or its value is
    /// empty; the locator then skips the entry without constructing a path.
    /// Values are returned unsanitized and unbounded; length limiting
    /// happens at path-construction time.
    pub fn resolve(&self, store: &dyn PropertyStore) -> Option<String> {
        match self {
            VariantSource::Property(key) => match store.get(key) {
                Some(value) if !value.is_empty() => Some(value),
                _ => {
                    debug!("variant property '{}' not set", key);
                    None
                }
            },
            VariantSource::Fixed(value) => Some(value.clone()),
        }
    }
}

/// The stock priority chain: board, then arch, then `default`.
pub fn default_sources() -> Vec<VariantSource> {
    vec![
        VariantSource::Property(BOARD_PROPERTY.to_string()),
        VariantSource::Property(ARCH_PROPERTY.to_string()),
        VariantSource::Fixed(DEFAULT_VARIANT.to_string()),
    ]
}
