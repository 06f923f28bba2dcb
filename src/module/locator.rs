/*
 *  module/locator.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  Walks the variant priority chain for one module id
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

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::config::PropertyStore;

use super::error::LocateError;
use super::loader::{DynamicImageLoader, ImageLoader, LoadedModule, ModuleLoader};
use super::variant::{VariantSource, default_sources};

/// Longest variant value used for path construction. Longer values are
/// truncated, not rejected.
pub const MAX_VARIANT_LEN: usize = 64;

/// Module directory used when `BOARDWALK_MODULE_PATH` is not set.
pub const SYSTEM_MODULE_DIR: &str = "/usr/lib/boardwalk/modules";

/// Platform shared-library suffix for module filenames.
pub fn module_suffix() -> &'static str {
    if cfg!(target_os = "macos") {
        "dylib"
    } else if cfg!(target_os = "windows") {
        "dll"
    } else {
        "so"
    }
}

/// Module directory: environment override first, system directory otherwise.
pub fn default_module_dir() -> PathBuf {
    match env::var("BOARDWALK_MODULE_PATH") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(SYSTEM_MODULE_DIR),
    }
}

/// Finds and loads the right variant of a capability module.
///
/// Holds one fixed module directory, one immutable variant chain, and a
/// read-only property store. Safe to call from multiple threads; nothing in
/// here mutates, and the platform loader refcounts repeated opens.
pub struct ModuleLocator<L: ImageLoader = DynamicImageLoader> {
    module_dir: PathBuf,
    sources: Vec<VariantSource>,
    store: Box<dyn PropertyStore>,
    loader: ModuleLoader<L>,
}

impl ModuleLocator<DynamicImageLoader> {
    /// Locator over the real dynamic-loading facility with the stock
    /// variant chain.
    pub fn new(module_dir: impl Into<PathBuf>, store: Box<dyn PropertyStore>) -> Self {
        Self::with_loader(module_dir, store, ModuleLoader::new())
    }
}

impl<L: ImageLoader> ModuleLocator<L> {
    /// Locator over a custom loader (tests, exotic platforms).
    pub fn with_loader(
        module_dir: impl Into<PathBuf>,
        store: Box<dyn PropertyStore>,
        loader: ModuleLoader<L>,
    ) -> Self {
        Self {
            module_dir: module_dir.into(),
            sources: default_sources(),
            store,
            loader,
        }
    }

    /// Replace the variant priority chain. Keep a `Fixed` entry last if the
    /// search must always have at least one candidate.
    pub fn with_sources(mut self, sources: Vec<VariantSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Locate and load the module implementing `id`.
    ///
    /// Entries are tried strictly in chain order; the first candidate that
    /// opens and validates wins and later entries are never consulted.
    /// Entries whose variant is unavailable are skipped without touching the
    /// filesystem. Per-candidate failures are logged and swallowed; only
    /// exhaustion of the whole chain reaches the caller.
    pub fn locate(&self, id: &str) -> Result<LoadedModule<L::Image>, LocateError> {
        validate_id(id)?;

        for source in &self.sources {
            let Some(variant) = source.resolve(self.store.as_ref()) else {
                continue;
            };

            let path = self.candidate_path(id, &variant);
            debug!("locate: id={} trying variant '{}' ({})", id, variant, path.display());

            match self.loader.load(id, &path) {
                Ok(module) => {
                    info!(
                        "locate: id={} using variant '{}' ({})",
                        id,
                        variant,
                        module.info().name
                    );
                    return Ok(module);
                }
                Err(e) => {
                    warn!("locate: id={} variant '{}' rejected: {}", id, variant, e);
                }
            }
        }

        warn!("locate: id={} exhausted all variants", id);
        Err(LocateError::NotFound(id.to_string()))
    }

    /// `<module_dir>/<id>.<variant>.<suffix>`
    fn candidate_path(&self, id: &str, variant: &str) -> PathBuf {
        self.module_dir.join(format!(
            "{}.{}.{}",
            id,
            truncate_variant(variant),
            module_suffix()
        ))
    }
}

/// Ids are path components, never paths.
fn validate_id(id: &str) -> Result<(), LocateError> {
    if id.is_empty() || id.contains(['/', '\\']) {
        return Err(LocateError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Cut to `MAX_VARIANT_LEN` bytes without splitting a character.
fn truncate_variant(variant: &str) -> &str {
    if variant.len() <= MAX_VARIANT_LEN {
        return variant;
    }
    let mut end = MAX_VARIANT_LEN;
    while !variant.is_char_boundary(end) {
        end -= 1;
    }
    &variant[..end]
}
