/*
 *  module/loader.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  Opens and validates one candidate module library
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

use std::path::Path;

use libloading::Library;
use log::{debug, warn};

use super::error::LoadError;
use super::ffi::{
    MODULE_ABI_MAJOR, MODULE_ABI_MINOR, MODULE_INFO_SYMBOL, MODULE_TAG, ModuleDescriptor,
};

/// One opened module image.
///
/// Abstraction over the platform loading facility so tests can substitute a
/// counting fake and observe that failed attempts leave nothing open.
/// Dropping an image closes it; there is no other release path.
pub trait ModuleImage {
    /// Address of the named exported descriptor, or a diagnostic.
    fn descriptor(&self, symbol: &str) -> Result<*const ModuleDescriptor, String>;
}

/// Opens module images from candidate paths.
pub trait ImageLoader {
    type Image: ModuleImage;

    /// Open the image at `path`, resolving its undefined symbols eagerly
    /// without making them visible to the rest of the process.
    fn open(&self, path: &Path) -> Result<Self::Image, String>;
}

/// Image backed by a real shared library.
pub struct DynamicImage {
    library: Library,
}

impl ModuleImage for DynamicImage {
    fn descriptor(&self, symbol: &str) -> Result<*const ModuleDescriptor, String> {
        // The symbol is a static descriptor, so its address is the value we
        // are after.
        let sym = unsafe {
            self.library
                .get::<*const ModuleDescriptor>(symbol.as_bytes())
                .map_err(|e| e.to_string())?
        };
        Ok(*sym)
    }
}

/// The stock loader. Repeated opens of one path are refcounted by the
/// platform loader, so hitting the same module twice is cheap; no caching
/// or locking happens on this side.
pub struct DynamicImageLoader;

impl ImageLoader for DynamicImageLoader {
    type Image = DynamicImage;

    fn open(&self, path: &Path) -> Result<DynamicImage, String> {
        // Library::new binds symbols before returning and keeps them out of
        // the global namespace.
        let library = unsafe { Library::new(path).map_err(|e| e.to_string())? };
        Ok(DynamicImage { library })
    }
}

/// Module metadata extracted from the descriptor at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Logical module id (e.g. "led")
    pub id: String,

    /// Human-readable module name
    pub name: String,

    /// Module author
    pub author: String,

    /// ABI version (major, minor)
    pub abi_version: (u16, u16),
}

/// A validated, caller-owned module.
///
/// Produced only as a complete pair: the image and its descriptor travel
/// together, and dropping the module closes the library.
pub struct LoadedModule<I = DynamicImage> {
    /// The opened image (must be kept alive for the descriptor to stay valid)
    #[allow(dead_code)]
    image: I,

    /// Exported descriptor, pointing into the image
    descriptor: &'static ModuleDescriptor,

    /// Metadata extracted from the descriptor
    info: ModuleInfo,
}

impl<I> std::fmt::Debug for LoadedModule<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("descriptor", &self.descriptor)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl<I> LoadedModule<I> {
    /// Parsed module metadata.
    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    /// The raw exported descriptor. Do not hold the reference past the
    /// module itself; it points into the loaded image.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        self.descriptor
    }
}

/// Opens and validates exactly one candidate library.
pub struct ModuleLoader<L: ImageLoader = DynamicImageLoader> {
    loader: L,
}

impl ModuleLoader<DynamicImageLoader> {
    /// Loader over the real dynamic-loading facility.
    pub fn new() -> Self {
        Self { loader: DynamicImageLoader }
    }
}

impl Default for ModuleLoader<DynamicImageLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ImageLoader> ModuleLoader<L> {
    /// Loader over a custom image-loading facility.
    pub fn with_image_loader(loader: L) -> Self {
        Self { loader }
    }

    /// Load the candidate at `path` and verify that it implements `id`.
    ///
    /// Steps, each short-circuiting: open the image, find the descriptor
    /// symbol, check tag and ABI, compare the id (exact, case-sensitive).
    /// On any failure the image goes out of scope here and is closed; on
    /// success ownership transfers to the returned module.
    pub fn load(&self, id: &str, path: &Path) -> Result<LoadedModule<L::Image>, LoadError> {
        debug!("load: id={} path={}", id, path.display());

        let image = self.loader.open(path).map_err(|reason| LoadError::OpenFailed {
            path: path.to_path_buf(),
            reason,
        })?;

        let raw = image
            .descriptor(MODULE_INFO_SYMBOL)
            .map_err(|reason| LoadError::SymbolNotFound {
                symbol: MODULE_INFO_SYMBOL,
                reason,
            })?;

        if raw.is_null() {
            return Err(LoadError::InvalidDescriptor(
                "descriptor symbol is NULL".to_string(),
            ));
        }

        // Safety: non-null export under the well-known symbol; the tag check
        // rejects foreign data before anything else in it is trusted. The
        // reference is valid while `image` stays alive, and the two only
        // leave this function together.
        let descriptor: &'static ModuleDescriptor = unsafe { &*raw };

        if descriptor.tag != MODULE_TAG {
            return Err(LoadError::InvalidDescriptor(format!(
                "bad descriptor tag {:#010x}",
                descriptor.tag
            )));
        }

        if descriptor.abi_major != MODULE_ABI_MAJOR {
            return Err(LoadError::AbiMismatch {
                module: descriptor.abi_version(),
                host: (MODULE_ABI_MAJOR, MODULE_ABI_MINOR),
            });
        }

        if descriptor.abi_minor > MODULE_ABI_MINOR {
            warn!(
                "module at {} has newer ABI minor {}.{} than host {}.{}",
                path.display(),
                descriptor.abi_major,
                descriptor.abi_minor,
                MODULE_ABI_MAJOR,
                MODULE_ABI_MINOR
            );
        }

        let info = ModuleInfo {
            id: descriptor.id_str(),
            name: descriptor.name_str(),
            author: descriptor.author_str(),
            abi_version: descriptor.abi_version(),
        };

        if info.id != id {
            return Err(LoadError::IdMismatch {
                requested: id.to_string(),
                found: info.id,
            });
        }

        debug!("load: id={} ok ({})", id, info.name);
        Ok(LoadedModule { image, descriptor, info })
    }
}
