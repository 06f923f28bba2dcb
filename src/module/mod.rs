/*
 *  module/mod.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  Variant-resolved loading of capability modules
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

//! Variant-resolved loading of capability modules
//!
//! A capability module is one logical feature (led, backlight, ...) packaged
//! as a shared library. Several builds of the same module can be installed
//! side by side, discriminated by a variant suffix in the filename.
//!
//! ## Architecture
//!
//! The subsystem is three layers:
//!
//! 1. **FFI layer** (`ffi.rs`) - the `#[repr(C)]` descriptor every module
//!    exports under a well-known symbol name
//! 2. **Loader** (`loader.rs`) - opens one candidate library and validates
//!    its descriptor against the requested module id
//! 3. **Locator** (`locator.rs`) - walks the variant priority chain and
//!    returns the first candidate that loads and validates
//!
//! ## Variant resolution
//!
//! Variants are tried in a fixed priority order (`variant.rs`):
//!
//! 1. the `board` property (e.g. `trout`)
//! 2. the `arch` property (e.g. `armv6`)
//! 3. the literal `default`
//!
//! Entries whose property is unset are skipped without touching the
//! filesystem; the trailing `default` entry always resolves, so the search
//! always has at least one candidate.
//!
//! ## Module naming convention
//!
//! `<module-dir>/<id>.<variant>.<suffix>`, e.g.
//!
//! - Linux: `led.trout.so`
//! - macOS: `led.trout.dylib`
//! - Windows: `led.trout.dll`

pub mod error;
pub mod ffi;
pub mod loader;
pub mod locator;
pub mod variant;

// Re-exports for convenience
pub use error::{LoadError, LocateError};
pub use ffi::{
    MODULE_ABI_MAJOR, MODULE_ABI_MINOR, MODULE_INFO_SYMBOL, MODULE_TAG, ModuleDescriptor,
};
pub use loader::{
    DynamicImage, DynamicImageLoader, ImageLoader, LoadedModule, ModuleImage, ModuleInfo,
    ModuleLoader,
};
pub use locator::{MAX_VARIANT_LEN, ModuleLocator, default_module_dir, module_suffix};
pub use variant::{DEFAULT_VARIANT, VariantSource, default_sources};
