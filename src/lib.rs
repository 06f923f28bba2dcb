/*
 *  lib.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime loading of board-specific capability modules
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

//! BoardWalk loads the right build of a named capability module for the
//! device it is running on.
//!
//! A capability module (led, backlight, ...) ships as several shared
//! libraries that all implement the same logical module but target different
//! boards or architectures. The files share one module id and differ only by
//! a variant suffix:
//!
//! ```text
//! led.trout.so       # board-specific build
//! led.armv6.so       # architecture-specific build
//! led.default.so     # fallback build
//! ```
//!
//! [`module::ModuleLocator`] walks the variant priority chain (board, then
//! arch, then `default`), opens the first candidate that exists, and hands
//! back the module once its exported descriptor has been validated against
//! the requested id. Candidates that fail to open or validate are closed and
//! skipped; the caller only ever sees a fully validated module or
//! [`module::LocateError::NotFound`].
//!
//! Device identity comes from a small read-only property store
//! ([`config::BoardProperties`], a flat YAML map), mirroring the way a
//! deployment describes its hardware.
//!
//! ```no_run
//! use boardwalk::config::BoardProperties;
//! use boardwalk::module::{ModuleLocator, default_module_dir};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let props = BoardProperties::load()?;
//! let locator = ModuleLocator::new(default_module_dir(), Box::new(props));
//!
//! let led = locator.locate("led")?;
//! println!("loaded {} by {}", led.info().name, led.info().author);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod module;

pub use config::{BoardProperties, ConfigError, PropertyStore};
pub use module::{
    LoadError, LoadedModule, LocateError, ModuleDescriptor, ModuleInfo, ModuleLoader,
    ModuleLocator, VariantSource,
};
