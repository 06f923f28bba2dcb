/*
 *  module/ffi.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  C ABI descriptor exported by capability modules
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

//! FFI types for the BoardWalk module system
//!
//! Every capability module exports one [`ModuleDescriptor`] value under the
//! symbol named by [`MODULE_INFO_SYMBOL`]. The struct uses `#[repr(C)]` and
//! fixed NUL-terminated buffers so its layout is stable across compilation
//! units and toolchains.

use std::ffi::c_char;

/// Module ABI version understood by this host.
pub const MODULE_ABI_MAJOR: u16 = 1;
pub const MODULE_ABI_MINOR: u16 = 0;

/// Magic carried by every descriptor ("BWLK"). A symbol that exists under
/// the well-known name but holds something else fails this check instead of
/// being trusted.
pub const MODULE_TAG: u32 = 0x4257_4c4b;

/// Well-known name of the exported descriptor symbol.
pub const MODULE_INFO_SYMBOL: &str = "BOARDWALK_MODULE_INFO";

/// Maximum lengths for descriptor strings (including the NUL)
pub const MODULE_ID_SIZE: usize = 32;
pub const MODULE_NAME_SIZE: usize = 64;
pub const MODULE_AUTHOR_SIZE: usize = 64;

/// Descriptor every capability module exports.
///
/// The `id` field is the module's logical identity and must match the id the
/// host asked for; the variant lives only in the filename, never in here.
#[repr(C)]
#[derive(Debug)]
pub struct ModuleDescriptor {
    /// Must be [`MODULE_TAG`]
    pub tag: u32,

    /// ABI major version; must equal the host's [`MODULE_ABI_MAJOR`]
    pub abi_major: u16,

    /// ABI minor version; a newer minor than the host is tolerated
    pub abi_minor: u16,

    /// Logical module id (NUL-terminated, e.g. "led")
    pub id: [c_char; MODULE_ID_SIZE],

    /// Human-readable module name (NUL-terminated)
    pub name: [c_char; MODULE_NAME_SIZE],

    /// Module author (NUL-terminated)
    pub author: [c_char; MODULE_AUTHOR_SIZE],
}

impl ModuleDescriptor {
    /// Build a descriptor for the current ABI. Over-long strings are
    /// truncated to fit their buffers, NUL included.
    pub const fn new(id: &str, name: &str, author: &str) -> Self {
        Self {
            tag: MODULE_TAG,
            abi_major: MODULE_ABI_MAJOR,
            abi_minor: MODULE_ABI_MINOR,
            id: str_buf(id),
            name: str_buf(name),
            author: str_buf(author),
        }
    }

    /// Extract the module id as a Rust string.
    pub fn id_str(&self) -> String {
        extract_string(&self.id)
    }

    /// Extract the module name as a Rust string.
    pub fn name_str(&self) -> String {
        extract_string(&self.name)
    }

    /// Extract the author as a Rust string.
    pub fn author_str(&self) -> String {
        extract_string(&self.author)
    }

    /// ABI version as a (major, minor) pair.
    pub fn abi_version(&self) -> (u16, u16) {
        (self.abi_major, self.abi_minor)
    }
}

/// Copy `s` into a fixed NUL-terminated buffer, truncating if needed.
pub const fn str_buf<const N: usize>(s: &str) -> [c_char; N] {
    let mut buf = [0 as c_char; N];
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && i < N - 1 {
        buf[i] = bytes[i] as c_char;
        i += 1;
    }
    buf
}

/// Extract a NUL-terminated string from a fixed C buffer.
pub fn extract_string(buffer: &[c_char]) -> String {
    let len = buffer.iter()
        .position(|&c| c == 0)
        .unwrap_or(buffer.len());

    let bytes: Vec<u8> = buffer[..len]
        .iter()
        .map(|&c| c as u8)
        .collect();

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_round_trip() {
        let desc = ModuleDescriptor::new("led", "Status LED module", "Stuart Hunter");
        assert_eq!(desc.tag, MODULE_TAG);
        assert_eq!(desc.abi_version(), (MODULE_ABI_MAJOR, MODULE_ABI_MINOR));
        assert_eq!(desc.id_str(), "led");
        assert_eq!(desc.name_str(), "Status LED module");
        assert_eq!(desc.author_str(), "Stuart Hunter");
    }

    #[test]
    fn test_str_buf_truncates() {
        let long = "x".repeat(MODULE_ID_SIZE * 2);
        let buf: [c_char; MODULE_ID_SIZE] = str_buf(&long);

        // last byte stays NUL, content is cut to fit
        assert_eq!(buf[MODULE_ID_SIZE - 1], 0);
        assert_eq!(extract_string(&buf).len(), MODULE_ID_SIZE - 1);
    }

    #[test]
    fn test_extract_string_unterminated_buffer() {
        let buf = [b'a' as c_char; 8];
        assert_eq!(extract_string(&buf), "aaaaaaaa");
    }
}
