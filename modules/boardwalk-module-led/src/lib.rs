/*
 *  BoardWalk LED Module
 *
 *  A dynamically loadable capability module for the BoardWalk module
 *  system that drives the board status LED through sysfs.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

//! # BoardWalk status LED module
//!
//! The fallback (`default`) build of the `led` capability module. It drives
//! whatever LED the kernel exposes as `/sys/class/leds/status`.
//!
//! ## Installation
//!
//! Module filenames carry the variant, not the binary:
//!
//! ```text
//! cp target/release/libboardwalk_module_led.so \
//!    /usr/lib/boardwalk/modules/led.default.so
//! ```
//!
//! A board-specific build of the same module would be installed next to it
//! as e.g. `led.trout.so` and win the variant resolution on that board.

use std::ffi::c_int;
use std::fs;

use boardwalk::module::ffi::ModuleDescriptor;

/// Sysfs node driven by the default build.
const LED_NODE: &str = "/sys/class/leds/status/brightness";

/// Descriptor found by the host under the well-known symbol name.
#[no_mangle]
pub static BOARDWALK_MODULE_INFO: ModuleDescriptor =
    ModuleDescriptor::new("led", "Status LED module", "Stuart Hunter");

/// Switch the status LED on (non-zero) or off (zero).
///
/// Returns 0 on success, -1 if the LED node cannot be written.
#[no_mangle]
pub extern "C" fn boardwalk_led_set(on: c_int) -> c_int {
    let value = if on != 0 { "1" } else { "0" };
    match fs::write(LED_NODE, value) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}
