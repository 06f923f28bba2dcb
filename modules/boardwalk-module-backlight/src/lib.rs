/*
 *  BoardWalk Backlight Module
 *
 *  A dynamically loadable capability module for the BoardWalk module
 *  system that controls display backlight brightness through sysfs.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

//! # BoardWalk display backlight module
//!
//! The fallback (`default`) build of the `backlight` capability module,
//! driving the first backlight device the kernel exposes under
//! `/sys/class/backlight`. Installed as `backlight.default.so` in the
//! module directory.

use std::ffi::c_int;
use std::fs;
use std::path::PathBuf;

use boardwalk::module::ffi::ModuleDescriptor;

const BACKLIGHT_CLASS: &str = "/sys/class/backlight";

/// Descriptor found by the host under the well-known symbol name.
#[no_mangle]
pub static BOARDWALK_MODULE_INFO: ModuleDescriptor =
    ModuleDescriptor::new("backlight", "Sysfs backlight module", "Stuart Hunter");

/// First backlight device directory, if the kernel exposes one.
fn backlight_dir() -> Option<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(BACKLIGHT_CLASS)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    entries.into_iter().next()
}

/// Set backlight brightness as a 0-100 percentage.
///
/// Values above 100 are clamped. Returns 0 on success, -1 when no
/// backlight device exists or sysfs rejects the write.
#[no_mangle]
pub extern "C" fn boardwalk_backlight_set(percent: c_int) -> c_int {
    let percent = percent.clamp(0, 100) as u64;

    let Some(dir) = backlight_dir() else {
        return -1;
    };

    let max = fs::read_to_string(dir.join("max_brightness"))
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(255);

    let raw = max * percent / 100;
    match fs::write(dir.join("brightness"), raw.to_string()) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}
