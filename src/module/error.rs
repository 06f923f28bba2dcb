/*
 *  module/error.rs
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the module subsystem
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

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Failure of a single candidate load attempt.
///
/// These never reach the caller of `locate`: the locator logs them and moves
/// on to the next variant. The opened library, if any, is already closed by
/// the time one of these is constructed.
#[derive(Debug)]
pub enum LoadError {
    /// Candidate library missing, malformed, or with unresolved symbols
    OpenFailed { path: PathBuf, reason: String },

    /// Candidate opened but lacks the descriptor export
    SymbolNotFound { symbol: &'static str, reason: String },

    /// Descriptor symbol is NULL or does not carry the expected tag
    InvalidDescriptor(String),

    /// Module built against an incompatible ABI major version
    AbiMismatch { module: (u16, u16), host: (u16, u16) },

    /// Descriptor identity does not match the requested module id
    IdMismatch { requested: String, found: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::OpenFailed { path, reason } =>
                write!(f, "failed to open {}: {}", path.display(), reason),
            LoadError::SymbolNotFound { symbol, reason } =>
                write!(f, "missing descriptor symbol {}: {}", symbol, reason),
            LoadError::InvalidDescriptor(msg) =>
                write!(f, "invalid module descriptor: {}", msg),
            LoadError::AbiMismatch { module, host } =>
                write!(f, "module ABI {}.{} incompatible with host ABI {}.{}",
                    module.0, module.1, host.0, host.1),
            LoadError::IdMismatch { requested, found } =>
                write!(f, "module id mismatch: requested '{}', found '{}'", requested, found),
        }
    }
}

impl Error for LoadError {}

/// Terminal failure of a locate run.
#[derive(Debug)]
pub enum LocateError {
    /// Module id is empty or contains path separators
    InvalidId(String),

    /// No candidate across the whole priority chain produced a valid module
    NotFound(String),
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::InvalidId(id) =>
                write!(f, "invalid module id '{}'", id),
            LocateError::NotFound(id) =>
                write!(f, "no usable module found for id '{}'", id),
        }
    }
}

impl Error for LocateError {}
