//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Opix.
//! The Opix project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Opix Error Module
//!
//! Opix reports failures through two channels:
//!
//! - **`OpiError`**: the Rust error type returned by fallible internal steps
//!   (opening a library, resolving a symbol, decoding plugin metadata,
//!   reading configuration). The host never lets one of these escape from
//!   plugin loading; it turns them into log diagnostics and a per-plugin
//!   status instead.
//! - **`OpiCErrorCode`**: the numeric host-level code observable through
//!   `OpiCHost::OpiFGetLastError` and the error callback. Plugins use the
//!   same codes as return values of their operations, and codes this host
//!   does not know are carried through unchanged as `Plugin(code)`.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Opix.
pub type Result<T> = std::result::Result<T, OpiError>;

/// Canonical error enumeration for Opix.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum OpiError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// The OS loader refused to open a file as a shared library.
    #[error("cannot load library '{path}': {message}")]
    Library { path: String, message: String },

    /// A library loaded but does not export a symbol the host needs.
    #[error("library '{path}' does not export '{symbol}'")]
    MissingSymbol { path: String, symbol: String },

    /// A library exports the plugin symbols but their content is unusable.
    #[error("malformed plugin '{path}': {message}")]
    MalformedPlugin { path: String, message: String },

    /// The plugin cannot run against this host or GPU backend.
    #[error("plugin '{plugin}' is not supported: {reason}")]
    Incompatible { plugin: String, reason: String },

    /// Invalid host or logger configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for OpiError {
    fn from(err: io::Error) -> Self {
        OpiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OpiError {
    fn from(err: serde_json::Error) -> Self {
        OpiError::Serde(err.to_string())
    }
}

impl From<libloading::Error> for OpiError {
    fn from(err: libloading::Error) -> Self {
        OpiError::Library {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

impl OpiError {
    /// Helper to construct library load errors.
    pub fn library(path: impl Into<String>, message: impl Into<String>) -> Self {
        OpiError::Library {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Helper to construct missing symbol errors.
    pub fn missing_symbol(path: impl Into<String>, symbol: impl Into<String>) -> Self {
        OpiError::MissingSymbol {
            path: path.into(),
            symbol: symbol.into(),
        }
    }

    /// Helper to construct malformed plugin errors.
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        OpiError::MalformedPlugin {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Helper to construct compatibility errors.
    pub fn incompatible(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        OpiError::Incompatible {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        OpiError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        OpiError::Internal(message.into())
    }
}

/// Host-level error codes shared with plugins.
///
/// The discriminants are part of the plugin ABI: flat-table plugins return
/// them as plain `c_int` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpiCErrorCode {
    Success,
    UnknownError,
    InvalidArgument,
    InvalidDevice,
    IndexRange,
    IncompatibleTypes,
    CudaRequired,
    OpenClRequired,
    NotImplemented,
    DirectoryNotFound,
    /// Code produced by plugin execution that the host does not interpret.
    Plugin(i32),
}

impl OpiCErrorCode {
    #[allow(non_snake_case)]
    pub fn OpiFToRaw(self) -> i32 {
        match self {
            OpiCErrorCode::Success => 0,
            OpiCErrorCode::UnknownError => 1,
            OpiCErrorCode::InvalidArgument => 2,
            OpiCErrorCode::InvalidDevice => 3,
            OpiCErrorCode::IndexRange => 4,
            OpiCErrorCode::IncompatibleTypes => 5,
            OpiCErrorCode::CudaRequired => 6,
            OpiCErrorCode::OpenClRequired => 7,
            OpiCErrorCode::NotImplemented => 8,
            OpiCErrorCode::DirectoryNotFound => 9,
            OpiCErrorCode::Plugin(code) => code,
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFFromRaw(code: i32) -> Self {
        match code {
            0 => OpiCErrorCode::Success,
            1 => OpiCErrorCode::UnknownError,
            2 => OpiCErrorCode::InvalidArgument,
            3 => OpiCErrorCode::InvalidDevice,
            4 => OpiCErrorCode::IndexRange,
            5 => OpiCErrorCode::IncompatibleTypes,
            6 => OpiCErrorCode::CudaRequired,
            7 => OpiCErrorCode::OpenClRequired,
            8 => OpiCErrorCode::NotImplemented,
            9 => OpiCErrorCode::DirectoryNotFound,
            other => OpiCErrorCode::Plugin(other),
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsSuccess(self) -> bool {
        self == OpiCErrorCode::Success
    }
}

impl Default for OpiCErrorCode {
    fn default() -> Self {
        OpiCErrorCode::Success
    }
}

impl fmt::Display for OpiCErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpiCErrorCode::Success => f.write_str("success"),
            OpiCErrorCode::UnknownError => f.write_str("unknown error"),
            OpiCErrorCode::InvalidArgument => f.write_str("invalid argument"),
            OpiCErrorCode::InvalidDevice => f.write_str("invalid device"),
            OpiCErrorCode::IndexRange => f.write_str("index out of range"),
            OpiCErrorCode::IncompatibleTypes => f.write_str("incompatible types"),
            OpiCErrorCode::CudaRequired => f.write_str("CUDA support required"),
            OpiCErrorCode::OpenClRequired => f.write_str("OpenCL support required"),
            OpiCErrorCode::NotImplemented => f.write_str("not implemented"),
            OpiCErrorCode::DirectoryNotFound => f.write_str("directory not found"),
            OpiCErrorCode::Plugin(code) => write!(f, "plugin error {}", code),
        }
    }
}
