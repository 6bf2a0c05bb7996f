// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The handful of ways a wallpaper run can go wrong.

use failure::Fail;

/// Everything the generator, normalizer, colorizer and renderer can
/// report back to the pattern-run boundary.
#[derive(Debug, Fail, PartialEq)]
pub enum WallpaperError {
    /// A recurrence step or an escape-time update produced a NaN or
    /// an infinity.  `step` counts from the very first application,
    /// warm-up included.
    #[fail(display = "numeric divergence in {} at step {}", pattern, step)]
    NumericDivergence {
        /// Catalog name of the pattern that diverged.
        pattern: String,
        /// Zero-based index of the offending step.
        step: usize,
    },

    /// Failure to persist an image or load a resource.
    #[fail(display = "i/o failure on {}: {}", path, reason)]
    Io {
        /// The path being written or read.
        path: String,
        /// What the underlying library said about it.
        reason: String,
    },

    /// Menu input outside the accepted range.
    #[fail(display = "invalid selection: {}", _0)]
    InvalidSelection(String),

    /// A render configuration that cannot produce an image.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),
}

impl WallpaperError {
    /// Shorthand for the I/O variant.
    pub fn io<P: AsRef<std::path::Path>, E: std::fmt::Display>(path: P, err: E) -> Self {
        WallpaperError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// True for the one failure the sequence generator knows how to
    /// recover from.
    pub fn is_divergence(&self) -> bool {
        match self {
            WallpaperError::NumericDivergence { .. } => true,
            _ => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WallpaperError>;
