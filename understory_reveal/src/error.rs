// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// An option value rejected at the API boundary.
///
/// Redraws never fail on bad values: the resolver clamps what slips through.
/// This error exists so that registration and global configuration calls can
/// tell the caller that a value was out of range instead of silently
/// changing it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The hover radius was not a finite number greater than zero.
    InvalidHoverRadius(f64),
    /// The border width was not a finite number greater than or equal to zero.
    InvalidBorderWidth(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHoverRadius(r) => {
                write!(f, "hover radius must be finite and > 0, got {r}")
            }
            Self::InvalidBorderWidth(w) => {
                write!(f, "border width must be finite and >= 0, got {w}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
