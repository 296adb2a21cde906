//! Independent model of the host's "brighten on collision" hover fixup.
//!
//! When a theme leaves `hover` indistinguishable from `background`, the host
//! lightens the background by roughly 30% and uses that as the hover color.
//! That happens deep inside theme loading and cannot be observed without
//! rendering, so the formula is restated here and checked against theme data.
//! Keep this separate from the host's code; the check is only meaningful if
//! the two stay independent.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{CheckError, Result};

/// `v -> min(255, v * percent / 100 + bias)`, applied per channel.
///
/// The defaults reproduce `floor(v * 1.3) + 1`. The `+1` bias makes pure
/// black still move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightenPolicy {
    pub percent: u32,
    pub bias: u32,
}

impl Default for BrightenPolicy {
    fn default() -> Self {
        Self {
            percent: 130,
            bias: 1,
        }
    }
}

impl BrightenPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.percent < 100 {
            return Err(CheckError::invalid(format!(
                "brighten percent must be at least 100, got {}",
                self.percent
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn channel(&self, v: u8) -> u8 {
        let scaled = (u32::from(v).saturating_mul(self.percent) / 100).saturating_add(self.bias);
        u8::try_from(scaled.min(255)).unwrap_or(u8::MAX)
    }

    #[must_use]
    pub fn apply(&self, color: Rgb) -> Rgb {
        color.map_channels(|v| self.channel(v))
    }
}

/// Brighten with the default policy.
#[must_use]
pub fn brighten(color: Rgb) -> Rgb {
    BrightenPolicy::default().apply(color)
}
