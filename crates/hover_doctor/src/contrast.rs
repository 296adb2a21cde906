//! Per-theme hover contrast verdicts.
//!
//! Each theme is judged once, synchronously:
//!   1. decode `background` and `hover`;
//!   2. if their distance reaches `raw_threshold` the theme passes as authored;
//!   3. otherwise simulate the host's brighten fixup on `background` and pass
//!      only if that reaches the lower `fixed_threshold`.
//!
//! The fixed threshold is lower because a brightening-only fix has a narrower
//! reachable range than an arbitrary author-chosen hover color.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::autofix::BrightenPolicy;
use crate::color::{Rgb, distance};
use crate::error::{CheckError, Result};
use crate::theme::{Theme, ThemeEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastPolicy {
    /// Raw hover/background distance treated as already distinct.
    pub raw_threshold: u32,
    /// Minimum background/brightened distance for the fixup path.
    pub fixed_threshold: u32,
    pub brighten: BrightenPolicy,
}

impl Default for ContrastPolicy {
    fn default() -> Self {
        Self {
            raw_threshold: 20,
            fixed_threshold: 15,
            brighten: BrightenPolicy::default(),
        }
    }
}

impl ContrastPolicy {
    pub fn validate(&self) -> Result<()> {
        self.brighten.validate()
    }
}

/// How a passing theme reached adequate contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContrastPass {
    /// Hover is far enough from background as authored.
    Distinct { raw_distance: u32 },
    /// Hover collides with background but the brighten fixup separates them.
    FixedUp {
        raw_distance: u32,
        brightened: Rgb,
        fixed_distance: u32,
    },
}

impl ContrastPass {
    #[must_use]
    pub fn raw_distance(&self) -> u32 {
        match self {
            Self::Distinct { raw_distance } | Self::FixedUp { raw_distance, .. } => *raw_distance,
        }
    }

    #[must_use]
    pub fn describe(&self, theme: &str) -> String {
        match self {
            Self::Distinct { raw_distance } => {
                format!("{theme}: hover distinct (dist={raw_distance})")
            }
            Self::FixedUp {
                raw_distance,
                fixed_distance,
                ..
            } => format!(
                "{theme}: hover==bg, fixup -> dist {raw_distance}->{fixed_distance}"
            ),
        }
    }
}

/// Judge a decoded background/hover pair.
pub fn judge_colors(
    theme: &str,
    background: Rgb,
    hover: Rgb,
    policy: &ContrastPolicy,
) -> Result<ContrastPass> {
    let raw_distance = distance(background, hover);
    if raw_distance >= policy.raw_threshold {
        return Ok(ContrastPass::Distinct { raw_distance });
    }

    let brightened = policy.brighten.apply(background);
    let fixed_distance = distance(background, brightened);
    if fixed_distance >= policy.fixed_threshold {
        Ok(ContrastPass::FixedUp {
            raw_distance,
            brightened,
            fixed_distance,
        })
    } else {
        Err(CheckError::ContrastInadequate {
            theme: theme.to_string(),
            raw_distance,
            fixed_distance,
        })
    }
}

pub fn judge_theme(theme: &Theme, policy: &ContrastPolicy) -> Result<ContrastPass> {
    let background = theme.background()?;
    let hover = theme.hover()?;
    judge_colors(&theme.name, background, hover, policy)
}

/// The verdict for one theme store entry. Failures are kept as values so the
/// run can go on to the next theme.
#[derive(Debug)]
pub struct ThemeVerdict {
    pub name: String,
    pub outcome: Result<ContrastPass>,
}

#[must_use]
pub fn evaluate_entry(entry: ThemeEntry, policy: &ContrastPolicy) -> ThemeVerdict {
    let outcome = entry
        .theme
        .and_then(|theme| judge_theme(&theme, policy));
    debug!(theme = %entry.name, passed = outcome.is_ok(), "contrast verdict");
    ThemeVerdict {
        name: entry.name,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::{ContrastPass, ContrastPolicy, judge_colors, judge_theme};
    use crate::autofix::BrightenPolicy;
    use crate::color::Rgb;
    use crate::error::CheckError;
    use crate::theme::Theme;

    fn theme(name: &str, background: &str, hover: &str) -> Theme {
        Theme::from_json(
            name,
            &format!(r#"{{"background": "{background}", "hover": "{hover}"}}"#),
        )
        .expect("theme fixture")
    }

    #[test]
    fn identical_dark_gray_passes_via_fixup() {
        let verdict = judge_theme(&theme("vs.json", "#1e1e1e", "#1e1e1e"), &ContrastPolicy::default())
            .expect("fixup path should pass");
        assert_eq!(
            verdict,
            ContrastPass::FixedUp {
                raw_distance: 0,
                brightened: Rgb::gray(40),
                fixed_distance: 30,
            }
        );
        assert_eq!(verdict.describe("vs.json"), "vs.json: hover==bg, fixup -> dist 0->30");
    }

    #[test]
    fn near_black_fails_with_both_distances() {
        let error = judge_theme(&theme("void.json", "#000000", "#010101"), &ContrastPolicy::default())
            .expect_err("pure black cannot be fixed up");
        assert!(matches!(
            error,
            CheckError::ContrastInadequate {
                raw_distance: 3,
                fixed_distance: 3,
                ..
            }
        ));
    }

    #[test]
    fn distinct_hover_passes_without_fixup() {
        let verdict = judge_theme(&theme("mid.json", "#202020", "#4a4a4a"), &ContrastPolicy::default())
            .expect("raw path should pass");
        assert_eq!(verdict, ContrastPass::Distinct { raw_distance: 126 });
        assert_eq!(verdict.describe("mid.json"), "mid.json: hover distinct (dist=126)");
    }

    #[test]
    fn missing_hover_fails_with_malformed_color() {
        let record = Theme::from_json("partial.json", r##"{"background": "#202020"}"##)
            .expect("theme fixture");
        let error = judge_theme(&record, &ContrastPolicy::default()).expect_err("should fail");
        assert!(matches!(error, CheckError::MalformedColor { ref attribute, .. } if attribute == "hover"));
    }

    #[test]
    fn thresholds_are_inclusive() {
        let policy = ContrastPolicy::default();
        let exactly_raw = judge_colors("t", Rgb::new(0, 0, 0), Rgb::new(20, 0, 0), &policy)
            .expect("distance 20 is distinct");
        assert_eq!(exactly_raw.raw_distance(), 20);

        // 11 -> 15 per channel, fixed distance exactly 12 with a custom threshold.
        let tight = ContrastPolicy {
            fixed_threshold: 12,
            ..policy
        };
        let fixed = judge_colors("t", Rgb::gray(11), Rgb::gray(11), &tight).expect("inclusive");
        assert!(matches!(fixed, ContrastPass::FixedUp { fixed_distance: 12, .. }));
    }

    #[test]
    fn configured_thresholds_and_brighten_policy_are_honored() {
        let strict = ContrastPolicy {
            raw_threshold: 200,
            fixed_threshold: 40,
            brighten: BrightenPolicy::default(),
        };
        let error = judge_colors("t", Rgb::gray(0x20), Rgb::gray(0x4a), &strict)
            .expect_err("126 is below a raw threshold of 200 and fixup gives 30");
        assert!(matches!(
            error,
            CheckError::ContrastInadequate {
                raw_distance: 126,
                fixed_distance: 30,
                ..
            }
        ));
    }
}
