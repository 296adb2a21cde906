use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::audit::{audit_paint_source, missing_literals, scan_source_tree};
use crate::config::{HoverConfig, ProjectLayout};
use crate::contrast::evaluate_entry;
use crate::error::{CheckError, Result};
use crate::report::{Report, RunSummary};
use crate::theme::load_theme_dir;
use crate::util::read_text_lossy;

pub const THEME_SECTION: &str = "Hover visibility across themes";
pub const PAINT_SECTION: &str = "Paint routing handles required elements";
pub const STYLESHEET_SECTION: &str = "No stylesheet on the menu bar";
pub const FIXUP_SECTION: &str = "Theme loader applies hover fixup";

/// Which groups of checks a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub themes: bool,
    pub audit: bool,
}

impl Selection {
    pub const ALL: Self = Self {
        themes: true,
        audit: true,
    };
    pub const THEMES: Self = Self {
        themes: true,
        audit: false,
    };
    pub const AUDIT: Self = Self {
        themes: false,
        audit: true,
    };
}

/// Run the selected checks against the project at `project_dir`, writing the
/// report to `out`.
///
/// Individual check failures are report lines, not errors. The only error
/// returned for project content is [`CheckError::NoThemesFound`], after its
/// single `FAIL` line has been written; I/O errors on `out` also propagate.
pub fn run_checks<W: Write>(
    config: &HoverConfig,
    project_dir: &Path,
    selection: Selection,
    out: W,
) -> Result<RunSummary> {
    let layout = config.layout.resolved(project_dir);
    let mut report = Report::new(out);

    info!(
        project_dir = %project_dir.display(),
        theme_dir = %layout.theme_dir.display(),
        raw_threshold = config.policy.raw_threshold,
        fixed_threshold = config.policy.fixed_threshold,
        "starting hover checks"
    );

    if selection.themes {
        check_themes(config, &layout, project_dir, &mut report)?;
    }
    if selection.audit {
        check_paint_markers(config, &layout, project_dir, &mut report)?;
        check_menu_bar_stylesheets(config, &layout, &mut report)?;
        check_fixup_present(config, &layout, project_dir, &mut report)?;
    }

    let summary = report.finish()?;
    info!(
        passed = summary.passed,
        ok = summary.ok_count,
        failed = summary.fail_count,
        "hover checks finished"
    );
    Ok(summary)
}

fn display_path(project_dir: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(project_dir).unwrap_or(path).to_path_buf()
}

fn check_themes<W: Write>(
    config: &HoverConfig,
    layout: &ProjectLayout,
    project_dir: &Path,
    report: &mut Report<W>,
) -> Result<()> {
    let entries = load_theme_dir(&layout.theme_dir, &layout.theme_extension);
    if entries.is_empty() {
        let shown = display_path(project_dir, &layout.theme_dir);
        report.abort(&format!("No theme files found in {}", shown.display()))?;
        return Err(CheckError::NoThemesFound {
            path: layout.theme_dir.clone(),
        });
    }

    report.section(THEME_SECTION)?;
    for entry in entries {
        let verdict = evaluate_entry(entry, &config.policy);
        match &verdict.outcome {
            Ok(pass) => report.ok(pass.describe(&verdict.name))?,
            Err(error) => report.fail(error.to_string())?,
        }
    }
    Ok(())
}

fn check_paint_markers<W: Write>(
    config: &HoverConfig,
    layout: &ProjectLayout,
    project_dir: &Path,
    report: &mut Report<W>,
) -> Result<()> {
    report.section(PAINT_SECTION)?;
    let file = display_path(project_dir, &layout.paint_source)
        .display()
        .to_string();

    match audit_paint_source(&layout.paint_source, &config.markers) {
        Ok(findings) => {
            for finding in findings {
                if finding.present {
                    report.ok(format!("{file} handles {}", finding.label))?;
                } else {
                    let error = CheckError::MissingMarker {
                        label: finding.label,
                        file: file.clone(),
                    };
                    report.fail(error.to_string())?;
                }
            }
        }
        Err(error) => report.fail(error.to_string())?,
    }
    Ok(())
}

fn check_menu_bar_stylesheets<W: Write>(
    config: &HoverConfig,
    layout: &ProjectLayout,
    report: &mut Report<W>,
) -> Result<()> {
    report.section(STYLESHEET_SECTION)?;

    match scan_source_tree(
        &layout.source_root,
        &layout.source_extensions,
        &config.forbidden,
    ) {
        Ok(hits) if hits.is_empty() => report.ok(format!(
            "no {} call on {}",
            config.forbidden.call,
            config.forbidden.receivers.join("/")
        ))?,
        Ok(hits) => {
            for hit in hits {
                report.fail(CheckError::from(hit).to_string())?;
            }
        }
        Err(error) => report.fail(error.to_string())?,
    }
    Ok(())
}

fn check_fixup_present<W: Write>(
    config: &HoverConfig,
    layout: &ProjectLayout,
    project_dir: &Path,
    report: &mut Report<W>,
) -> Result<()> {
    report.section(FIXUP_SECTION)?;
    let file = display_path(project_dir, &layout.fixup_source)
        .display()
        .to_string();

    match read_text_lossy(&layout.fixup_source) {
        Ok(code) => {
            let missing = missing_literals(&code, &config.fixup_markers);
            if missing.is_empty() {
                report.ok(format!("{file} has hover fixup"))?;
            }
            for literal in missing {
                let error = CheckError::MissingMarker {
                    label: literal.to_string(),
                    file: file.clone(),
                };
                report.fail(error.to_string())?;
            }
        }
        Err(error) => report.fail(error.to_string())?,
    }
    Ok(())
}
