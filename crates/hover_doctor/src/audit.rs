//! Source pattern checks against the host's paint-routing code.
//!
//! These are existence/absence greps, nothing more: the paint-routing source
//! must mention each required control element and palette role, no UI source
//! may assign a stylesheet to the menu bar (that would bypass the custom
//! painter), and the theme loader must contain the brighten fixup itself.

use std::fs;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CheckError, Result};
use crate::util::{read_text_lossy, relative_to};

/// A required marker: a display label and the regex that proves it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub label: String,
    pub pattern: String,
}

impl MarkerSpec {
    #[must_use]
    pub fn new(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
        }
    }

    fn element(name: &str) -> Self {
        Self::new(name, format!(r"element\s*==\s*{name}"))
    }

    fn compile(&self) -> Result<Regex> {
        Regex::new(&self.pattern).map_err(|error| CheckError::InvalidPattern {
            label: self.label.clone(),
            message: error.to_string(),
        })
    }
}

/// Control elements and palette role the menu painter must branch on.
#[must_use]
pub fn default_paint_markers() -> Vec<MarkerSpec> {
    vec![
        MarkerSpec::element("CE_MenuBarItem"),
        MarkerSpec::element("CE_MenuItem"),
        MarkerSpec::element("CE_MenuBarEmptyArea"),
        MarkerSpec::new("State_Selected", "State_Selected"),
        MarkerSpec::new("QPalette::Mid", "QPalette::Mid"),
    ]
}

/// Literals that prove the theme loader applies the hover fixup.
#[must_use]
pub fn default_fixup_markers() -> Vec<String> {
    vec!["lighter(130)".to_string(), "t.hover".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerFinding {
    pub label: String,
    pub present: bool,
}

/// Check every marker against `code`. Fails only if a pattern does not compile.
pub fn scan_markers(code: &str, markers: &[MarkerSpec]) -> Result<Vec<MarkerFinding>> {
    markers
        .iter()
        .map(|marker| -> Result<MarkerFinding> {
            let re = marker.compile()?;
            Ok(MarkerFinding {
                label: marker.label.clone(),
                present: re.is_match(code),
            })
        })
        .collect()
}

pub fn audit_paint_source(path: &Path, markers: &[MarkerSpec]) -> Result<Vec<MarkerFinding>> {
    let code = read_text_lossy(path)?;
    debug!(path = %path.display(), bytes = code.len(), "scanning paint-routing source");
    scan_markers(&code, markers)
}

/// Literal markers from `literals` that do not appear in `code`.
#[must_use]
pub fn missing_literals<'a>(code: &str, literals: &'a [String]) -> Vec<&'a str> {
    literals
        .iter()
        .filter(|literal| !code.contains(literal.as_str()))
        .map(String::as_str)
        .collect()
}

/// A call that must never target the menu bar: a line is a hit when it names
/// any receiver together with the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForbiddenCall {
    pub receivers: Vec<String>,
    pub call: String,
}

impl Default for ForbiddenCall {
    fn default() -> Self {
        Self {
            receivers: vec!["menuBar".to_string(), "m_menuBar".to_string()],
            call: "setStyleSheet".to_string(),
        }
    }
}

impl ForbiddenCall {
    #[must_use]
    pub fn matches_line(&self, line: &str) -> bool {
        line.contains(self.call.as_str())
            && self
                .receivers
                .iter()
                .any(|receiver| line.contains(receiver.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForbiddenHit {
    pub path: PathBuf,
    pub line_number: usize,
    pub line: String,
}

impl From<ForbiddenHit> for CheckError {
    fn from(hit: ForbiddenHit) -> Self {
        Self::ForbiddenPattern {
            path: hit.path,
            line_number: hit.line_number,
            line: hit.line,
        }
    }
}

#[must_use]
pub fn scan_forbidden(content: &str, path: &Path, rule: &ForbiddenCall) -> Vec<ForbiddenHit> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| rule.matches_line(line))
        .map(|(index, line)| ForbiddenHit {
            path: path.to_path_buf(),
            line_number: index + 1,
            line: line.trim().to_string(),
        })
        .collect()
}

/// Every file under `root` (recursively) whose extension is in `extensions`,
/// sorted by path. Unreadable subdirectories are logged and skipped; only an
/// unreadable `root` is an error.
pub fn collect_source_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CheckError::MissingPath {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) if dir.as_path() != root => {
                warn!(dir = %dir.display(), %error, "skipping unreadable source directory");
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(dir = %dir.display(), %error, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            // Directory symlinks are not descended; file symlinks are scanned.
            let is_real_dir = entry.file_type().is_ok_and(|file_type| file_type.is_dir());
            if is_real_dir {
                pending.push(path);
            } else if path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
            {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Scan the whole source tree. Hit paths are reported relative to `root`.
pub fn scan_source_tree(
    root: &Path,
    extensions: &[String],
    rule: &ForbiddenCall,
) -> Result<Vec<ForbiddenHit>> {
    let mut hits = Vec::new();
    for path in collect_source_files(root, extensions)? {
        let content = match read_text_lossy(&path) {
            Ok(content) => content,
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping unreadable source file");
                continue;
            }
        };
        let label = relative_to(root, &path).unwrap_or_else(|| path.clone());
        hits.extend(scan_forbidden(&content, &label, rule));
    }
    debug!(root = %root.display(), hits = hits.len(), "scanned source tree");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{
        ForbiddenCall, MarkerSpec, collect_source_files, default_fixup_markers,
        default_paint_markers, missing_literals, scan_forbidden, scan_markers, scan_source_tree,
    };
    use crate::error::CheckError;

    const PAINTER: &str = r"
void MenuBarStyle::drawControl(ControlElement element, const QStyleOption* opt,
                               QPainter* p, const QWidget* w) const {
    if (element == CE_MenuBarItem || element==CE_MenuItem) {
        if (opt->state & State_Selected)
            p->fillRect(opt->rect, opt->palette.color(QPalette::Mid));
    } else if (element ==  CE_MenuBarEmptyArea) {
        return;
    }
}
";

    #[test]
    fn all_default_markers_found_in_painter() {
        let findings = scan_markers(PAINTER, &default_paint_markers()).expect("scan");
        assert_eq!(findings.len(), 5);
        assert!(findings.iter().all(|finding| finding.present), "{findings:?}");
    }

    #[test]
    fn marker_requires_comparison_not_bare_mention() {
        let code = "// handles CE_MenuBarEmptyArea elsewhere\nState_Selected QPalette::Mid";
        let findings = scan_markers(code, &default_paint_markers()).expect("scan");
        let missing = findings
            .iter()
            .filter(|finding| !finding.present)
            .map(|finding| finding.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(missing, vec!["CE_MenuBarItem", "CE_MenuItem", "CE_MenuBarEmptyArea"]);
    }

    #[test]
    fn invalid_marker_pattern_is_reported() {
        let error = scan_markers("x", &[MarkerSpec::new("broken", "(unclosed")])
            .expect_err("bad regex should fail");
        assert!(matches!(error, CheckError::InvalidPattern { ref label, .. } if label == "broken"));
    }

    #[test]
    fn missing_literals_lists_absent_fixup_markers() {
        let markers = default_fixup_markers();
        let code = "if (t.hover == t.background) t.hover = t.background.lighter(130);";
        assert!(missing_literals(code, &markers).is_empty());
        assert_eq!(missing_literals("t.hover = x;", &markers), vec!["lighter(130)"]);
    }

    #[test]
    fn forbidden_call_needs_receiver_and_call_on_same_line() {
        let rule = ForbiddenCall::default();
        let content = "menuBar()->setFont(f);\nm_menuBar->setStyleSheet(css);\nsetStyleSheet(css);\n  menuBar()->setStyleSheet(\"\");  \n";
        let hits = scan_forbidden(content, Path::new("main.cpp"), &rule);
        assert_eq!(
            hits.iter().map(|hit| hit.line_number).collect::<Vec<_>>(),
            vec![2, 4]
        );
        assert_eq!(hits[1].line, "menuBar()->setStyleSheet(\"\");");
    }

    #[test]
    fn source_tree_scan_is_recursive_sorted_and_relative() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("src");
        fs::create_dir_all(root.join("ui")).expect("ui dir");
        fs::write(root.join("main.cpp"), "m_menuBar->setStyleSheet(css);\n").expect("main");
        fs::write(root.join("ui/bar.cpp"), "ok();\nmenuBar()->setStyleSheet(x);\n").expect("bar");
        fs::write(root.join("ui/bar.h"), "menuBar()->setStyleSheet(x);\n").expect("header");
        // Invalid UTF-8 must not abort the scan.
        fs::write(root.join("ui/latin1.cpp"), b"// caf\xe9\nplain();\n").expect("latin1");

        let files = collect_source_files(&root, &["cpp".to_string()]).expect("collect");
        assert_eq!(files.len(), 3);

        let hits = scan_source_tree(&root, &["cpp".to_string()], &ForbiddenCall::default())
            .expect("scan tree");
        let locations = hits
            .iter()
            .map(|hit| (hit.path.clone(), hit.line_number))
            .collect::<Vec<_>>();
        assert_eq!(
            locations,
            vec![(PathBuf::from("main.cpp"), 1), (PathBuf::from("ui/bar.cpp"), 2)]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_source_file_is_scanned() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("src");
        fs::create_dir_all(&root).expect("src dir");
        let outside = temp.path().join("shared_window.cpp");
        fs::write(&outside, "m_menuBar->setStyleSheet(css);\n").expect("outside source");
        std::os::unix::fs::symlink(&outside, root.join("window.cpp")).expect("symlink");

        let hits = scan_source_tree(&root, &["cpp".to_string()], &ForbiddenCall::default())
            .expect("scan tree");
        assert_eq!(hits.len(), 1, "{hits:?}");
        assert_eq!(hits[0].path, PathBuf::from("window.cpp"));
        assert_eq!(hits[0].line_number, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_not_descended() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("src");
        fs::create_dir_all(&root).expect("src dir");
        // A link back to the root would loop forever if followed.
        std::os::unix::fs::symlink(&root, root.join("loop")).expect("dir symlink");
        fs::write(root.join("main.cpp"), "plain();\n").expect("main");

        let files = collect_source_files(&root, &["cpp".to_string()]).expect("collect");
        assert_eq!(files, vec![root.join("main.cpp")]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_keeps_other_hits() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("src");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).expect("locked dir");
        fs::write(locked.join("hidden.cpp"), "plain();\n").expect("hidden");
        fs::write(root.join("main.cpp"), "menuBar()->setStyleSheet(x);\n").expect("main");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("lock dir");

        let result = scan_source_tree(&root, &["cpp".to_string()], &ForbiddenCall::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock dir");

        let hits = result.expect("unreadable subdirectory is skipped, not fatal");
        assert_eq!(hits.len(), 1, "{hits:?}");
        assert_eq!(hits[0].path, PathBuf::from("main.cpp"));
    }

    #[test]
    fn missing_source_root_is_reported() {
        let temp = tempdir().expect("tempdir");
        let missing = temp.path().join("nope");
        let error = collect_source_files(&missing, &["cpp".to_string()])
            .expect_err("missing root should fail");
        assert!(matches!(error, CheckError::MissingPath { path } if path == missing));
    }
}
