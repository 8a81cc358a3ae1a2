//! Output reconciliation: the compare-then-write decision applied to each
//! rendered artifact against existing filesystem state.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::{debug, info};

use stencil_core::{Error, Result};

use crate::stats::Statistics;

/// One rendered unit of output, alive for a single reconciliation call.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Directory relative to the run output directory, when any.
    pub directory: Option<String>,
    pub file_name: String,
    pub content: String,
    pub gen_once: bool,
    /// Wildcard checked instead of the exact file name for gen-once.
    pub gen_once_pattern: Option<String>,
}

/// Reconciliation result for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Gen-once target already present, nothing counted or written.
    SkippedGenOnce,
    Unchanged,
    Created,
    Updated,
}

/// Decides create/update/skip for rendered artifacts.
///
/// Simulation performs every comparison and counts every statistic but
/// suppresses directory creation and file writes. The no-changes assertion
/// fails before any write would happen.
#[derive(Debug, Clone)]
pub struct Reconciler {
    output_dir: PathBuf,
    simulation: bool,
    expect_no_changes: bool,
}

impl Reconciler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            simulation: false,
            expect_no_changes: false,
        }
    }

    pub fn simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn expect_no_changes(mut self, expect_no_changes: bool) -> Self {
        self.expect_no_changes = expect_no_changes;
        self
    }

    pub fn reconcile(&self, artifact: &OutputArtifact, stats: &mut Statistics) -> Result<Outcome> {
        let dir = match &artifact.directory {
            Some(directory) => self.output_dir.join(directory),
            None => self.output_dir.clone(),
        };
        if !self.simulation && !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }

        let path = dir.join(&artifact.file_name);

        if artifact.gen_once {
            let suppressed = match &artifact.gen_once_pattern {
                None => path.exists(),
                Some(pattern) => matches_any(&dir, pattern)?,
            };
            if suppressed {
                debug!(file = %path.display(), "skipped (gen-once)");
                return Ok(Outcome::SkippedGenOnce);
            }
        }

        let generated: Vec<&str> = artifact.content.lines().collect();
        stats.lines += generated.len();

        if path.exists() {
            let existing = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            let previous: Vec<&str> = existing.lines().collect();
            match compare_lines(&previous, &generated) {
                None => {
                    stats.unchanged += 1;
                    debug!(file = %path.display(), "unchanged");
                    Ok(Outcome::Unchanged)
                }
                Some(diff) => {
                    if self.expect_no_changes {
                        return Err(Box::new(Error::ChangesUpdate { path, diff }));
                    }
                    if !self.simulation {
                        fs::write(&path, &artifact.content).map_err(|e| Error::io(&path, e))?;
                    }
                    stats.updated += 1;
                    info!(file = %path.display(), "updated");
                    Ok(Outcome::Updated)
                }
            }
        } else {
            if self.expect_no_changes {
                return Err(Box::new(Error::ChangesCreate { path }));
            }
            if !self.simulation {
                fs::write(&path, &artifact.content).map_err(|e| Error::io(&path, e))?;
            }
            stats.created += 1;
            info!(file = %path.display(), "created");
            Ok(Outcome::Created)
        }
    }
}

/// Whether any file in `dir` matches the wildcard pattern. A directory that
/// does not exist yet (simulation) has no matches.
fn matches_any(dir: &Path, pattern: &str) -> Result<bool> {
    let matcher = Glob::new(pattern)
        .map_err(|e| Error::invalid("genOncePattern", e.to_string()))?
        .compile_matcher();

    if !dir.is_dir() {
        return Ok(false);
    }
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if entry.path().is_file() && matcher.is_match(entry.file_name()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Compare existing lines with generated lines, reporting the line-count
/// difference and the first differing line only.
fn compare_lines(previous: &[&str], generated: &[&str]) -> Option<String> {
    let mut diff = String::new();
    if previous.len() != generated.len() {
        let _ = writeln!(
            diff,
            "> line count difference; previous '{}' versus generated '{}'",
            previous.len(),
            generated.len()
        );
    }

    for (i, (prev, new)) in previous.iter().zip(generated).enumerate() {
        if prev != new {
            let _ = writeln!(diff, "> line '{}' content difference (no further lines compared);", i + 1);
            let _ = writeln!(diff, ">  previous--> {prev}");
            let _ = writeln!(diff, ">  generated-> {new}");
            break;
        }
    }

    (!diff.is_empty()).then_some(diff)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn artifact(file: &str, content: &str) -> OutputArtifact {
        OutputArtifact {
            directory: None,
            file_name: file.to_string(),
            content: content.to_string(),
            gen_once: false,
            gen_once_pattern: None,
        }
    }

    #[test]
    fn creates_then_leaves_unchanged() {
        let temp = TempDir::new().unwrap();
        let reconciler = Reconciler::new(temp.path());
        let mut stats = Statistics::default();

        let a = artifact("out.txt", "line1\nline2\n");
        assert_eq!(reconciler.reconcile(&a, &mut stats).unwrap(), Outcome::Created);
        assert_eq!(reconciler.reconcile(&a, &mut stats).unwrap(), Outcome::Unchanged);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.lines, 4);
    }

    #[test]
    fn updates_on_content_difference() {
        let temp = TempDir::new().unwrap();
        let reconciler = Reconciler::new(temp.path());
        let mut stats = Statistics::default();

        reconciler.reconcile(&artifact("out.txt", "old\n"), &mut stats).unwrap();
        let outcome = reconciler.reconcile(&artifact("out.txt", "new\n"), &mut stats).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(std::fs::read_to_string(temp.path().join("out.txt")).unwrap(), "new\n");
    }

    #[test]
    fn creates_relative_directories() {
        let temp = TempDir::new().unwrap();
        let reconciler = Reconciler::new(temp.path());
        let mut stats = Statistics::default();

        let a = OutputArtifact {
            directory: Some("nested/deep".to_string()),
            ..artifact("out.txt", "x\n")
        };
        reconciler.reconcile(&a, &mut stats).unwrap();
        assert!(temp.path().join("nested/deep/out.txt").is_file());
    }

    #[test]
    fn gen_once_skips_existing_file_regardless_of_content() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("out.txt"), "hand edited").unwrap();
        let reconciler = Reconciler::new(temp.path());
        let mut stats = Statistics::default();

        let a = OutputArtifact {
            gen_once: true,
            ..artifact("out.txt", "generated")
        };
        assert_eq!(
            reconciler.reconcile(&a, &mut stats).unwrap(),
            Outcome::SkippedGenOnce
        );
        // nothing written, nothing counted
        assert_eq!(std::fs::read_to_string(temp.path().join("out.txt")).unwrap(), "hand edited");
        assert_eq!(stats.artifacts(), 0);
        assert_eq!(stats.lines, 0);
    }

    #[test]
    fn gen_once_pattern_matches_by_wildcard() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Person.generated.txt"), "x").unwrap();
        let reconciler = Reconciler::new(temp.path());
        let mut stats = Statistics::default();

        let suppressed = OutputArtifact {
            gen_once: true,
            gen_once_pattern: Some("Person.*.txt".to_string()),
            ..artifact("Person.txt", "generated")
        };
        assert_eq!(
            reconciler.reconcile(&suppressed, &mut stats).unwrap(),
            Outcome::SkippedGenOnce
        );

        let unmatched = OutputArtifact {
            gen_once: true,
            gen_once_pattern: Some("Other.*.txt".to_string()),
            ..artifact("Other.txt", "generated")
        };
        assert_eq!(
            reconciler.reconcile(&unmatched, &mut stats).unwrap(),
            Outcome::Created
        );
    }

    #[test]
    fn expect_no_changes_fails_before_any_write() {
        let temp = TempDir::new().unwrap();
        let reconciler = Reconciler::new(temp.path()).expect_no_changes(true);
        let mut stats = Statistics::default();

        let err = reconciler
            .reconcile(&artifact("out.txt", "x\n"), &mut stats)
            .unwrap_err();
        assert!(err.is_changes_found());
        assert!(!temp.path().join("out.txt").exists());
    }

    #[test]
    fn expect_no_changes_reports_the_first_difference() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("out.txt"), "a\nb\nc\n").unwrap();
        let reconciler = Reconciler::new(temp.path()).expect_no_changes(true);
        let mut stats = Statistics::default();

        let err = reconciler
            .reconcile(&artifact("out.txt", "a\nX\nY\n"), &mut stats)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("would be updated as a result of the generation"), "{message}");
        assert!(message.contains("> line '2' content difference (no further lines compared);"));
        assert!(message.contains(">  previous--> b"));
        assert!(message.contains(">  generated-> X"));
        // existing file is untouched
        assert_eq!(
            std::fs::read_to_string(temp.path().join("out.txt")).unwrap(),
            "a\nb\nc\n"
        );
    }

    #[test]
    fn simulation_counts_but_does_not_write() {
        let temp = TempDir::new().unwrap();
        let reconciler = Reconciler::new(temp.path().join("sim")).simulation(true);
        let mut stats = Statistics::default();

        let outcome = reconciler
            .reconcile(&artifact("out.txt", "a\nb\n"), &mut stats)
            .unwrap();
        assert_eq!(outcome, Outcome::Created);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.lines, 2);
        // not even the directory is created
        assert!(!temp.path().join("sim").exists());
    }

    #[test]
    fn diff_reports_line_count_then_first_difference() {
        let diff = compare_lines(&["a", "b"], &["a", "b", "c"]).unwrap();
        assert_eq!(diff, "> line count difference; previous '2' versus generated '3'\n");

        let diff = compare_lines(&["a", "b", "c"], &["a", "x", "y"]).unwrap();
        assert!(diff.contains("line '2' content difference"));
        assert!(diff.contains(">  previous--> b"));
        // only the first differing line is reported
        assert!(!diff.contains("line '3'"));

        assert!(compare_lines(&["a"], &["a"]).is_none());
    }

    #[test]
    fn diff_format_is_stable() {
        let diff = compare_lines(&["a", "b", "c"], &["a", "x"]).unwrap();
        insta::assert_snapshot!(diff, @r"
        > line count difference; previous '3' versus generated '2'
        > line '2' content difference (no further lines compared);
        >  previous--> b
        >  generated-> x
        ");
    }
}
