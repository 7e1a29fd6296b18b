#![doc = include_str!("../README.md")]

extern crate alloc;

use alloc::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use bpaf::{Bpaf, ShellComp};
use thiserror::Error;

use rosdep_patch_config::Config;

pub mod cloner;
pub mod document;
pub mod grouper;
pub mod ranking;
pub mod scanner;
pub mod selector;
pub mod writer;

use document::Document;
use grouper::group_entries;
use ranking::ReleaseRanking;
use scanner::{Block, BlockScanner};
use selector::{Selection, select};
use writer::{Patch, PatchedDocument};

pub const DEFAULT_FILE: &str = "base.yaml";
pub const DEFAULT_OS: &str = "ubuntu";

// ---------------------------------------------------------------------------
// CLI args
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Bpaf)]
#[bpaf(generate(patch_args_inner))]
pub struct PatchArgs {
    /// OS family mapping to extend (default: ubuntu)
    #[bpaf(long("os"), argument("NAME"))]
    pub os: Option<String>,

    /// Release to add (default: the newest known release)
    #[bpaf(long("target"), argument("RELEASE"))]
    pub target: Option<String>,

    /// Don't write the file, only report which packages would be patched
    #[bpaf(long("check"), switch)]
    pub check: bool,

    /// rosdep document to patch (default: base.yaml)
    #[bpaf(positional("FILE"), complete_shell(ShellComp::File { mask: None }))]
    pub file: Option<String>,
}

/// Construct the bpaf parser for `PatchArgs`.
pub fn patch_args() -> impl bpaf::Parser<PatchArgs> {
    patch_args_inner()
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to patch: the OS family mapping, its release ranking, and the release
/// to synthesize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    pub os: String,
    pub ranking: ReleaseRanking,
    pub target: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        let ranking = ReleaseRanking::ubuntu();
        let target = ranking.newest().unwrap_or_default().to_string();
        Self {
            os: DEFAULT_OS.to_string(),
            ranking,
            target,
        }
    }
}

impl PatchOptions {
    /// Combine CLI flags with the loaded config. Flags win over config values,
    /// which win over the built-in Ubuntu defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the release ranking is empty, if the target is not
    /// a valid release key, or if the OS family name is empty.
    pub fn resolve(args: &PatchArgs, config: &Config) -> Result<Self> {
        let ranking = config
            .releases
            .as_ref()
            .map_or_else(ReleaseRanking::ubuntu, |names| {
                ReleaseRanking::new(names.iter().cloned())
            });
        if ranking.is_empty() {
            anyhow::bail!("the release ranking is empty");
        }
        let target = args
            .target
            .as_deref()
            .or(config.target.as_deref())
            .or_else(|| ranking.newest())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no target release: the release ranking is empty"))?;
        // A target the grouper cannot read back would be appended on every run.
        if !grouper::is_release_name(&target) {
            anyhow::bail!(
                "invalid target release '{target}': expected letters, digits and '-' only"
            );
        }
        let os = args
            .os
            .clone()
            .or_else(|| config.os.clone())
            .unwrap_or_else(|| DEFAULT_OS.to_string());
        if os.trim().is_empty() {
            anyhow::bail!("the OS family name must not be empty");
        }
        Ok(Self {
            os,
            ranking,
            target,
        })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Core logic
// ---------------------------------------------------------------------------

/// Clone the newest ranked entry of `block` under the target release, unless
/// the block is already covered.
fn synthesize<'a>(
    block: &Block<'_, 'a>,
    options: &PatchOptions,
) -> Option<(Patch, Vec<Cow<'a, str>>)> {
    let package = block.package.unwrap_or_default();
    let Some(grouping) = group_entries(block.lines) else {
        tracing::debug!(package, "block has no content");
        return None;
    };

    match select(&grouping, &options.ranking, &options.target) {
        Selection::Clone(entry) => {
            tracing::debug!(
                package,
                base_indent = grouping.base_indent,
                source = entry.name(),
                target = %options.target,
                "cloning release entry"
            );
            let patch = Patch {
                package: block.package.map(str::to_string),
                source: entry.name().to_string(),
                target: options.target.clone(),
            };
            Some((patch, cloner::clone_entry(entry, &options.target)))
        }
        skipped => {
            tracing::debug!(
                package,
                reason = skipped.skip_reason().unwrap_or_default(),
                "block left unchanged"
            );
            None
        }
    }
}

/// Patch every `  <os>:` mapping of `source`. Lines that are not part of an
/// appended clone come out byte-identical and in their original order.
pub fn patch_document<'a>(source: &'a str, options: &PatchOptions) -> PatchedDocument<'a> {
    let document = Document::parse(source);
    let mut output = PatchedDocument::new();
    for chunk in BlockScanner::new(document.lines(), &options.os) {
        output.push_untouched(chunk.untouched);
        if let Some(block) = chunk.block {
            output.push_block(block.lines, synthesize(&block, options));
        }
    }
    output
}

/// Result of patching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub patches: Vec<Patch>,
    /// Whether the file was rewritten.
    pub written: bool,
}

/// Read `path`, patch it, and write it back when `write` is set and at least
/// one entry was added.
///
/// # Errors
///
/// Returns [`PatchError`] if the file cannot be read or written. Nothing is
/// written when reading fails.
pub fn patch_file(
    path: &Path,
    options: &PatchOptions,
    write: bool,
) -> Result<FileReport, PatchError> {
    let source = fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let patched = patch_document(&source, options);
    let written = if write {
        patched
            .write_if_modified(path)
            .map_err(|source| PatchError::Write {
                path: path.to_path_buf(),
                source,
            })?
    } else {
        false
    };

    Ok(FileReport {
        patches: patched.patches().to_vec(),
        written,
    })
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

pub struct PatchResult {
    pub path: PathBuf,
    pub target: String,
    pub patches: Vec<Patch>,
    pub written: bool,
}

/// Run the patch command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the document cannot be
/// read or written.
#[tracing::instrument(skip_all, name = "patch")]
pub fn run(args: &PatchArgs) -> Result<PatchResult> {
    let config = rosdep_patch_config::load()?;
    run_with_config(args, &config)
}

/// Run the patch command with an already loaded config.
///
/// # Errors
///
/// Returns an error if the options cannot be resolved or the document cannot
/// be read or written.
pub fn run_with_config(args: &PatchArgs, config: &Config) -> Result<PatchResult> {
    let options = PatchOptions::resolve(args, config)?;
    let path = PathBuf::from(
        args.file
            .as_deref()
            .or(config.file.as_deref())
            .unwrap_or(DEFAULT_FILE),
    );
    tracing::info!(path = %path.display(), os = %options.os, target = %options.target, "patching");

    let report = patch_file(&path, &options, !args.check)?;
    tracing::info!(
        patched = report.patches.len(),
        written = report.written,
        "finished"
    );

    Ok(PatchResult {
        path,
        target: options.target,
        patches: report.patches,
        written: report.written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patch(source: &str) -> (String, usize) {
        let patched = patch_document(source, &PatchOptions::default());
        (patched.to_string(), patched.patches().len())
    }

    #[test]
    fn clones_latest_release_under_target() {
        let source = "\
foo:
  ubuntu:
    focal:
      - foo
    jammy:
      - bar
";
        let (output, count) = patch(source);
        assert_eq!(count, 1);
        assert_eq!(
            output,
            "\
foo:
  ubuntu:
    focal:
      - foo
    jammy:
      - bar
    resolute:
      - bar
"
        );
    }

    #[test]
    fn second_run_is_a_no_op() {
        let source = "foo:\n  ubuntu:\n    noble: [foo]\nbar:\n  ubuntu:\n    jammy: [bar]\n";
        let (once, count) = patch(source);
        assert_eq!(count, 2);
        let (twice, count) = patch(&once);
        assert_eq!(count, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn wildcard_block_is_untouched() {
        let source = "foo:\n  ubuntu:\n    noble: [foo]\n    '*': [foo-legacy]\n";
        assert_eq!(patch(source), (source.to_string(), 0));
    }

    #[test]
    fn unranked_only_block_is_untouched() {
        let source = "foo:\n  ubuntu:\n    warty: [foo]\n    hoary: [foo]\n";
        assert_eq!(patch(source), (source.to_string(), 0));
    }

    #[test]
    fn other_os_families_are_untouched() {
        let source = "\
foo:
  debian:
    bookworm: [foo]
    jammy: [foo]
  ubuntu: [foo]
  fedora:
    focal: [foo]
";
        assert_eq!(patch(source), (source.to_string(), 0));
    }

    #[test]
    fn missing_trailing_newline() {
        let source = "foo:\n  ubuntu:\n    noble: [foo]";
        let (output, count) = patch(source);
        assert_eq!(count, 1);
        assert_eq!(output, "foo:\n  ubuntu:\n    noble: [foo]\n    resolute: [foo]");
    }

    #[test]
    fn clone_follows_trailing_blank_lines() {
        let source = "foo:\n  ubuntu:\n    noble: [foo]\n\nbar: [x]\n";
        let (output, _) = patch(source);
        assert_eq!(
            output,
            "foo:\n  ubuntu:\n    noble: [foo]\n\n    resolute: [foo]\n\nbar: [x]\n"
        );
    }

    #[test]
    fn crlf_lines_are_preserved() {
        let source = "foo:\r\n  ubuntu:\r\n    \"jammy\": [foo]\r\n";
        let (output, count) = patch(source);
        assert_eq!(count, 1);
        assert_eq!(
            output,
            "foo:\r\n  ubuntu:\r\n    \"jammy\": [foo]\r\n    \"resolute\": [foo]\r\n"
        );
    }

    #[test]
    fn duplicate_entries_clone_the_last() {
        let source = "foo:\n  ubuntu:\n    noble: [old]\n    noble: [new]\n";
        let (output, count) = patch(source);
        assert_eq!(count, 1);
        assert_eq!(
            output,
            "foo:\n  ubuntu:\n    noble: [old]\n    noble: [new]\n    resolute: [new]\n"
        );
    }

    #[test]
    fn orphaned_lines_stay_in_place() {
        let source = "\
foo:
  ubuntu:
    jammy: [foo]
    <<: *defaults
      stray: true
";
        let (output, count) = patch(source);
        assert_eq!(count, 1);
        assert_eq!(output, format!("{source}    resolute: [foo]\n"));
    }

    #[test]
    fn resolve_prefers_flags_over_config() -> anyhow::Result<()> {
        let config = Config {
            os: Some("debian".into()),
            releases: Some(vec!["bullseye".into(), "bookworm".into(), "trixie".into()]),
            target: Some("trixie".into()),
            ..Config::default()
        };
        let args = PatchArgs {
            os: None,
            target: Some("bookworm".into()),
            check: false,
            file: None,
        };
        let options = PatchOptions::resolve(&args, &config)?;
        assert_eq!(options.os, "debian");
        assert_eq!(options.target, "bookworm");
        assert_eq!(options.ranking.rank("trixie"), Some(2));
        Ok(())
    }

    #[test]
    fn resolve_defaults_to_newest_release() -> anyhow::Result<()> {
        let args = PatchArgs {
            os: None,
            target: None,
            check: false,
            file: None,
        };
        let options = PatchOptions::resolve(&args, &Config::default())?;
        assert_eq!(options, PatchOptions::default());
        assert_eq!(options.target, "resolute");

        let config = Config {
            releases: Some(vec!["bookworm".into(), "trixie".into()]),
            ..Config::default()
        };
        assert_eq!(PatchOptions::resolve(&args, &config)?.target, "trixie");
        Ok(())
    }

    fn args_with(os: Option<&str>, target: Option<&str>) -> PatchArgs {
        PatchArgs {
            os: os.map(str::to_string),
            target: target.map(str::to_string),
            check: false,
            file: None,
        }
    }

    #[test]
    fn resolve_rejects_unparseable_targets() {
        for target in ["", "foo bar", "noble.1", "*", "'noble'", "noble:"] {
            let err = PatchOptions::resolve(&args_with(None, Some(target)), &Config::default())
                .expect_err("target should be rejected");
            assert!(
                err.to_string().starts_with("invalid target release"),
                "{target:?}: {err}"
            );
        }
    }

    #[test]
    fn resolve_rejects_unparseable_config_target() {
        let config = Config {
            target: Some("foo bar".into()),
            ..Config::default()
        };
        assert!(PatchOptions::resolve(&args_with(None, None), &config).is_err());
    }

    #[test]
    fn resolve_rejects_empty_os() {
        assert!(PatchOptions::resolve(&args_with(Some(""), None), &Config::default()).is_err());
        let config = Config {
            os: Some("  ".into()),
            ..Config::default()
        };
        assert!(PatchOptions::resolve(&args_with(None, None), &config).is_err());
    }

    #[test]
    fn resolve_rejects_empty_ranking() {
        let config = Config {
            releases: Some(Vec::new()),
            target: Some("noble".into()),
            ..Config::default()
        };
        assert!(PatchOptions::resolve(&args_with(None, None), &config).is_err());
    }

    #[test]
    fn accepted_targets_stay_idempotent() -> anyhow::Result<()> {
        let options =
            PatchOptions::resolve(&args_with(None, Some("26-04")), &Config::default())?;
        let source = "foo:\n  ubuntu:\n    noble: [foo]\n";
        let once = patch_document(source, &options).to_string();
        assert_eq!(once, "foo:\n  ubuntu:\n    noble: [foo]\n    26-04: [foo]\n");
        let twice = patch_document(&once, &options);
        assert!(!twice.is_modified());
        Ok(())
    }

    #[test]
    fn patch_file_writes_only_when_modified() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("base.yaml");
        let current = "foo:\n  ubuntu:\n    resolute: [foo]\n";
        fs::write(&path, current)?;

        let report = patch_file(&path, &PatchOptions::default(), true)?;
        assert!(report.patches.is_empty());
        assert!(!report.written);
        assert_eq!(fs::read_to_string(&path)?, current);

        fs::write(&path, "foo:\n  ubuntu:\n    noble: [foo]\n")?;
        let report = patch_file(&path, &PatchOptions::default(), true)?;
        assert!(report.written);
        assert_eq!(
            report.patches,
            vec![Patch {
                package: Some("foo".into()),
                source: "noble".into(),
                target: "resolute".into(),
            }]
        );
        assert_eq!(
            fs::read_to_string(&path)?,
            "foo:\n  ubuntu:\n    noble: [foo]\n    resolute: [foo]\n"
        );
        Ok(())
    }

    #[test]
    fn patch_file_without_write_leaves_file() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("base.yaml");
        let source = "foo:\n  ubuntu:\n    noble: [foo]\n";
        fs::write(&path, source)?;

        let report = patch_file(&path, &PatchOptions::default(), false)?;
        assert_eq!(report.patches.len(), 1);
        assert!(!report.written);
        assert_eq!(fs::read_to_string(&path)?, source);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_read_error() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("base.yaml");
        let err = patch_file(&path, &PatchOptions::default(), true)
            .expect_err("missing file should fail");
        assert!(matches!(err, PatchError::Read { .. }));
        assert!(err.to_string().starts_with("failed to read"));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn run_with_config_uses_config_file_path() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("rosdep.yaml");
        fs::write(&path, "foo:\n  debian:\n    bookworm: [foo]\n")?;

        let config = Config {
            file: Some(path.display().to_string()),
            os: Some("debian".into()),
            releases: Some(vec!["bookworm".into(), "trixie".into()]),
            ..Config::default()
        };
        let args = PatchArgs {
            os: None,
            target: None,
            check: false,
            file: None,
        };
        let result = run_with_config(&args, &config)?;
        assert_eq!(result.path, path);
        assert_eq!(result.target, "trixie");
        assert!(result.written);
        assert_eq!(
            fs::read_to_string(&path)?,
            "foo:\n  debian:\n    bookworm: [foo]\n    trixie: [foo]\n"
        );
        Ok(())
    }
}
