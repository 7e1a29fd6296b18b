#![doc = include_str!("../README.md")]

use std::path::Path;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

pub const CONFIG_FILENAME: &str = "rosdep-patch.toml";

fn example_file() -> String {
    "rosdep/base.yaml".into()
}

fn example_releases() -> Vec<String> {
    vec![
        "focal".into(),
        "jammy".into(),
        "noble".into(),
        "resolute".into(),
    ]
}

/// Configuration file for `rosdep-patch`.
///
/// `rosdep-patch` walks up the directory tree from the working directory
/// looking for `rosdep-patch.toml` files and merges them together. Settings in
/// child directories take priority over parent directories. Set `root = true`
/// to stop the upward search.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(title = "rosdep-patch.toml")]
pub struct Config {
    /// Mark this configuration file as the project root.
    ///
    /// When `true`, the upward search stops here and no `rosdep-patch.toml`
    /// from a parent directory is merged.
    #[serde(default)]
    pub root: bool,

    /// Path of the rosdep document to patch, relative to the working
    /// directory. Defaults to `base.yaml`.
    #[schemars(title = "Document Path", example = example_file())]
    #[serde(default)]
    pub file: Option<String>,

    /// Name of the OS family mapping whose release entries are extended.
    /// Defaults to `ubuntu`.
    #[schemars(title = "OS Family")]
    #[serde(default)]
    pub os: Option<String>,

    /// Release names of the OS family, oldest first.
    ///
    /// Replaces the built-in Ubuntu release list. A release's position in this
    /// list is its rank; names missing from the list are never cloned.
    #[schemars(title = "Release Ranking", example = example_releases())]
    #[serde(default)]
    pub releases: Option<Vec<String>>,

    /// Release to synthesize when a mapping lacks it.
    ///
    /// Defaults to the last entry of `releases` (or of the built-in list).
    #[schemars(title = "Target Release")]
    #[serde(default)]
    pub target: Option<String>,
}

impl Config {
    /// Merge a parent config into this one. Every field the child leaves
    /// unset is taken from the parent. `root` is not inherited.
    fn merge_parent(&mut self, parent: Config) {
        self.file = self.file.take().or(parent.file);
        self.os = self.os.take().or(parent.os);
        self.releases = self.releases.take().or(parent.releases);
        self.target = self.target.take().or(parent.target);
    }

    fn validate(&self, path: &Path) -> Result<(), anyhow::Error> {
        if self.releases.as_ref().is_some_and(Vec::is_empty) {
            anyhow::bail!("{}: `releases` must not be empty", path.display());
        }
        if self.os.as_deref().is_some_and(str::is_empty) {
            anyhow::bail!("{}: `os` must not be empty", path.display());
        }
        Ok(())
    }
}

/// Generate the JSON Schema for `rosdep-patch.toml` as a `serde_json::Value`.
///
/// # Panics
///
/// Panics if the schema cannot be serialized to JSON (should never happen).
pub fn schema() -> Value {
    serde_json::to_value(schema_for!(Config)).expect("schema serialization cannot fail")
}

/// Search for `rosdep-patch.toml` files starting from `start_dir`, walking up.
/// Merges all configs found until one with `root = true` is hit (inclusive).
/// Returns the merged config, or `None` if no config file was found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read, parsed, or
/// contains an empty release list.
pub fn find_and_load(start_dir: &Path) -> Result<Option<Config>, anyhow::Error> {
    let mut configs: Vec<Config> = Vec::new();
    let mut dir = start_dir.to_path_buf();

    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            let content = std::fs::read_to_string(&candidate)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", candidate.display()))?;
            let cfg: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", candidate.display()))?;
            cfg.validate(&candidate)?;
            let is_root = cfg.root;
            configs.push(cfg);
            if is_root {
                break;
            }
        }
        if !dir.pop() {
            break;
        }
    }

    if configs.is_empty() {
        return Ok(None);
    }

    // configs[0] is the closest (child), last is the farthest (root-most parent)
    let mut merged = configs.remove(0);
    for parent in configs {
        merged.merge_parent(parent);
    }
    Ok(Some(merged))
}

/// Load config from the current working directory (walking upward).
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load() -> Result<Config, anyhow::Error> {
    let cwd = std::env::current_dir()?;
    Ok(find_and_load(&cwd)?.unwrap_or_default())
}
