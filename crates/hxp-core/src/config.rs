use std::fs;
use std::path::{Path, PathBuf};

use hxp_parser::Target;
use hxp_runtime::DEFAULT_MAX_CALL_DEPTH;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Optional per-project settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "hxp.json";

/// Runtime configuration for the hxp CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Current working directory.
    #[serde(skip)]
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Target used by `compile` when none is given.
    pub target: Target,

    /// Request optimization from the code generator.
    pub optimize: bool,

    /// Emit source file information in generated code.
    pub debug_info: bool,

    /// Bound on nested calls in the interpreter.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            target: Target::default(),
            optimize: false,
            debug_info: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Load `hxp.json` from `cwd` if present, else defaults.
    pub fn discover(cwd: PathBuf) -> Result<Self, Error> {
        let path = cwd.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::new(cwd));
        }
        let mut config = Self::load(&path)?;
        config.cwd = cwd;
        Ok(config)
    }

    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve `path` against the working directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the default compile target.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    #[must_use]
    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.cwd, dir.path());
        assert_eq!(config.target, Target::C);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn test_discover_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "target": "js", "maxCallDepth": 32 }"#,
        )
        .unwrap();
        let config = Config::discover(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.target, Target::JavaScript);
        assert_eq!(config.max_call_depth, 32);
        assert!(!config.optimize);
        assert_eq!(config.cwd, dir.path());
    }

    #[test]
    fn test_discover_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ target: ").unwrap();
        let err = Config::discover(dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_builders() {
        let config = Config::new(PathBuf::from("/tmp"))
            .with_verbosity(2)
            .with_json_logs(true)
            .with_target(Target::JavaScript)
            .with_optimize(true)
            .with_debug_info(true)
            .with_max_call_depth(8);
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs && config.optimize && config.debug_info);
        assert_eq!(config.target, Target::JavaScript);
        assert_eq!(config.max_call_depth, 8);
    }

    #[test]
    fn test_resolve() {
        let config = Config::new(PathBuf::from("/work"));
        assert_eq!(config.resolve(Path::new("a.hxp")), PathBuf::from("/work/a.hxp"));
        assert_eq!(config.resolve(Path::new("/abs/b.hxp")), PathBuf::from("/abs/b.hxp"));
    }
}
