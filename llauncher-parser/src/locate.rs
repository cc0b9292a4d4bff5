use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "LLAMA_CONFIG_PATH";

/// File names probed in the working directory, in priority order.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["config.yaml", "config.yml", "config.toml"];

/// Where a configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    Environment,
    Discovered,
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigSource::Explicit => "command line",
            ConfigSource::Environment => CONFIG_PATH_ENV,
            ConfigSource::Discovered => "working directory",
            ConfigSource::Default => "default",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfigPath {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Resolve the configuration file from the process environment and the
/// current directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> ResolvedConfigPath {
    resolve_config_path_in(explicit, std::env::var_os(CONFIG_PATH_ENV), Path::new("."))
}

/// Resolve the configuration file.
///
/// Priority: explicit path, then the environment value, then the first of
/// [`DEFAULT_CONFIG_FILES`] that exists in `dir`. When nothing matches the
/// first default name is returned so the read error names a real path.
pub fn resolve_config_path_in(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    dir: &Path,
) -> ResolvedConfigPath {
    let resolved = if let Some(path) = explicit {
        ResolvedConfigPath {
            path: path.to_path_buf(),
            source: ConfigSource::Explicit,
        }
    } else if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        ResolvedConfigPath {
            path: PathBuf::from(value),
            source: ConfigSource::Environment,
        }
    } else if let Some(path) = DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        ResolvedConfigPath {
            path,
            source: ConfigSource::Discovered,
        }
    } else {
        ResolvedConfigPath {
            path: dir.join(DEFAULT_CONFIG_FILES[0]),
            source: ConfigSource::Default,
        }
    };

    debug!(
        path = %resolved.path.display(),
        source = %resolved.source,
        "Resolved configuration path"
    );

    resolved
}
