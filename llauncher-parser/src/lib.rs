//! Decoding of llauncher configuration documents and discovery of the
//! configuration file.

mod locate;
mod parser;

pub use locate::{
    resolve_config_path, resolve_config_path_in, ConfigSource, ResolvedConfigPath,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_FILES,
};
pub use parser::{load_config, parse_config, ConfigFormat};
