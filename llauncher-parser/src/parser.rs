use llauncher_core::{LauncherError, LlamaConfig, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension. Anything that is not `.toml`
    /// is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Read and decode a configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LlamaConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        LauncherError::ConfigReadError(format!("could not read {}: {}", path.display(), e))
    })?;

    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), format = ?format, "Decoding configuration");

    parse_config(&content, format).map_err(|e| match e {
        LauncherError::ConfigParseError(msg) => {
            LauncherError::ConfigParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Decode a configuration document held in memory.
///
/// Unknown keys are ignored and missing keys keep their zero value.
pub fn parse_config(input: &str, format: ConfigFormat) -> Result<LlamaConfig> {
    match format {
        ConfigFormat::Yaml => parse_yaml(input),
        ConfigFormat::Toml => toml::from_str(input)
            .map_err(|e| LauncherError::ConfigParseError(format!("invalid toml: {}", e))),
    }
}

fn parse_yaml(input: &str) -> Result<LlamaConfig> {
    // An empty YAML stream has no document to deserialize a struct from.
    if is_blank_yaml(input) {
        return Ok(LlamaConfig::default());
    }

    let invalid =
        |e: serde_yaml::Error| LauncherError::ConfigParseError(format!("invalid yaml: {}", e));

    // A document holding only `~` or `null` means "no options".
    let document: serde_yaml::Value = serde_yaml::from_str(input).map_err(invalid)?;
    if document.is_null() {
        return Ok(LlamaConfig::default());
    }

    serde_yaml::from_str(input).map_err(invalid)
}

fn is_blank_yaml(input: &str) -> bool {
    input.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml(input: &str) -> Result<LlamaConfig> {
        parse_config(input, ConfigFormat::Yaml)
    }

    fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("llauncher-test-")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_basic_yaml() {
        let input = r#"
model: /path/to/model.gguf
host: 0.0.0.0
port: 8080
threads: 4
n-gpu-layers: 0
lora:
  - adapter1.bin
  - adapter2.bin
verbose: true
n-ctx: 2048
"#;
        let config = yaml(input).unwrap();
        assert_eq!(config.model_path, "/path/to/model.gguf");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.threads, 4);
        assert_eq!(config.gpu_layers, 0);
        assert_eq!(config.lora_adapters, vec!["adapter1.bin", "adapter2.bin"]);
        assert!(config.verbose);
        assert_eq!(config.context_size, 2048);
    }

    #[test]
    fn test_parse_empty_yaml() {
        assert_eq!(yaml("").unwrap(), LlamaConfig::default());
        assert_eq!(yaml("# only a comment\n\n").unwrap(), LlamaConfig::default());
    }

    #[test]
    fn test_parse_null_document() {
        assert_eq!(yaml("~\n").unwrap(), LlamaConfig::default());
        assert_eq!(yaml("# nothing set\nnull\n").unwrap(), LlamaConfig::default());
    }

    #[test]
    fn test_parse_empty_values() {
        let config = yaml("model:\nlora:\nport: 8080\n").unwrap();
        assert_eq!(config.model_path, "");
        assert!(config.lora_adapters.is_empty());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_non_mapping_document_is_rejected() {
        assert!(yaml("- model\n- port\n").is_err());
    }

    #[test]
    fn test_parse_yaml_with_comments() {
        let input = r#"
# This is a comment
model: /path/to/model.gguf  # inline comment
host: 0.0.0.0
"#;
        let config = yaml(input).unwrap();
        assert_eq!(config.model_path, "/path/to/model.gguf");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let input = r#"
model: /path/to/model.gguf
advanced:
  option1: value1
  option2: value2
log-verbose: true
lora:
  - adapter1.bin
"#;
        let config = yaml(input).unwrap();
        assert_eq!(config.model_path, "/path/to/model.gguf");
        assert_eq!(config.lora_adapters, vec!["adapter1.bin"]);
        assert!(!config.verbose);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let err = yaml("model: /m.gguf\nthreads: \"four\"\n").unwrap_err();
        assert!(matches!(err, LauncherError::ConfigParseError(_)));

        assert!(yaml("port: not-a-number\n").is_err());
    }

    #[test]
    fn test_yes_is_not_a_boolean() {
        assert!(yaml("mlock: yes\n").is_err());
    }

    #[test]
    fn test_invalid_indentation_is_rejected() {
        let input = r#"
model: /path/to/model.gguf
lora:
- adapter1.bin
    - invalid: structure
      that: will fail
"#;
        assert!(yaml(input).is_err());
    }

    #[test]
    fn test_parse_floats() {
        let input = "temp: 0.8\ntop-p: 0.9\nrope-scale: 1.5\nmin-p: 1\n";
        let config = yaml(input).unwrap();
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.top_p, 0.9);
        assert_eq!(config.rope_scale, 1.5);
        assert_eq!(config.min_p, 1.0);
    }

    #[test]
    fn test_parse_quoted_special_characters() {
        let input = r#"
model: "/path/with \"quotes\"/model.gguf"
host: "server-name:with:colons"
path: "/path/with/special/chars/!@#$%^&*()"
"#;
        let config = yaml(input).unwrap();
        assert_eq!(config.model_path, r#"/path/with "quotes"/model.gguf"#);
        assert_eq!(config.host, "server-name:with:colons");
        assert_eq!(config.path, "/path/with/special/chars/!@#$%^&*()");
    }

    #[test]
    fn test_flag_spelling_aliases() {
        let config = yaml("ctx-size: 4096\npredict: 128\ngpu-layers-draft: 12\n").unwrap();
        assert_eq!(config.context_size, 4096);
        assert_eq!(config.predict, 128);
        assert_eq!(config.gpu_layers_draft, 12);
    }

    #[test]
    fn test_field_mapping() {
        let input = r#"
model-url: https://example.com/model.gguf
api-prefix: /api
no-webui: true
timeout: 600
threads-http: 8
threads-batch: 8
batch-size: 512
device: cpu
numa: none
mlock: true
cache-type-k: f16
cache-type-v: f16
cache-reuse: 10
seed: 42
top-k: 40
cont-batching: true
metrics: true
slots: true
slot-save-path: ./slots
"#;
        let config = yaml(input).unwrap();
        assert_eq!(config.model_url, "https://example.com/model.gguf");
        assert_eq!(config.api_prefix, "/api");
        assert!(config.no_webui);
        assert_eq!(config.timeout, 600);
        assert_eq!(config.threads_http, 8);
        assert_eq!(config.threads_batch, 8);
        assert_eq!(config.batch_size, 512);
        assert_eq!(config.device, "cpu");
        assert_eq!(config.numa, "none");
        assert!(config.mlock);
        assert_eq!(config.cache_type_k, "f16");
        assert_eq!(config.cache_type_v, "f16");
        assert_eq!(config.cache_reuse, 10);
        assert_eq!(config.seed, 42);
        assert_eq!(config.top_k, 40);
        assert!(config.cont_batching);
        assert!(config.metrics);
        assert!(config.slots);
        assert_eq!(config.slot_save_path, "./slots");
    }

    #[test]
    fn test_parse_toml() {
        let input = r#"
model = "/m.gguf"
port = 8080
temp = 0.7
lora = ["a.bin", "b.bin"]
jinja = true
"#;
        let config = parse_config(input, ConfigFormat::Toml).unwrap();
        assert_eq!(config.model_path, "/m.gguf");
        assert_eq!(config.port, 8080);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.lora_adapters, vec!["a.bin", "b.bin"]);
        assert!(config.jinja);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/config.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_load_config_from_file() {
        let file = write_temp("model: /tmp/dummy.gguf\nport: 9000\n", ".yaml");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.model_path, "/tmp/dummy.gguf");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_temp("model = \"/tmp/dummy.gguf\"\n", ".toml");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.model_path, "/tmp/dummy.gguf");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, LauncherError::ConfigReadError(_)));
    }

    #[test]
    fn test_load_invalid_file() {
        let file = write_temp("port: not-a-number\n", ".yaml");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, LauncherError::ConfigParseError(_)));
    }
}
