//! Configuration loading and validation for the Orchael SDK.
//!
//! A processor config is a YAML document with one required key,
//! `processor_class` (a dotted `module.ClassName` path), an optional `env`
//! mapping projected into process environment variables, and — for the
//! packaging tool only — `agent_type` and `runtime_version`. Keys beyond
//! these are carried through opaquely.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use orchael_core::error::ConfigError;

/// Environment variable that overrides the config path for the server.
pub const CONFIG_FILE_ENV: &str = "ORCHAEL_CONFIG_FILE";

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Typed view of a processor config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Dotted path to the processor class, e.g. `orchael_processors.EchoProcessor`
    pub processor_class: String,

    /// Environment section. Applied only when it is a mapping; any other
    /// shape is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<serde_yaml::Value>,

    /// Packaging only: "python" or "nodejs"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,

    /// Packaging only: runtime version. Kept as a YAML scalar so numeric
    /// versions (nodejs `20`) remain loadable. Dotted versions must be
    /// quoted: YAML reads an unquoted `3.10` as the float `3.1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<serde_yaml::Value>,

    /// Everything else in the document, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl ProcessorConfig {
    /// The runtime version rendered as a string, if present and scalar.
    pub fn runtime_version_str(&self) -> Option<String> {
        self.runtime_version.as_ref().and_then(scalar_to_string)
    }
}

/// Load and validate a processor config from a YAML file.
///
/// Distinguishes three failure modes: the file cannot be read
/// (`ConfigError::Read`), the document is not valid YAML
/// (`ConfigError::Parse`), or the document is null / not a mapping / missing
/// a string `processor_class` (`ConfigError::Validation`).
pub fn load_config(path: impl AsRef<Path>) -> Result<ProcessorConfig, ConfigError> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let doc: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if doc.is_null() {
        return Err(ConfigError::Validation(format!(
            "config file {} is empty",
            path.display()
        )));
    }
    if !doc.is_mapping() {
        return Err(ConfigError::Validation(format!(
            "config file {} must be a YAML mapping",
            path.display()
        )));
    }
    match doc.get("processor_class") {
        None => {
            return Err(ConfigError::Validation(format!(
                "config file {} must contain a 'processor_class' field",
                path.display()
            )));
        }
        Some(v) if !v.is_string() => {
            return Err(ConfigError::Validation(
                "'processor_class' must be a string".into(),
            ));
        }
        Some(_) => {}
    }

    serde_yaml::from_value(doc).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Project the config's `env` mapping into process environment variables.
///
/// String, number, and bool values are set under their key, stringified;
/// any other value type is skipped. An absent or non-mapping `env` section
/// is a no-op, never an error. Must run before extension loading so
/// processor constructors can read the variables.
pub fn apply_env(config: &ProcessorConfig) {
    let Some(serde_yaml::Value::Mapping(map)) = &config.env else {
        return;
    };

    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        let Some(rendered) = scalar_to_string(value) else {
            continue;
        };
        tracing::debug!(key, value = %rendered, "Setting environment variable from config");
        // Invariant: env application runs during front-end startup or under
        // the dispatch initialization lock, before the processor spawns
        // threads of its own.
        unsafe { std::env::set_var(key, &rendered) };
    }
}

/// Resolve the config path for the server front end:
/// explicit flag, else `ORCHAEL_CONFIG_FILE`, else `config.yaml`.
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// --- Packaging validation ---

/// Runtime targeted by a packaged agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentType {
    Python,
    NodeJs,
}

impl std::str::FromStr for AgentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(AgentType::Python),
            "nodejs" => Ok(AgentType::NodeJs),
            other => Err(ConfigError::Validation(format!(
                "agent_type must be 'python' or 'nodejs', got '{other}'"
            ))),
        }
    }
}

/// Validate the packaging fields of a config: `agent_type`,
/// `runtime_version` (python >= 3.10, nodejs major >= 20).
pub fn validate_for_build(config: &ProcessorConfig) -> Result<(AgentType, String), ConfigError> {
    let agent_type = config
        .agent_type
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("config must contain an 'agent_type' field".into()))?
        .parse::<AgentType>()?;

    let version = config.runtime_version_str().ok_or_else(|| {
        ConfigError::Validation("config must contain a 'runtime_version' field".into())
    })?;

    let valid = match agent_type {
        AgentType::Python => python_version_ok(&version),
        AgentType::NodeJs => nodejs_version_ok(&version),
    };
    if !valid {
        let requirement = match agent_type {
            AgentType::Python => "3.10 or higher",
            AgentType::NodeJs => "20 or higher",
        };
        return Err(ConfigError::Validation(format!(
            "invalid runtime version '{version}': must be {requirement}"
        )));
    }

    Ok((agent_type, version))
}

/// Python needs at least `major.minor` and version >= 3.10.
fn python_version_ok(version: &str) -> bool {
    let mut parts = version.split('.');
    let (Some(major), Some(minor)) = (parts.next(), parts.next()) else {
        return false;
    };
    let (Ok(major), Ok(minor)) = (major.parse::<u32>(), minor.parse::<u32>()) else {
        return false;
    };
    major > 3 || (major == 3 && minor >= 10)
}

/// Node.js needs a numeric major >= 20.
fn nodejs_version_ok(version: &str) -> bool {
    version
        .split('.')
        .next()
        .and_then(|major| major.parse::<u32>().ok())
        .is_some_and(|major| major >= 20)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn valid_config_loads() {
        let (_dir, path) = write_config(
            "processor_class: orchael_processors.EchoProcessor\nenv:\n  ECHO_PREFIX: 'Echo: '\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.processor_class, "orchael_processors.EchoProcessor");
        assert!(config.env.is_some());
    }

    #[test]
    fn unknown_keys_pass_through() {
        let (_dir, path) =
            write_config("processor_class: a.B\ncustom_setting: 17\nnested:\n  deep: true\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.extra.len(), 2);
        assert_eq!(
            config.extra.get("custom_setting"),
            Some(&serde_yaml::Value::from(17))
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_config("/nonexistent/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let (_dir, path) = write_config("processor_class: [unclosed\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_document_is_validation_error() {
        let (_dir, path) = write_config("");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_processor_class_is_validation_error() {
        let (_dir, path) = write_config("env:\n  K: v\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("processor_class"));
    }

    #[test]
    fn non_mapping_document_is_validation_error() {
        let (_dir, path) = write_config("- just\n- a\n- list\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    fn config_with_env(env_yaml: &str) -> ProcessorConfig {
        let doc = format!("processor_class: a.B\n{env_yaml}");
        serde_yaml::from_str(&doc).unwrap()
    }

    #[test]
    fn apply_env_sets_stringified_scalars() {
        let config = config_with_env(
            "env:\n  ORCHAEL_TEST_STR: hello\n  ORCHAEL_TEST_NUM: 42\n  ORCHAEL_TEST_BOOL: true\n",
        );
        apply_env(&config);
        assert_eq!(std::env::var("ORCHAEL_TEST_STR").unwrap(), "hello");
        assert_eq!(std::env::var("ORCHAEL_TEST_NUM").unwrap(), "42");
        assert_eq!(std::env::var("ORCHAEL_TEST_BOOL").unwrap(), "true");
    }

    #[test]
    fn apply_env_skips_non_scalar_values() {
        let config = config_with_env("env:\n  ORCHAEL_TEST_LIST:\n    - a\n    - b\n");
        apply_env(&config);
        assert!(std::env::var("ORCHAEL_TEST_LIST").is_err());
    }

    #[test]
    fn apply_env_ignores_missing_or_non_mapping_env() {
        apply_env(&config_with_env(""));
        apply_env(&config_with_env("env: not-a-map\n"));
        // No panic, no variable set
        assert!(std::env::var("not-a-map").is_err());
    }

    #[test]
    fn resolve_path_prefers_explicit_flag() {
        let path = resolve_config_path(Some(PathBuf::from("/tmp/custom.yaml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn resolve_path_falls_back_to_default() {
        // Only meaningful when ORCHAEL_CONFIG_FILE is unset in the test env
        if std::env::var(CONFIG_FILE_ENV).is_err() {
            assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_FILE));
        }
    }

    #[test]
    fn python_version_matrix() {
        assert!(python_version_ok("3.10"));
        assert!(python_version_ok("3.12.1"));
        assert!(python_version_ok("4.0"));
        assert!(!python_version_ok("3.9"));
        assert!(!python_version_ok("2.7"));
        assert!(!python_version_ok("3"));
        assert!(!python_version_ok("abc"));
    }

    #[test]
    fn nodejs_version_matrix() {
        assert!(nodejs_version_ok("20"));
        assert!(nodejs_version_ok("22.1.0"));
        assert!(!nodejs_version_ok("18.19"));
        assert!(!nodejs_version_ok("x"));
    }

    #[test]
    fn build_validation_requires_packaging_fields() {
        let config = config_with_env("");
        let err = validate_for_build(&config).unwrap_err();
        assert!(err.to_string().contains("agent_type"));

        let config: ProcessorConfig =
            serde_yaml::from_str("processor_class: a.B\nagent_type: python\n").unwrap();
        let err = validate_for_build(&config).unwrap_err();
        assert!(err.to_string().contains("runtime_version"));
    }

    #[test]
    fn build_validation_accepts_quoted_python_version() {
        let config: ProcessorConfig = serde_yaml::from_str(
            "processor_class: a.B\nagent_type: python\nruntime_version: \"3.10\"\n",
        )
        .unwrap();
        let (agent_type, version) = validate_for_build(&config).unwrap();
        assert_eq!(agent_type, AgentType::Python);
        assert_eq!(version, "3.10");
    }

    #[test]
    fn build_validation_rejects_unquoted_python_version() {
        // YAML reads the unquoted scalar as the float 3.1, which renders as
        // "3.1" and fails the >= 3.10 check
        let config: ProcessorConfig = serde_yaml::from_str(
            "processor_class: a.B\nagent_type: python\nruntime_version: 3.10\n",
        )
        .unwrap();
        let err = validate_for_build(&config).unwrap_err();
        assert!(err.to_string().contains("3.1"));
    }

    #[test]
    fn build_validation_rejects_unknown_agent_type() {
        let config: ProcessorConfig = serde_yaml::from_str(
            "processor_class: a.B\nagent_type: ruby\nruntime_version: \"3.2\"\n",
        )
        .unwrap();
        let err = validate_for_build(&config).unwrap_err();
        assert!(err.to_string().contains("ruby"));
    }
}
