// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::backends::local::TransformKind;
use crate::config::consts::DEFAULT_CHANNEL_CAPACITY;
use crate::errors::ConfigError;
use crate::observability::messages::config::PipelineLoaded;

/// A pipeline definition: a set of units and the pipes between them.
///
/// Exactly one unit must have no upstream; it becomes the root of the tree
/// and receives the pipeline's input.
///
/// # Example
/// ```yaml
/// channel_capacity: 100
/// root_input: empty
/// units:
///   - id: ping
///     type: process
///     command: ping
///     args: ["-c", "3", "localhost"]
///     pipe_to: [upper, lower]
///   - id: upper
///     type: transform
///     transform: upper
///   - id: lower
///     type: transform
///     transform: lower
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Bound on every branch channel; defaults to [`DEFAULT_CHANNEL_CAPACITY`]
    #[serde(default)]
    pub channel_capacity: Option<usize>,
    #[serde(default)]
    pub root_input: RootInput,
    pub units: Vec<UnitConfig>,
}

impl PipelineConfig {
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY)
            .max(1)
    }

    pub fn unit(&self, id: &str) -> Option<&UnitConfig> {
        self.units.iter().find(|unit| unit.id == id)
    }
}

/// Where the root unit's input comes from
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootInput {
    /// An already closed input, for roots that produce data on their own
    #[default]
    Empty,
    /// The process's standard input, line by line
    Stdin,
}

/// One unit of the pipeline.
///
/// Which optional fields are required depends on `type`:
/// - `transform` needs `transform`
/// - `counter` needs `count` (and may set `delay_ms`)
/// - `process` needs `command` (and may set `args`)
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub transform: Option<TransformKind>,
    pub count: Option<u64>,
    pub delay_ms: Option<u64>,
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Downstream unit ids, in the order their edges are created
    #[serde(default)]
    pub pipe_to: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Echo,
    Transform,
    Counter,
    Process,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnitKind::Echo => "echo",
            UnitKind::Transform => "transform",
            UnitKind::Counter => "counter",
            UnitKind::Process => "process",
        };
        f.write_str(name)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;

    tracing::info!(
        "{}",
        PipelineLoaded {
            path: &path.display().to_string(),
            unit_count: cfg.units.len(),
        }
    );
    Ok(cfg)
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_pipeline(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_pipeline(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
units:
  - id: ping
    type: process
    command: ping
    args: ["-c", "3", "localhost"]
    pipe_to: [upper, lower]
  - id: upper
    type: transform
    transform: upper
  - id: lower
    type: transform
    transform: lower
"#;

        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.units.len(), 3);
        assert_eq!(cfg.root_input, RootInput::Empty);
        assert_eq!(cfg.channel_capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(cfg.units[0].kind, UnitKind::Process);
        assert_eq!(cfg.units[0].args, vec!["-c", "3", "localhost"]);
        assert_eq!(cfg.units[0].pipe_to, vec!["upper", "lower"]);
        assert_eq!(cfg.units[1].transform, Some(TransformKind::Upper));
        assert!(cfg.units[2].pipe_to.is_empty());
    }

    #[test]
    fn parse_pipeline_options() {
        let yaml = r#"
channel_capacity: 8
root_input: stdin
units:
  - id: count
    type: counter
    count: 5
    delay_ms: 10
"#;

        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.channel_capacity(), 8);
        assert_eq!(cfg.root_input, RootInput::Stdin);
        assert_eq!(cfg.unit("count").and_then(|unit| unit.delay_ms), Some(10));
        assert!(cfg.unit("missing").is_none());
    }

    #[test]
    fn unknown_unit_type_fails_to_parse() {
        let yaml = r#"
units:
  - id: mystery
    type: teleport
"#;

        assert!(serde_yaml::from_str::<PipelineConfig>(yaml).is_err());
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let file = write_pipeline(
            r#"
units:
  - id: source
    type: counter
    count: 3
    pipe_to: [double]
  - id: double
    type: transform
    transform: double
"#,
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.units.len(), 2);
    }

    #[test]
    fn test_load_and_validate_unresolved_target() {
        let file = write_pipeline(
            r#"
units:
  - id: source
    type: echo
    pipe_to: [nonexistent]
"#,
        );

        let error = load_and_validate_config(file.path()).unwrap_err();
        match &error {
            ConfigError::Invalid(errors) => assert_eq!(
                errors,
                &vec![ValidationError::UnresolvedTarget {
                    unit_id: "source".to_string(),
                    missing_target: "nonexistent".to_string(),
                }]
            ),
            other => panic!("Expected validation failure, got {:?}", other),
        }
        assert!(error
            .to_string()
            .contains("pipes to 'nonexistent' which does not exist"));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = load_config("/definitely/not/here/pipeline.yaml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let file = write_pipeline("units: [unterminated");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
