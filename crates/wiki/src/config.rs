use quire_core::{DocumentPipeline, PipelineOptions};
use serde::{Deserialize, Serialize};

use crate::error::WikiError;

/// Wiki configuration.
///
/// ```yaml
/// pipeline:
///   allowRawHtml: false
///   highlightClass: codehilite
///   linkBase: /wiki
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiConfig {
    /// Options for the document pipeline.
    #[serde(default)]
    pub pipeline: PipelineOptions,
}

impl WikiConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, WikiError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, WikiError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the pipeline described by this configuration.
    pub fn build_pipeline(&self) -> DocumentPipeline {
        DocumentPipeline::new(&self.pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_some_fields() {
        let config = WikiConfig::from_yaml_str("pipeline:\n  linkBase: /wiki\n").unwrap();
        assert_eq!(config.pipeline.link_base, "/wiki");
        assert_eq!(config.pipeline.highlight_class, "codehilite");
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(WikiConfig::from_yaml_str("").unwrap(), WikiConfig::default());
    }

    #[test]
    fn json_config() {
        let config =
            WikiConfig::from_json_str(r#"{"pipeline": {"allowRawHtml": true}}"#).unwrap();
        assert!(config.pipeline.allow_raw_html);
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let err = WikiConfig::from_yaml_str("pipeline: [unterminated").unwrap_err();
        assert!(matches!(err, WikiError::Config(_)));
    }

    #[test]
    fn pipeline_uses_link_base() {
        let config = WikiConfig::from_yaml_str("pipeline:\n  linkBase: /w\n").unwrap();
        let processed = config.build_pipeline().process("\n\n[[Home]]").unwrap();
        assert!(processed.rendered.contains("href=\"/w/home/\""));
    }
}
