use serde::{Deserialize, Serialize};

/// Options for the document pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    /// Whether raw HTML in page bodies passes through unescaped.
    #[serde(default)]
    pub allow_raw_html: bool,
    /// Class of the `<div>` wrapped around code blocks.
    #[serde(default = "default_highlight_class")]
    pub highlight_class: String,
    /// Route prefix for cross-reference links.
    #[serde(default = "default_link_base")]
    pub link_base: String,
}

fn default_highlight_class() -> String {
    "codehilite".to_string()
}

fn default_link_base() -> String {
    "/".to_string()
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: false,
            highlight_class: default_highlight_class(),
            link_base: default_link_base(),
        }
    }
}
