//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "public"       # md/ (intermediate) and html/ (pages) are created below it
//! clean = false           # Remove the output directory first
//! inclusion_depth = 8     # Nested ![[embed]] limit
//! graph = true            # Write html/graph.json
//! tag_index = true        # Write html/tags/index.html
//!
//! [build.slug]
//! path = "safe"           # Page path slugification: full | safe | ascii | no
//! fragment = "full"       # Heading anchor slugification
//! ```

mod slug;

pub use slug::{SlugConfig, SlugMode};

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Output root.
    pub output: PathBuf,

    /// Clean the output directory before building.
    pub clean: bool,

    /// Slugification settings.
    pub slug: SlugConfig,

    /// Maximum nesting of inclusions inside inclusions.
    pub inclusion_depth: usize,

    /// Emit `graph.json`.
    pub graph: bool,

    /// Emit the tag index page.
    pub tag_index: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "output".into(),
            clean: false,
            slug: SlugConfig::default(),
            inclusion_depth: 8,
            graph: true,
            tag_index: true,
        }
    }
}

impl BuildSectionConfig {
    pub const INCLUSION_DEPTH: FieldPath = FieldPath::new("build.inclusion_depth");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.inclusion_depth == 0 {
            diag.warn(
                Self::INCLUSION_DEPTH,
                "inclusion_depth = 0 disables every ![[embed]] of a note",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, PathBuf::from("output"));
        assert_eq!(config.build.inclusion_depth, 8);
        assert!(config.build.graph);
        assert!(config.build.tag_index);
        assert!(!config.build.clean);
    }

    #[test]
    fn test_parse_build_section() {
        let config = test_parse_config(
            "[build]\noutput = \"public\"\ngraph = false\ninclusion_depth = 2",
        );
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(!config.build.graph);
        assert_eq!(config.build.inclusion_depth, 2);
    }
}
