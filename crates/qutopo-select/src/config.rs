//! Selection run configuration.
//!
//! Supports loading from YAML or JSON text or files. Every key except
//! `blocksize` has a default:
//!
//! ```yaml
//! blocksize: 4
//! category: embedded          # lines, stars, rings, kites, thetas, tees,
//!                             # dippers, alls, embedded, trees
//! edge_policy: shortest_path  # nearest_physical, mst_path, mst_density, none
//! propagate_overlap: false
//! grow_blocks: false
//! relabel_costs: true
//! parallel: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SelectError, SelectResult};
use crate::hybrid::EdgePolicy;
use crate::templates::{Category, MAX_BLOCKSIZE};

/// Immutable configuration of one selection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct SelectionConfig {
    /// Qudits per block, 2 through 5.
    pub blocksize: usize,

    /// Template family searched by the matcher.
    pub category: Category,

    /// Logical edge placement policy.
    pub edge_policy: EdgePolicy,

    /// Bias matching with interactions of related neighbouring blocks.
    pub propagate_overlap: bool,

    /// Enlarge undersized qudit groups to `blocksize` before building.
    pub grow_blocks: bool,

    /// Treat used hybrid edges as cheap afterwards when estimating cost.
    pub relabel_costs: bool,

    /// Process blocks on the rayon thread pool.
    pub parallel: bool,
}

#[derive(Deserialize)]
struct RawConfig {
    blocksize: Option<usize>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    edge_policy: Option<String>,
    #[serde(default)]
    propagate_overlap: bool,
    #[serde(default)]
    grow_blocks: bool,
    #[serde(default = "default_true")]
    relabel_costs: bool,
    #[serde(default = "default_true")]
    parallel: bool,
}

fn default_true() -> bool {
    true
}

impl TryFrom<RawConfig> for SelectionConfig {
    type Error = SelectError;

    fn try_from(raw: RawConfig) -> SelectResult<Self> {
        let blocksize = raw
            .blocksize
            .ok_or_else(|| SelectError::MissingConfig("blocksize".into()))?;
        let category = match raw.category.as_deref() {
            None => Category::default(),
            Some(name) => name.parse()?,
        };
        let edge_policy = match raw.edge_policy.as_deref().map(str::trim) {
            None | Some("" | "none") => EdgePolicy::default(),
            Some(name) => name.parse()?,
        };
        Ok(Self {
            blocksize,
            category,
            edge_policy,
            propagate_overlap: raw.propagate_overlap,
            grow_blocks: raw.grow_blocks,
            relabel_costs: raw.relabel_costs,
            parallel: raw.parallel,
        })
    }
}

impl SelectionConfig {
    /// Configuration with defaults for everything but the block size.
    pub fn new(blocksize: usize) -> Self {
        Self {
            blocksize,
            category: Category::default(),
            edge_policy: EdgePolicy::default(),
            propagate_overlap: false,
            grow_blocks: false,
            relabel_costs: true,
            parallel: true,
        }
    }

    /// Parse YAML text.
    pub fn from_yaml_str(text: &str) -> SelectResult<Self> {
        if is_blank(text) {
            return Err(SelectError::MissingConfig("blocksize".into()));
        }
        let raw: RawConfig = serde_yaml_ng::from_str(text)?;
        Self::try_from(raw)
    }

    /// Parse JSON text.
    pub fn from_json_str(text: &str) -> SelectResult<Self> {
        if is_blank(text) {
            return Err(SelectError::MissingConfig("blocksize".into()));
        }
        let raw: RawConfig = serde_json::from_str(text)?;
        Self::try_from(raw)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as
    /// YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SelectResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Check the block size range and that the category has templates at
    /// this block size.
    pub fn validate(&self) -> SelectResult<()> {
        if !(2..=MAX_BLOCKSIZE).contains(&self.blocksize) {
            return Err(SelectError::UnsupportedBlockSize(self.blocksize));
        }
        if !self.category.is_available(self.blocksize) {
            return Err(SelectError::CategoryNotAvailable {
                category: self.category.to_string(),
                blocksize: self.blocksize,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    #[must_use]
    pub fn with_overlap(mut self, propagate_overlap: bool) -> Self {
        self.propagate_overlap = propagate_overlap;
        self
    }

    #[must_use]
    pub fn with_growth(mut self, grow_blocks: bool) -> Self {
        self.grow_blocks = grow_blocks;
        self
    }

    #[must_use]
    pub fn with_relabel(mut self, relabel_costs: bool) -> Self {
        self.relabel_costs = relabel_costs;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

fn is_blank(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "null" || text == "~" || text == "{}"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let config = SelectionConfig::from_yaml_str("blocksize: 4\n").unwrap();
        assert_eq!(config, SelectionConfig::new(4));
        assert_eq!(config.category, Category::Embedded);
        assert_eq!(config.edge_policy, EdgePolicy::ShortestPath);
        assert!(config.relabel_costs);
        assert!(config.parallel);
        assert!(!config.propagate_overlap);
    }

    #[test]
    fn test_yaml_full() {
        let yaml = "
blocksize: 5
category: Trees
edge_policy: mst-density
propagate_overlap: true
grow_blocks: true
relabel_costs: false
parallel: false
";
        let config = SelectionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.blocksize, 5);
        assert_eq!(config.category, Category::Trees);
        assert_eq!(config.edge_policy, EdgePolicy::MstDensity);
        assert!(config.propagate_overlap && config.grow_blocks);
        assert!(!config.relabel_costs && !config.parallel);
    }

    #[test]
    fn test_json_and_none_policy() {
        let config =
            SelectionConfig::from_json_str(r#"{"blocksize": 3, "category": "all", "edge_policy": "none"}"#)
                .unwrap();
        assert_eq!(config.category, Category::Alls);
        assert_eq!(config.edge_policy, EdgePolicy::ShortestPath);
    }

    #[test]
    fn test_missing_blocksize() {
        assert!(matches!(
            SelectionConfig::from_yaml_str(""),
            Err(SelectError::MissingConfig(_))
        ));
        assert!(matches!(
            SelectionConfig::from_json_str("{}"),
            Err(SelectError::MissingConfig(_))
        ));
        assert!(matches!(
            SelectionConfig::from_yaml_str("category: lines\n"),
            Err(SelectError::MissingConfig(key)) if key == "blocksize"
        ));
        assert!(matches!(
            SelectionConfig::from_json_str(r#"{"category": "lines"}"#),
            Err(SelectError::MissingConfig(_))
        ));
    }

    #[test]
    fn test_unknown_names_fail() {
        assert!(matches!(
            SelectionConfig::from_yaml_str("blocksize: 4\ncategory: spirals\n"),
            Err(SelectError::UnknownCategory(name)) if name == "spirals"
        ));
        assert!(matches!(
            SelectionConfig::from_yaml_str("blocksize: 4\nedge_policy: teleport\n"),
            Err(SelectError::InvalidConfig(_))
        ));
        assert!(matches!(
            SelectionConfig::from_json_str(r#"{"blocksize": 4, "category": "spirals"}"#),
            Err(SelectError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_malformed_text_is_parse_error() {
        assert!(matches!(
            SelectionConfig::from_yaml_str("blocksize: [4\n"),
            Err(SelectError::Parse(_))
        ));
        assert!(matches!(
            SelectionConfig::from_json_str(r#"{"blocksize": "four"}"#),
            Err(SelectError::Parse(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(SelectionConfig::new(4).validate().is_ok());
        assert!(matches!(
            SelectionConfig::new(6).validate(),
            Err(SelectError::UnsupportedBlockSize(6))
        ));
        assert!(matches!(
            SelectionConfig::new(1).validate(),
            Err(SelectError::UnsupportedBlockSize(1))
        ));
        assert!(matches!(
            SelectionConfig::new(4).with_category(Category::Tees).validate(),
            Err(SelectError::CategoryNotAvailable { blocksize: 4, .. })
        ));
    }

    #[test]
    fn test_serialized_config_reloads() {
        let config = SelectionConfig::new(5)
            .with_category(Category::Stars)
            .with_edge_policy(EdgePolicy::NearestPhysical)
            .with_overlap(true);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SelectionConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = std::env::temp_dir();
        let yaml = dir.join(format!("qutopo-config-{}.yaml", std::process::id()));
        let json = dir.join(format!("qutopo-config-{}.json", std::process::id()));
        std::fs::write(&yaml, "blocksize: 3\n").unwrap();
        std::fs::write(&json, r#"{"blocksize": 2}"#).unwrap();
        assert_eq!(SelectionConfig::from_file(&yaml).unwrap().blocksize, 3);
        assert_eq!(SelectionConfig::from_file(&json).unwrap().blocksize, 2);
        std::fs::remove_file(yaml).ok();
        std::fs::remove_file(json).ok();
        assert!(matches!(
            SelectionConfig::from_file(dir.join("qutopo-missing-config.yaml")),
            Err(SelectError::Io(_))
        ));
    }
}
