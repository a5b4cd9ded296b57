use serde::{Deserialize, Serialize};

/// Review policy options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Collapse a resource block when it is marked reviewed
    pub auto_collapse_on_review: bool,

    /// Refuse approval until every resource block is reviewed
    pub require_review_all: bool,

    /// Initial collapsed state of resource blocks
    pub default_collapsed: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            auto_collapse_on_review: true,
            require_review_all: false,
            default_collapsed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ReviewConfig = serde_yaml::from_str("require_review_all: true").unwrap();

        assert!(config.require_review_all);
        assert!(config.auto_collapse_on_review);
        assert!(!config.default_collapsed);
    }
}
