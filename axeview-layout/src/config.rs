use serde::{Deserialize, Serialize};

use crate::{descriptor::DescriptorOptions, dtype::DType};

/// Layout settings read from a configuration file. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Check axis lengths against allocated shapes.
    pub verify: bool,
    /// Give missing axes stride 0 in `reaxe` instead of failing.
    pub broadcast: bool,
    pub dtype: DType,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            verify: true,
            broadcast: true,
            dtype: DType::Float32,
        }
    }
}

impl From<&LayoutConfig> for DescriptorOptions {
    fn from(config: &LayoutConfig) -> Self {
        DescriptorOptions::new().verify(config.verify)
    }
}
