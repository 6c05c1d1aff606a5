use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use toml;

/// Source/target buckets and the output version tag for one catalog build.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct BuildConfig {
    pub source_bucket: String,
    pub target_bucket: String,
    pub stac_version: String,
}

impl BuildConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    #[allow(dead_code)]
    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn from_template(table: &toml::Table) -> Self {
        let config: Self = toml::from_str(&table.to_string()).expect("Error serializing template");
        config
    }

    /// Absolute URL prefix for assets still hosted in the source bucket.
    pub fn source_prefix(self: &Self, key_prefix: &str) -> String {
        format!(
            "https://{}.s3.amazonaws.com/{}",
            self.source_bucket, key_prefix
        )
    }

    /// Absolute URL prefix of the published catalog, version segment included.
    pub fn root_prefix(self: &Self) -> String {
        format!(
            "https://{}.s3.amazonaws.com/{}/",
            self.target_bucket, self.stac_version
        )
    }

    pub fn root_href(self: &Self) -> String {
        format!("{}catalog.json", self.root_prefix())
    }
}
