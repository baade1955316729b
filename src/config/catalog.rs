//! Static catalog of build-agent profiles.
//!
//! The built-in catalog is compiled into the binary from
//! `catalog/agents.yaml`. Operators can replace it with their own file.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CiStackError, ConfigError, Result};

use super::spec::AgentNodeSpec;

const BUILTIN_CATALOG: &str = include_str!("../../catalog/agents.yaml");

/// Ordered catalog of agent profiles with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentCatalog {
    entries: Vec<AgentNodeSpec>,
}

impl AgentCatalog {
    /// Builds a catalog from entries, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns an error if two entries share a name.
    pub fn new(entries: Vec<AgentNodeSpec>) -> Result<Self> {
        ensure_unique_names(&entries)?;
        Ok(Self { entries })
    }

    /// Loads the catalog shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded table is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG, Some("built-in catalog"))
    }

    /// Parses a catalog from a YAML sequence of agent profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or names repeat.
    pub fn from_yaml(content: &str, source: Option<&str>) -> Result<Self> {
        let entries: Vec<AgentNodeSpec> = serde_yaml::from_str(content).map_err(|e| {
            CiStackError::Config(ConfigError::parse(
                format!("YAML parse error: {e}"),
                source.map(ToString::to_string),
            ))
        })?;
        debug!("Parsed {} agent profiles", entries.len());
        Self::new(entries)
    }

    /// Loads a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or invalid.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading agent catalog from: {}", path.display());

        if !path.exists() {
            return Err(CiStackError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content, Some(&path.display().to_string()))
    }

    /// Looks up a profile by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AgentNodeSpec> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Iterates over profiles in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentNodeSpec> {
        self.entries.iter()
    }

    /// Returns the number of profiles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no profiles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fails on the first name that appears twice.
pub(crate) fn ensure_unique_names(entries: &[AgentNodeSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(CiStackError::Config(ConfigError::DuplicateAgentNode {
                name: entry.name.clone(),
            }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::spec::{AgentPlatform, AgentPool};
    use std::io::Write;

    fn entry(name: &str, pool: AgentPool) -> AgentNodeSpec {
        AgentNodeSpec {
            name: name.to_string(),
            pool,
            platform: AgentPlatform::Unix,
            instance_type: String::from("c5.large"),
            ami_id: String::from("ami-123"),
            label: format!("label-{name}"),
            remote_user: String::from("ec2-user"),
            remote_fs: String::from("/var/jenkins"),
            num_executors: 1,
            max_total_uses: None,
            min_spare_instances: 0,
        }
    }

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = AgentCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 17);

        let defaults = catalog.iter().filter(|e| e.pool == AgentPool::Default).count();
        assert_eq!(defaults, 2);

        let mac = catalog.get("MACOS13-ARM64-MULTI-HOST").unwrap();
        assert_eq!(mac.platform, AgentPlatform::Mac);
    }

    #[test]
    fn test_builtin_catalog_labels_unique() {
        let catalog = AgentCatalog::builtin().unwrap();
        let labels: HashSet<_> = catalog.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels.len(), catalog.len());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = AgentCatalog::new(vec![
            entry("a", AgentPool::Btr),
            entry("b", AgentPool::Gradle),
            entry("a", AgentPool::Default),
        ]);
        assert!(matches!(
            result,
            Err(CiStackError::Config(ConfigError::DuplicateAgentNode { ref name })) if name == "a"
        ));
    }

    #[test]
    fn test_yaml_defaults_applied() {
        let yaml = r"
- name: tiny
  pool: default
  platform: unix
  instanceType: t3.micro
  amiId: ami-1
  label: tiny
  remoteUser: ec2-user
  remoteFs: /var/jenkins
";
        let catalog = AgentCatalog::from_yaml(yaml, None).unwrap();
        let tiny = catalog.get("tiny").unwrap();
        assert_eq!(tiny.num_executors, 1);
        assert_eq!(tiny.max_total_uses, None);
        assert_eq!(tiny.min_spare_instances, 0);
    }

    #[test]
    fn test_unknown_pool_is_parse_error() {
        let yaml = r"
- name: odd
  pool: nightly
  platform: unix
  instanceType: t3.micro
  amiId: ami-1
  label: odd
  remoteUser: ec2-user
  remoteFs: /var/jenkins
";
        assert!(matches!(
            AgentCatalog::from_yaml(yaml, Some("custom.yaml")),
            Err(CiStackError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        let catalog = AgentCatalog::load_file(file.path()).unwrap();
        assert!(catalog.is_empty());

        assert!(matches!(
            AgentCatalog::load_file("/nonexistent/agents.yaml"),
            Err(CiStackError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_order_preserved() {
        let catalog = AgentCatalog::new(vec![
            entry("z", AgentPool::Btr),
            entry("a", AgentPool::Btr),
        ])
        .unwrap();
        let names: Vec<_> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
