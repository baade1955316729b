//! Configuration fingerprinting.
//!
//! A resolved configuration is hashed field by field so two resolutions of
//! the same parameters can be compared, and plans can be labelled with the
//! configuration they were rendered from.

use sha2::{Digest, Sha256};

use super::spec::{AgentNodeSpec, DeploymentConfig};

/// Hasher for computing configuration fingerprints.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Creates a new configuration hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes a hash of the entire resolved configuration.
    ///
    /// Agent order is significant: it is the provisioning order.
    #[must_use]
    pub fn hash_config(&self, config: &DeploymentConfig) -> String {
        let mut hasher = Sha256::new();

        hasher.update([u8::from(config.use_ssl)]);
        field(&mut hasher, &config.auth_type.to_string());
        field(&mut hasher, config.server_access.access_type());
        field(&mut hasher, config.server_access.value());
        field(&mut hasher, &config.deployment_type.to_string());
        hasher.update([u8::from(config.use_prod_agents), u8::from(config.mac_agent)]);

        match &config.additional_commands {
            Some(path) => {
                hasher.update([1u8]);
                field(&mut hasher, path);
            }
            None => hasher.update([0u8]),
        }

        field(&mut hasher, &config.agent_source.to_string());
        hasher.update((config.agent_nodes.len() as u64).to_be_bytes());
        for node in &config.agent_nodes {
            field(&mut hasher, &self.hash_agent(node));
        }

        hex::encode(hasher.finalize())
    }

    /// Computes a hash for a single agent profile.
    #[must_use]
    pub fn hash_agent(&self, node: &AgentNodeSpec) -> String {
        let mut hasher = Sha256::new();

        field(&mut hasher, &node.name);
        field(&mut hasher, &node.pool.to_string());
        field(&mut hasher, &node.platform.to_string());
        field(&mut hasher, &node.instance_type);
        field(&mut hasher, &node.ami_id);
        field(&mut hasher, &node.label);
        field(&mut hasher, &node.remote_user);
        field(&mut hasher, &node.remote_fs);
        hasher.update(node.num_executors.to_be_bytes());
        match node.max_total_uses {
            Some(uses) => {
                hasher.update([1u8]);
                hasher.update(uses.to_be_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update(node.min_spare_instances.to_be_bytes());

        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

/// Length-prefixed so adjacent fields cannot run together.
fn field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}
