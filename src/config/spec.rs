//! Resolved deployment configuration types.
//!
//! These types describe a fully validated deployment. Raw parameters are
//! parsed into them once, at the boundary, and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// CIDR that opens the controller endpoint to every IPv4 address.
pub const IPV4_ANY: &str = "0.0.0.0/0";

/// CIDR that opens the controller endpoint to every IPv6 address.
pub const IPV6_ANY: &str = "::/0";

/// Access value that means "every address" for the ip families.
pub const ACCESS_ALL: &str = "all";

/// The resolved configuration for one deployment run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Whether the controller endpoint terminates TLS.
    pub use_ssl: bool,
    /// Authentication mode for the Jenkins controller.
    pub auth_type: AuthType,
    /// Network ingress restriction for the controller endpoint.
    pub server_access: AccessPolicy,
    /// Which agent fleet this deployment provisions.
    pub deployment_type: DeploymentType,
    /// Agent profiles to provision, in catalog order.
    pub agent_nodes: Vec<AgentNodeSpec>,
    /// Whether production-grade agent images are used.
    pub use_prod_agents: bool,
    /// Whether mac dedicated hosts are provisioned for mac agents.
    pub mac_agent: bool,
    /// Path to extra commands run on the controller at boot.
    pub additional_commands: Option<String>,
    /// Where the agent selection came from.
    pub agent_source: AgentSource,
}

/// Authentication modes supported by the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Jenkins' own user database.
    #[default]
    Default,
    /// GitHub OAuth.
    Github,
    /// OpenID Connect.
    Oidc,
}

/// Agent fleet categories a deployment can provision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DeploymentType {
    /// Build, test and release: every production agent profile.
    #[serde(rename = "BTR")]
    Btr,
    /// Gradle check runners.
    #[serde(rename = "gradle")]
    Gradle,
    /// Benchmark runners.
    #[serde(rename = "benchmark")]
    Benchmark,
    /// The minimal default agents.
    #[default]
    #[serde(rename = "default")]
    Default,
}

/// Explicit category tag carried by every catalog entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentPool {
    /// Production build, test and release agents.
    Btr,
    /// Gradle check agents.
    Gradle,
    /// Benchmark agents.
    Benchmark,
    /// Minimal default agents.
    Default,
}

/// Operating system family of an agent profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentPlatform {
    /// Linux agents.
    Unix,
    /// Windows agents.
    Windows,
    /// macOS agents; these need dedicated hosts.
    Mac,
}

/// Network ingress restriction for the controller endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AccessPolicy {
    /// An IPv4 CIDR block.
    Ipv4(String),
    /// An IPv6 CIDR block.
    Ipv6(String),
    /// A managed prefix list id.
    PrefixList(String),
    /// A security group id.
    SecurityGroupId(String),
}

/// Where the resolved agent selection came from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentSource {
    /// Selected from the agent catalog by deployment type.
    #[default]
    Catalog,
    /// Supplied explicitly through the `agentNodes` property.
    Override,
}

/// A named build-agent profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentNodeSpec {
    /// Unique profile name.
    pub name: String,
    /// Category used for fleet selection.
    pub pool: AgentPool,
    /// Operating system family.
    pub platform: AgentPlatform,
    /// Machine family and size.
    pub instance_type: String,
    /// Machine image reference.
    pub ami_id: String,
    /// Jenkins label jobs use to target this profile.
    pub label: String,
    /// Login user on the agent.
    pub remote_user: String,
    /// Jenkins workspace root on the agent.
    pub remote_fs: String,
    /// Executors per agent.
    #[serde(default = "default_num_executors")]
    pub num_executors: u32,
    /// Builds before an agent is recycled; unlimited when absent.
    #[serde(default)]
    pub max_total_uses: Option<u32>,
    /// Idle agents kept warm.
    #[serde(default)]
    pub min_spare_instances: u32,
}

const fn default_num_executors() -> u32 {
    1
}

impl FromStr for AuthType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "github" => Ok(Self::Github),
            "oidc" => Ok(Self::Oidc),
            other => Err(ConfigError::InvalidAuthType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Github => "github",
            Self::Oidc => "oidc",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DeploymentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BTR" => Ok(Self::Btr),
            "gradle" => Ok(Self::Gradle),
            "benchmark" => Ok(Self::Benchmark),
            "default" => Ok(Self::Default),
            other => Err(ConfigError::InvalidDeploymentType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Btr => "BTR",
            Self::Gradle => "gradle",
            Self::Benchmark => "benchmark",
            Self::Default => "default",
        };
        write!(f, "{s}")
    }
}

impl DeploymentType {
    /// Returns true if an agent in `pool` belongs to this fleet.
    ///
    /// `BTR` takes every production profile, which is everything outside the
    /// `default` pool. The other types take exactly their own pool.
    #[must_use]
    pub const fn includes(self, pool: AgentPool) -> bool {
        match self {
            Self::Btr => !matches!(pool, AgentPool::Default),
            Self::Gradle => matches!(pool, AgentPool::Gradle),
            Self::Benchmark => matches!(pool, AgentPool::Benchmark),
            Self::Default => matches!(pool, AgentPool::Default),
        }
    }
}

impl fmt::Display for AgentPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Btr => "btr",
            Self::Gradle => "gradle",
            Self::Benchmark => "benchmark",
            Self::Default => "default",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for AgentPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unix => "unix",
            Self::Windows => "windows",
            Self::Mac => "mac",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for AgentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Catalog => "catalog",
            Self::Override => "override",
        };
        write!(f, "{s}")
    }
}

impl AccessPolicy {
    /// Returns the access-type tag as operators spell it.
    #[must_use]
    pub const fn access_type(&self) -> &'static str {
        match self {
            Self::Ipv4(_) => "ipv4",
            Self::Ipv6(_) => "ipv6",
            Self::PrefixList(_) => "prefixList",
            Self::SecurityGroupId(_) => "securityGroupId",
        }
    }

    /// Returns the literal value the ingress rule is scoped to.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Ipv4(v) | Self::Ipv6(v) | Self::PrefixList(v) | Self::SecurityGroupId(v) => v,
        }
    }

    /// Returns true if the policy admits every address of its family.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Self::Ipv4(cidr) => cidr == IPV4_ANY,
            Self::Ipv6(cidr) => cidr == IPV6_ANY,
            Self::PrefixList(_) | Self::SecurityGroupId(_) => false,
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.access_type(), self.value())
    }
}

impl DeploymentConfig {
    /// Returns the names of the selected agent profiles.
    #[must_use]
    pub fn agent_names(&self) -> Vec<&str> {
        self.agent_nodes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Returns true if any selected agent runs on macOS.
    #[must_use]
    pub fn has_mac_agents(&self) -> bool {
        self.agent_nodes
            .iter()
            .any(|a| a.platform == AgentPlatform::Mac)
    }

    /// Returns the port the controller endpoint listens on.
    #[must_use]
    pub const fn listener_port(&self) -> u16 {
        if self.use_ssl { 443 } else { 80 }
    }
}
