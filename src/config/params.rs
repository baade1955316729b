//! Raw deployment parameters and their precedence.
//!
//! Parameters arrive from two places: typed properties (a YAML file) and
//! untyped `key=value` context strings given on the command line. A typed
//! property wins when both are present; otherwise the context value is used;
//! otherwise the resolver applies the documented default. Blank strings are
//! treated as absent in both sources.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CiStackError, ConfigError, Result};

use super::spec::AgentNodeSpec;

/// Names of the recognized deployment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// `useSsl`
    UseSsl,
    /// `authType`
    AuthType,
    /// `serverAccessType`
    ServerAccessType,
    /// `restrictServerAccessTo`
    RestrictServerAccessTo,
    /// `useProdAgents`
    UseProdAgents,
    /// `jenkinsInstanceType`
    JenkinsInstanceType,
    /// `additionalCommands`
    AdditionalCommands,
    /// `macAgent`
    MacAgent,
}

impl Parameter {
    /// Every recognized parameter, in resolution order.
    pub const ALL: [Self; 8] = [
        Self::UseSsl,
        Self::AuthType,
        Self::ServerAccessType,
        Self::RestrictServerAccessTo,
        Self::UseProdAgents,
        Self::JenkinsInstanceType,
        Self::MacAgent,
        Self::AdditionalCommands,
    ];

    /// Returns the key operators use for this parameter.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::UseSsl => "useSsl",
            Self::AuthType => "authType",
            Self::ServerAccessType => "serverAccessType",
            Self::RestrictServerAccessTo => "restrictServerAccessTo",
            Self::UseProdAgents => "useProdAgents",
            Self::JenkinsInstanceType => "jenkinsInstanceType",
            Self::AdditionalCommands => "additionalCommands",
            Self::MacAgent => "macAgent",
        }
    }

    /// Looks up a parameter by its key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed deployment properties, usually loaded from a YAML file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeploymentProps {
    /// Terminate TLS on the controller endpoint.
    #[serde(default)]
    pub use_ssl: Option<bool>,
    /// Controller authentication mode.
    #[serde(default)]
    pub auth_type: Option<String>,
    /// Kind of ingress restriction.
    #[serde(default)]
    pub server_access_type: Option<String>,
    /// Value the ingress restriction is scoped to.
    #[serde(default)]
    pub restrict_server_access_to: Option<String>,
    /// Use production agent images.
    #[serde(default)]
    pub use_prod_agents: Option<bool>,
    /// Agent fleet to provision.
    #[serde(default)]
    pub jenkins_instance_type: Option<String>,
    /// Path to extra controller boot commands.
    #[serde(default)]
    pub additional_commands: Option<String>,
    /// Provision mac dedicated hosts.
    #[serde(default)]
    pub mac_agent: Option<bool>,
    /// Explicit agent profiles; replaces catalog selection when set.
    #[serde(default)]
    pub agent_nodes: Option<Vec<AgentNodeSpec>>,
}

impl DeploymentProps {
    /// Returns the typed value for a parameter, rendered as a string.
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<Cow<'_, str>> {
        match parameter {
            Parameter::UseSsl => flag(self.use_ssl),
            Parameter::AuthType => text(self.auth_type.as_deref()),
            Parameter::ServerAccessType => text(self.server_access_type.as_deref()),
            Parameter::RestrictServerAccessTo => text(self.restrict_server_access_to.as_deref()),
            Parameter::UseProdAgents => flag(self.use_prod_agents),
            Parameter::JenkinsInstanceType => text(self.jenkins_instance_type.as_deref()),
            Parameter::AdditionalCommands => text(self.additional_commands.as_deref()),
            Parameter::MacAgent => flag(self.mac_agent),
        }
    }
}

fn flag(value: Option<bool>) -> Option<Cow<'static, str>> {
    value.map(|b| Cow::Borrowed(if b { "true" } else { "false" }))
}

fn text(value: Option<&str>) -> Option<Cow<'_, str>> {
    value.map(Cow::Borrowed)
}

/// Untyped `key=value` context parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextParams {
    values: BTreeMap<String, String>,
}

impl ContextParams {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Parses `key=value` entries. Later entries override earlier ones.
    ///
    /// Keys are trimmed; values are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry has no `=` or an empty key.
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let Some((key, value)) = entry.split_once('=') else {
                return Err(invalid_context(entry));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(invalid_context(entry));
            }
            context.insert(key, value);
        }
        Ok(context)
    }

    /// Sets a context value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the value for a parameter.
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<&str> {
        self.values.get(parameter.key()).map(String::as_str)
    }

    /// Returns keys that do not name a recognized parameter.
    #[must_use]
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.values
            .keys()
            .filter(|k| Parameter::from_key(k).is_none())
            .map(String::as_str)
            .collect()
    }
}

fn invalid_context(entry: &str) -> CiStackError {
    CiStackError::Config(ConfigError::InvalidContext {
        entry: entry.to_string(),
    })
}

/// Both parameter sources, merged under a single precedence rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParameters {
    /// Typed properties.
    pub props: DeploymentProps,
    /// Untyped context strings.
    pub context: ContextParams,
}

impl RawParameters {
    /// Creates raw parameters from both sources.
    #[must_use]
    pub const fn new(props: DeploymentProps, context: ContextParams) -> Self {
        Self { props, context }
    }

    /// Creates raw parameters from context strings only.
    #[must_use]
    pub fn from_context(context: ContextParams) -> Self {
        Self {
            props: DeploymentProps::default(),
            context,
        }
    }

    /// Returns the effective value of a parameter.
    ///
    /// The typed property wins; the context value is the fallback. Blank
    /// values count as absent.
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<Cow<'_, str>> {
        self.props
            .get(parameter)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                self.context
                    .get(parameter)
                    .filter(|v| !v.trim().is_empty())
                    .map(Cow::Borrowed)
            })
    }

    /// Returns the explicit agent override list, if any.
    #[must_use]
    pub fn agent_override(&self) -> Option<&[AgentNodeSpec]> {
        self.props.agent_nodes.as_deref()
    }
}
