//! Deployment configuration resolver.
//!
//! Turns raw deployment parameters into a validated [`DeploymentConfig`] in
//! one fail-fast pass. Either every field resolves or nothing is returned.
//! The resolver never reads files or the environment.

use tracing::{debug, warn};

use crate::error::{CiStackError, ConfigError, Result};

use super::catalog::{AgentCatalog, ensure_unique_names};
use super::params::{Parameter, RawParameters};
use super::spec::{
    ACCESS_ALL, AccessPolicy, AgentNodeSpec, AgentSource, AuthType, DeploymentConfig,
    DeploymentType, IPV4_ANY, IPV6_ANY,
};

/// A resolved configuration plus the non-fatal findings made on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The validated configuration.
    pub config: DeploymentConfig,
    /// Conditions worth telling the operator about.
    pub warnings: Vec<String>,
}

/// Resolves raw parameters against an agent catalog.
#[derive(Debug, Clone)]
pub struct DeploymentResolver {
    catalog: AgentCatalog,
}

impl DeploymentResolver {
    /// Creates a resolver that selects agents from `catalog`.
    #[must_use]
    pub const fn new(catalog: AgentCatalog) -> Self {
        Self { catalog }
    }

    /// Validates every parameter and builds the deployment configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure encountered.
    pub fn resolve(&self, params: &RawParameters) -> Result<Resolution> {
        let mut warnings = Vec::new();

        for key in params.context.unknown_keys() {
            warn!("Ignoring unknown context parameter: {key}");
            warnings.push(format!("Unknown context parameter '{key}' was ignored"));
        }

        let use_ssl = validate_ssl_flag(params.get(Parameter::UseSsl).as_deref())?;
        let auth_type = resolve_auth_type(params.get(Parameter::AuthType).as_deref())?;
        let server_access = resolve_access_policy(
            params.get(Parameter::ServerAccessType).as_deref(),
            params.get(Parameter::RestrictServerAccessTo).as_deref(),
        )?;
        let use_prod_agents = parse_flag(
            Parameter::UseProdAgents,
            params.get(Parameter::UseProdAgents).as_deref(),
        )?;
        let deployment_type = resolve_deployment_type(
            params.get(Parameter::JenkinsInstanceType).as_deref(),
            use_prod_agents,
        )?;
        let mac_agent = parse_flag(
            Parameter::MacAgent,
            params.get(Parameter::MacAgent).as_deref(),
        )?;
        let additional_commands = params
            .get(Parameter::AdditionalCommands)
            .map(|v| v.trim().to_string());

        let (agent_nodes, agent_source) = match params.agent_override() {
            Some(nodes) => {
                ensure_unique_names(nodes)?;
                debug!("Using {} explicitly configured agent nodes", nodes.len());
                (nodes.to_vec(), AgentSource::Override)
            }
            None => (
                select_agent_nodes(deployment_type, &self.catalog),
                AgentSource::Catalog,
            ),
        };

        let config = DeploymentConfig {
            use_ssl,
            auth_type,
            server_access,
            deployment_type,
            agent_nodes,
            use_prod_agents,
            mac_agent,
            additional_commands,
            agent_source,
        };

        warnings.extend(collect_warnings(&config));
        for warning in &warnings {
            debug!("Resolution warning: {warning}");
        }

        debug!(
            "Resolved deployment: type={}, auth={}, access={}, ssl={}, agents={}",
            config.deployment_type,
            config.auth_type,
            config.server_access,
            config.use_ssl,
            config.agent_nodes.len()
        );

        Ok(Resolution { config, warnings })
    }
}

/// Resolves the controller ingress restriction.
///
/// `all` with `ipv4` or `ipv6` opens the endpoint to every address of that
/// family. For prefix lists and security groups it is taken literally.
///
/// # Errors
///
/// Returns `InvalidAccessType` for an unset or unrecognized type, then
/// `MissingAccessValue` for an unset or empty value.
pub fn resolve_access_policy(
    access_type: Option<&str>,
    access_value: Option<&str>,
) -> Result<AccessPolicy> {
    let access_type = match access_type {
        Some(t @ ("ipv4" | "ipv6" | "prefixList" | "securityGroupId")) => t,
        other => {
            return Err(CiStackError::Config(ConfigError::InvalidAccessType {
                value: other.map(ToString::to_string),
            }));
        }
    };

    let value = access_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            CiStackError::Config(ConfigError::MissingAccessValue {
                access_type: access_type.to_string(),
            })
        })?;

    let cidr = |any: &str| {
        if value == ACCESS_ALL {
            any.to_string()
        } else {
            value.to_string()
        }
    };

    Ok(match access_type {
        "ipv4" => AccessPolicy::Ipv4(cidr(IPV4_ANY)),
        "ipv6" => AccessPolicy::Ipv6(cidr(IPV6_ANY)),
        "prefixList" => AccessPolicy::PrefixList(value.to_string()),
        _ => AccessPolicy::SecurityGroupId(value.to_string()),
    })
}

/// Resolves the controller authentication mode; unset means `default`.
///
/// # Errors
///
/// Returns `InvalidAuthType` for anything outside `default`, `github`, `oidc`.
pub fn resolve_auth_type(raw: Option<&str>) -> Result<AuthType> {
    raw.map_or(Ok(AuthType::Default), |v| {
        v.parse::<AuthType>().map_err(CiStackError::from)
    })
}

/// Resolves the deployment type.
///
/// When unset, production agents imply `BTR` and everything else gets
/// `default`.
///
/// # Errors
///
/// Returns `InvalidDeploymentType` for an unrecognized value.
pub fn resolve_deployment_type(raw: Option<&str>, use_prod_agents: bool) -> Result<DeploymentType> {
    match raw {
        Some(v) => v.parse::<DeploymentType>().map_err(CiStackError::from),
        None if use_prod_agents => Ok(DeploymentType::Btr),
        None => Ok(DeploymentType::Default),
    }
}

/// Selects the catalog entries belonging to a deployment type's fleet.
///
/// Catalog order is preserved. An empty result is not an error.
#[must_use]
pub fn select_agent_nodes(
    deployment_type: DeploymentType,
    catalog: &AgentCatalog,
) -> Vec<AgentNodeSpec> {
    catalog
        .iter()
        .filter(|node| deployment_type.includes(node.pool))
        .cloned()
        .collect()
}

/// Validates the `useSsl` flag; only the literals `true` and `false` pass.
///
/// # Errors
///
/// Returns `InvalidSslFlag` for anything else, including absence.
pub fn validate_ssl_flag(raw: Option<&str>) -> Result<bool> {
    match raw {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        other => Err(CiStackError::Config(ConfigError::InvalidSslFlag {
            value: other.map(ToString::to_string),
        })),
    }
}

/// Parses an optional boolean flag that defaults to `false`.
fn parse_flag(parameter: Parameter, raw: Option<&str>) -> Result<bool> {
    match raw {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(CiStackError::Config(ConfigError::InvalidFlag {
            parameter: parameter.key().to_string(),
            value: other.to_string(),
        })),
    }
}

fn collect_warnings(config: &DeploymentConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.agent_nodes.is_empty() {
        warnings.push(format!(
            "No agent nodes selected for deployment type '{}'; the controller will have no agents",
            config.deployment_type
        ));
    }

    if config.use_prod_agents {
        warnings.push(String::from(
            "Production agent images are published in us-east-1 only; copy them before deploying to another region",
        ));
    }

    if config.has_mac_agents() && !config.mac_agent {
        warnings.push(String::from(
            "Mac agents are selected but macAgent is false; they cannot launch without dedicated hosts",
        ));
    }

    if config.server_access.is_unrestricted() {
        warnings.push(format!(
            "Controller endpoint is open to every address ({})",
            config.server_access.value()
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::{ContextParams, DeploymentProps};
    use crate::config::spec::{AgentPlatform, AgentPool};

    fn catalog() -> AgentCatalog {
        AgentCatalog::builtin().unwrap()
    }

    fn context(entries: &[&str]) -> RawParameters {
        RawParameters::from_context(ContextParams::parse(entries.iter().copied()).unwrap())
    }

    fn minimal() -> Vec<&'static str> {
        vec![
            "useSsl=false",
            "serverAccessType=ipv4",
            "restrictServerAccessTo=10.0.0.0/16",
        ]
    }

    fn node(name: &str) -> AgentNodeSpec {
        AgentNodeSpec {
            name: name.to_string(),
            pool: AgentPool::Btr,
            platform: AgentPlatform::Unix,
            instance_type: String::from("c5.xlarge"),
            ami_id: String::from("ami-abc"),
            label: name.to_string(),
            remote_user: String::from("ec2-user"),
            remote_fs: String::from("/var/jenkins"),
            num_executors: 2,
            max_total_uses: Some(10),
            min_spare_instances: 0,
        }
    }

    fn config_error(result: Result<impl std::fmt::Debug>) -> ConfigError {
        match result {
            Err(CiStackError::Config(e)) => e,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_access_all_resolves_to_unrestricted() {
        assert_eq!(
            resolve_access_policy(Some("ipv4"), Some("all")).unwrap(),
            AccessPolicy::Ipv4(String::from("0.0.0.0/0"))
        );
        assert_eq!(
            resolve_access_policy(Some("ipv6"), Some("all")).unwrap(),
            AccessPolicy::Ipv6(String::from("::/0"))
        );
    }

    #[test]
    fn test_access_all_is_literal_for_ids() {
        assert_eq!(
            resolve_access_policy(Some("prefixList"), Some("all")).unwrap(),
            AccessPolicy::PrefixList(String::from("all"))
        );
        assert_eq!(
            resolve_access_policy(Some("securityGroupId"), Some("sg-0a1b")).unwrap(),
            AccessPolicy::SecurityGroupId(String::from("sg-0a1b"))
        );
    }

    #[test]
    fn test_access_literal_cidr() {
        assert_eq!(
            resolve_access_policy(Some("ipv4"), Some("192.168.0.0/24")).unwrap(),
            AccessPolicy::Ipv4(String::from("192.168.0.0/24"))
        );
    }

    #[test]
    fn test_invalid_access_type() {
        for bad in ["IPv4", "cidr", "prefixlist", "sg", ""] {
            assert!(matches!(
                config_error(resolve_access_policy(Some(bad), Some("all"))),
                ConfigError::InvalidAccessType { .. }
            ));
        }
        assert!(matches!(
            config_error(resolve_access_policy(None, Some("all"))),
            ConfigError::InvalidAccessType { value: None }
        ));
    }

    #[test]
    fn test_access_type_checked_before_value() {
        assert!(matches!(
            config_error(resolve_access_policy(Some("bogus"), None)),
            ConfigError::InvalidAccessType { .. }
        ));
    }

    #[test]
    fn test_missing_access_value() {
        assert!(matches!(
            config_error(resolve_access_policy(Some("ipv6"), None)),
            ConfigError::MissingAccessValue { ref access_type } if access_type == "ipv6"
        ));
        assert!(matches!(
            config_error(resolve_access_policy(Some("prefixList"), Some(" "))),
            ConfigError::MissingAccessValue { .. }
        ));
    }

    #[test]
    fn test_auth_type() {
        assert_eq!(resolve_auth_type(None).unwrap(), AuthType::Default);
        assert_eq!(resolve_auth_type(Some("oidc")).unwrap(), AuthType::Oidc);
        assert!(matches!(
            config_error(resolve_auth_type(Some("bogus"))),
            ConfigError::InvalidAuthType { .. }
        ));
    }

    #[test]
    fn test_deployment_type_inference() {
        assert_eq!(resolve_deployment_type(None, true).unwrap(), DeploymentType::Btr);
        assert_eq!(
            resolve_deployment_type(None, false).unwrap(),
            DeploymentType::Default
        );
        for prod in [true, false] {
            assert_eq!(
                resolve_deployment_type(Some("gradle"), prod).unwrap(),
                DeploymentType::Gradle
            );
        }
        assert!(matches!(
            config_error(resolve_deployment_type(Some("nightly"), false)),
            ConfigError::InvalidDeploymentType { .. }
        ));
    }

    #[test]
    fn test_btr_selects_non_default_entries() {
        let catalog = catalog();
        let selected = select_agent_nodes(DeploymentType::Btr, &catalog);
        assert_eq!(selected.len(), 15);
        assert!(selected.iter().all(|n| n.pool != AgentPool::Default));
    }

    #[test]
    fn test_gradle_selection_preserves_order() {
        let selected = select_agent_nodes(DeploymentType::Gradle, &catalog());
        let names: Vec<_> = selected.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["UBUNTU2004-X64-GRADLE-CHECK", "WINDOWS2019-X64-GRADLE-CHECK"]
        );
    }

    #[test]
    fn test_default_and_benchmark_selection() {
        let catalog = catalog();
        assert_eq!(select_agent_nodes(DeploymentType::Default, &catalog).len(), 2);
        assert_eq!(select_agent_nodes(DeploymentType::Benchmark, &catalog).len(), 1);
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let catalog = AgentCatalog::new(vec![node("only-btr")]).unwrap();
        assert!(select_agent_nodes(DeploymentType::Gradle, &catalog).is_empty());

        let resolver = DeploymentResolver::new(catalog);
        let mut entries = minimal();
        entries.push("jenkinsInstanceType=gradle");
        let resolution = resolver.resolve(&context(&entries)).unwrap();
        assert!(resolution.config.agent_nodes.is_empty());
        assert!(resolution.warnings.iter().any(|w| w.contains("No agent nodes")));
    }

    #[test]
    fn test_ssl_flag() {
        assert!(validate_ssl_flag(Some("true")).unwrap());
        assert!(!validate_ssl_flag(Some("false")).unwrap());
        for bad in [Some("TRUE"), Some("yes"), Some("1"), None] {
            assert!(matches!(
                config_error(validate_ssl_flag(bad)),
                ConfigError::InvalidSslFlag { .. }
            ));
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let resolver = DeploymentResolver::new(catalog());
        let resolution = resolver.resolve(&context(&minimal())).unwrap();
        let config = resolution.config;

        assert!(!config.use_ssl);
        assert_eq!(config.auth_type, AuthType::Default);
        assert_eq!(config.deployment_type, DeploymentType::Default);
        assert!(!config.use_prod_agents);
        assert!(!config.mac_agent);
        assert_eq!(config.additional_commands, None);
        assert_eq!(config.agent_source, AgentSource::Catalog);
        assert_eq!(
            config.agent_names(),
            vec!["AL2-X64-DEFAULT-AGENT", "AL2-ARM64-DEFAULT-AGENT"]
        );
    }

    #[test]
    fn test_prod_agents_imply_btr() {
        let resolver = DeploymentResolver::new(catalog());
        let mut entries = minimal();
        entries.push("useProdAgents=true");
        entries.push("macAgent=true");
        let resolution = resolver.resolve(&context(&entries)).unwrap();

        assert_eq!(resolution.config.deployment_type, DeploymentType::Btr);
        assert_eq!(resolution.config.agent_nodes.len(), 15);
        assert!(resolution.warnings.iter().any(|w| w.contains("us-east-1")));
        assert!(!resolution.warnings.iter().any(|w| w.contains("macAgent")));
    }

    #[test]
    fn test_mac_agents_without_hosts_warn() {
        let resolver = DeploymentResolver::new(catalog());
        let mut entries = minimal();
        entries.push("jenkinsInstanceType=BTR");
        let resolution = resolver.resolve(&context(&entries)).unwrap();
        assert!(resolution.warnings.iter().any(|w| w.contains("macAgent is false")));
    }

    #[test]
    fn test_override_skips_catalog() {
        let resolver = DeploymentResolver::new(catalog());
        let props = DeploymentProps {
            agent_nodes: Some(vec![node("custom-1"), node("custom-2")]),
            jenkins_instance_type: Some(String::from("gradle")),
            ..DeploymentProps::default()
        };
        let params = RawParameters::new(props, ContextParams::parse(minimal()).unwrap());
        let config = resolver.resolve(&params).unwrap().config;

        assert_eq!(config.agent_source, AgentSource::Override);
        assert_eq!(config.agent_names(), vec!["custom-1", "custom-2"]);
        assert_eq!(config.deployment_type, DeploymentType::Gradle);
    }

    #[test]
    fn test_override_duplicate_names() {
        let resolver = DeploymentResolver::new(catalog());
        let props = DeploymentProps {
            agent_nodes: Some(vec![node("dup"), node("dup")]),
            ..DeploymentProps::default()
        };
        let params = RawParameters::new(props, ContextParams::parse(minimal()).unwrap());
        assert!(matches!(
            config_error(resolver.resolve(&params)),
            ConfigError::DuplicateAgentNode { .. }
        ));
    }

    #[test]
    fn test_fail_fast_on_first_invalid_field() {
        let resolver = DeploymentResolver::new(catalog());
        let params = context(&["useSsl=maybe", "authType=bogus"]);
        assert!(matches!(
            config_error(resolver.resolve(&params)),
            ConfigError::InvalidSslFlag { .. }
        ));
    }

    #[test]
    fn test_invalid_optional_flag() {
        let resolver = DeploymentResolver::new(catalog());
        let mut entries = minimal();
        entries.push("macAgent=yes");
        assert!(matches!(
            config_error(resolver.resolve(&context(&entries))),
            ConfigError::InvalidFlag { ref parameter, .. } if parameter == "macAgent"
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = DeploymentResolver::new(catalog());
        let mut entries = minimal();
        entries.extend(["authType=github", "useSsl=true", "additionalCommands=./extra.py"]);
        let params = context(&entries);

        let first = resolver.resolve(&params).unwrap();
        let second = resolver.resolve(&params).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.config.additional_commands.as_deref(), Some("./extra.py"));
        assert!(first.config.use_ssl);
    }

    #[test]
    fn test_unknown_context_keys_warn() {
        let resolver = DeploymentResolver::new(catalog());
        let mut entries = minimal();
        entries.push("region=eu-west-1");
        let resolution = resolver.resolve(&context(&entries)).unwrap();
        let unknown = resolution
            .warnings
            .iter()
            .filter(|w| w.contains("'region'"))
            .count();
        assert_eq!(unknown, 1);
    }

    #[test]
    fn test_padded_values_rejected() {
        let resolver = DeploymentResolver::new(catalog());
        let params = context(&[
            "useSsl= true ",
            "serverAccessType=ipv4",
            "restrictServerAccessTo=all",
        ]);
        assert!(matches!(
            config_error(resolver.resolve(&params)),
            ConfigError::InvalidSslFlag { value: Some(ref v) } if v == " true "
        ));

        let mut entries = minimal();
        entries.push("authType=github ");
        assert!(matches!(
            config_error(resolver.resolve(&context(&entries))),
            ConfigError::InvalidAuthType { .. }
        ));

        let mut entries = minimal();
        entries.push("macAgent= true");
        assert!(matches!(
            config_error(resolver.resolve(&context(&entries))),
            ConfigError::InvalidFlag { ref parameter, .. } if parameter == "macAgent"
        ));

        let mut entries = minimal();
        entries.push("jenkinsInstanceType=gradle ");
        assert!(matches!(
            config_error(resolver.resolve(&context(&entries))),
            ConfigError::InvalidDeploymentType { .. }
        ));
    }

    #[test]
    fn test_catalog_listing_matches_resolved_agents() {
        let catalog = catalog();
        let resolver = DeploymentResolver::new(catalog.clone());
        for t in ["BTR", "gradle", "benchmark", "default"] {
            let deployment_type = resolve_deployment_type(Some(t), false).unwrap();
            let instance = format!("jenkinsInstanceType={t}");
            let mut entries: Vec<&str> = minimal();
            entries.push(&instance);
            let resolved = resolver.resolve(&context(&entries)).unwrap().config.agent_nodes;
            assert_eq!(select_agent_nodes(deployment_type, &catalog), resolved);
        }
    }

    #[test]
    fn test_unrestricted_access_warns() {
        let resolver = DeploymentResolver::new(catalog());
        let params = context(&[
            "useSsl=true",
            "serverAccessType=ipv4",
            "restrictServerAccessTo=all",
        ]);
        let resolution = resolver.resolve(&params).unwrap();
        assert!(resolution.config.server_access.is_unrestricted());
        assert!(resolution.warnings.iter().any(|w| w.contains("0.0.0.0/0")));
    }
}
