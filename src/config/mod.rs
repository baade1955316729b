//! Configuration module for the CI stack.
//!
//! This module handles everything between raw operator input and a
//! validated deployment:
//! - Loading typed properties and `key=value` context parameters
//! - The static agent catalog
//! - Resolving parameters into a [`DeploymentConfig`]
//! - Fingerprinting resolved configurations

mod catalog;
mod hash;
mod params;
mod parser;
mod resolver;
mod spec;

pub use catalog::AgentCatalog;
pub use hash::ConfigHasher;
pub use params::{ContextParams, DeploymentProps, Parameter, RawParameters};
pub use parser::{
    DEFAULT_PARAMS_FILES, ENV_TEMPLATE, PARAMS_TEMPLATE, ParamsParser, find_params_file,
};
pub use resolver::{
    DeploymentResolver, Resolution, resolve_access_policy, resolve_auth_type,
    resolve_deployment_type, select_agent_nodes, validate_ssl_flag,
};
pub use spec::{
    ACCESS_ALL, AccessPolicy, AgentNodeSpec, AgentPlatform, AgentPool, AgentSource, AuthType,
    DeploymentConfig, DeploymentType, IPV4_ANY, IPV6_ANY,
};
