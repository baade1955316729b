//! Provisioning plan types and construction.
//!
//! A plan lists the provisioning calls a resolved configuration feeds, in
//! the order their inputs and outputs require. Each step names the
//! resource it declares and the resolved values it receives.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::{AgentPlatform, AuthType, ConfigHasher, DeploymentConfig};

use super::tables::{CONTROLLER_ALARMS, WAF_MANAGED_RULES};

/// Port agents are reached on from the controller.
const AGENT_SSH_PORT: u16 = 22;

/// Port the controller serves on behind the load balancer.
const CONTROLLER_PORT: u16 = 8080;

/// A complete provisioning plan.
#[derive(Debug, Clone, Serialize)]
pub struct StackPlan {
    /// When the plan was rendered.
    pub created_at: DateTime<Utc>,
    /// Fingerprint of the configuration this plan is based on.
    pub config_hash: String,
    /// Steps in provisioning order.
    pub steps: Vec<ProvisionStep>,
    /// Non-fatal findings carried over from resolution.
    pub warnings: Vec<String>,
}

/// A single provisioning call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionStep {
    /// Which collaborator handles this step.
    pub kind: StepKind,
    /// Logical name of the declared resource.
    pub resource_name: String,
    /// Resolved inputs, one per line.
    pub details: Vec<String>,
    /// Indices of earlier steps whose outputs this step consumes.
    pub dependencies: Vec<usize>,
}

/// Provisioning collaborators, in the order they are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// VPC and subnets.
    Network,
    /// Controller and agent security groups.
    SecurityGroups,
    /// Secrets imported for TLS and authentication.
    SecretsImport,
    /// Agent launch templates.
    AgentCatalog,
    /// The Jenkins controller instance.
    MainNode,
    /// External load balancer in front of the controller.
    LoadBalancer,
    /// Web ACL on the load balancer.
    Waf,
    /// Bucket for logs and artifacts.
    ArtifactBucket,
    /// Alarms and dashboards.
    Monitoring,
}

impl StepKind {
    /// Every step kind, in provisioning order.
    pub const ORDER: [Self; 9] = [
        Self::Network,
        Self::SecurityGroups,
        Self::SecretsImport,
        Self::AgentCatalog,
        Self::MainNode,
        Self::LoadBalancer,
        Self::Waf,
        Self::ArtifactBucket,
        Self::Monitoring,
    ];

    /// Position of this step in [`StepKind::ORDER`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Steps whose outputs this step consumes.
    #[must_use]
    pub const fn inputs(self) -> &'static [Self] {
        match self {
            Self::Network | Self::SecretsImport | Self::ArtifactBucket => &[],
            Self::SecurityGroups => &[Self::Network],
            Self::AgentCatalog => &[Self::SecurityGroups],
            Self::MainNode => &[
                Self::Network,
                Self::SecurityGroups,
                Self::SecretsImport,
                Self::AgentCatalog,
            ],
            Self::LoadBalancer => &[Self::Network, Self::SecurityGroups, Self::MainNode],
            Self::Waf => &[Self::LoadBalancer],
            Self::Monitoring => &[Self::MainNode, Self::LoadBalancer],
        }
    }

    const fn resource_name(self) -> &'static str {
        match self {
            Self::Network => "JenkinsVpc",
            Self::SecurityGroups => "JenkinsSecurityGroups",
            Self::SecretsImport => "JenkinsSecrets",
            Self::AgentCatalog => "JenkinsAgentTemplates",
            Self::MainNode => "JenkinsMainNode",
            Self::LoadBalancer => "JenkinsExternalLoadBalancer",
            Self::Waf => "JenkinsWafAcl",
            Self::ArtifactBucket => "JenkinsLogsBucket",
            Self::Monitoring => "JenkinsMonitoring",
        }
    }
}

impl StackPlan {
    /// Renders the provisioning plan for a resolved configuration.
    #[must_use]
    pub fn from_config(config: &DeploymentConfig, config_hash: &str) -> Self {
        let steps = StepKind::ORDER
            .into_iter()
            .map(|kind| ProvisionStep {
                kind,
                resource_name: kind.resource_name().to_string(),
                details: step_details(kind, config),
                dependencies: kind.inputs().iter().map(|k| k.index()).collect(),
            })
            .collect::<Vec<_>>();

        debug!(
            "Rendered {} provisioning steps for config {}",
            steps.len(),
            ConfigHasher::new().short_hash(config_hash)
        );

        Self {
            created_at: Utc::now(),
            config_hash: config_hash.to_string(),
            steps,
            warnings: Vec::new(),
        }
    }

    /// Attaches resolution warnings to the plan.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Returns the number of steps.
    #[must_use]
    pub const fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the step of the given kind.
    #[must_use]
    pub fn step(&self, kind: StepKind) -> Option<&ProvisionStep> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Returns steps that consume the output of the step at `step_idx`.
    #[must_use]
    pub fn dependent_steps(&self, step_idx: usize) -> Vec<(usize, &ProvisionStep)> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.dependencies.contains(&step_idx))
            .collect()
    }
}

fn step_details(kind: StepKind, config: &DeploymentConfig) -> Vec<String> {
    match kind {
        StepKind::Network => vec![
            String::from("VPC with public and private subnets across two availability zones"),
            String::from("NAT gateway for agent egress"),
        ],
        StepKind::SecurityGroups => vec![
            format!(
                "Controller ingress tcp/{} from {}",
                config.listener_port(),
                config.server_access
            ),
            format!("Agent ingress tcp/{AGENT_SSH_PORT} from controller security group"),
            format!("Controller ingress tcp/{CONTROLLER_PORT} from load balancer security group"),
        ],
        StepKind::SecretsImport => secrets(config),
        StepKind::AgentCatalog => agent_templates(config),
        StepKind::MainNode => {
            let mut details = vec![
                format!("Authentication: {}", auth_description(config.auth_type)),
                format!("Agent fleet: {} ({})", config.deployment_type, config.agent_source),
                format!("Production agents: {}", config.use_prod_agents),
            ];
            if let Some(path) = &config.additional_commands {
                details.push(format!("Additional boot commands from {path}"));
            }
            details
        }
        StepKind::LoadBalancer => {
            if config.use_ssl {
                vec![
                    String::from("HTTPS listener on 443 with imported certificate"),
                    String::from("HTTP listener on 80 redirecting to HTTPS"),
                    format!("Target: controller tcp/{CONTROLLER_PORT}"),
                ]
            } else {
                vec![
                    String::from("HTTP listener on 80"),
                    format!("Target: controller tcp/{CONTROLLER_PORT}"),
                ]
            }
        }
        StepKind::Waf => WAF_MANAGED_RULES
            .iter()
            .map(|rule| format!("Managed rule group {rule}"))
            .collect(),
        StepKind::ArtifactBucket => vec![
            String::from("Encrypted bucket for load balancer access logs and build artifacts"),
            String::from("Public access blocked"),
        ],
        StepKind::Monitoring => CONTROLLER_ALARMS
            .iter()
            .map(|alarm| {
                format!(
                    "Alarm {}: {} >= {} for {} period(s)",
                    alarm.name, alarm.metric, alarm.threshold, alarm.evaluation_periods
                )
            })
            .collect(),
    }
}

fn secrets(config: &DeploymentConfig) -> Vec<String> {
    let mut details = Vec::new();

    if config.use_ssl {
        details.push(String::from("TLS certificate, private key and chain"));
    }

    match config.auth_type {
        AuthType::Github => details.push(String::from("GitHub OAuth client id and secret")),
        AuthType::Oidc => details.push(String::from("OIDC client credentials and issuer")),
        AuthType::Default => {}
    }

    if details.is_empty() {
        details.push(String::from("No secrets required"));
    }

    details
}

fn agent_templates(config: &DeploymentConfig) -> Vec<String> {
    let mut details: Vec<String> = config
        .agent_nodes
        .iter()
        .map(|node| {
            format!(
                "{} [{}] {} {} label={}",
                node.name, node.platform, node.instance_type, node.ami_id, node.label
            )
        })
        .collect();

    if config.agent_nodes.is_empty() {
        details.push(String::from("No agent templates"));
    }

    if config.mac_agent {
        let mac_types: Vec<&str> = config
            .agent_nodes
            .iter()
            .filter(|n| n.platform == AgentPlatform::Mac)
            .map(|n| n.instance_type.as_str())
            .collect();
        if mac_types.is_empty() {
            details.push(String::from("Mac dedicated hosts requested but no mac agents selected"));
        } else {
            details.push(format!("Mac dedicated hosts for: {}", mac_types.join(", ")));
        }
    }

    details
}

const fn auth_description(auth_type: AuthType) -> &'static str {
    match auth_type {
        AuthType::Default => "Jenkins user database",
        AuthType::Github => "GitHub OAuth",
        AuthType::Oidc => "OpenID Connect",
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::SecurityGroups => "security-groups",
            Self::SecretsImport => "secrets",
            Self::AgentCatalog => "agents",
            Self::MainNode => "main-node",
            Self::LoadBalancer => "load-balancer",
            Self::Waf => "waf",
            Self::ArtifactBucket => "bucket",
            Self::Monitoring => "monitoring",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.resource_name)
    }
}

impl std::fmt::Display for StackPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Provisioning Plan ({} steps):", self.steps.len())?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {i}. {step}")?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "\nWarnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }

        Ok(())
    }
}
