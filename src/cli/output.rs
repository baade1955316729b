//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{AgentNodeSpec, ConfigHasher, DeploymentConfig, Resolution};
use crate::planner::{StackPlan, StepKind};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Agent row for table display.
#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Instance")]
    instance_type: String,
    #[tabled(rename = "Executors")]
    executors: u32,
    #[tabled(rename = "Label")]
    label: String,
}

/// Plan step row for table display.
#[derive(Tabled)]
struct PlanStepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Step")]
    step: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "After")]
    after: String,
}

impl From<&AgentNodeSpec> for AgentRow {
    fn from(node: &AgentNodeSpec) -> Self {
        Self {
            name: node.name.clone(),
            pool: node.pool.to_string(),
            platform: node.platform.to_string(),
            instance_type: node.instance_type.clone(),
            executors: node.num_executors,
            label: OutputFormatter::truncate(&node.label, 48),
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a resolution for display.
    #[must_use]
    pub fn format_resolution(&self, resolution: &Resolution, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&ResolutionJson {
                config: &resolution.config,
                warnings: &resolution.warnings,
            })
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid\n", "✓".green());
                output.push_str(&Self::format_config_text(&resolution.config));

                if show_warnings && !resolution.warnings.is_empty() {
                    output.push_str(&Self::format_warnings_text(&resolution.warnings));
                }

                output
            }
        }
    }

    /// Formats a resolved configuration as text.
    fn format_config_text(config: &DeploymentConfig) -> String {
        let mut output = String::from("\nConfiguration summary:\n");

        let _ = writeln!(output, "   SSL: {}", config.use_ssl);
        let _ = writeln!(output, "   Auth: {}", config.auth_type);
        let _ = writeln!(output, "   Access: {}", config.server_access);
        let _ = writeln!(output, "   Deployment type: {}", config.deployment_type);
        let _ = writeln!(output, "   Production agents: {}", config.use_prod_agents);
        let _ = writeln!(output, "   Mac agent hosts: {}", config.mac_agent);
        let _ = writeln!(
            output,
            "   Additional commands: {}",
            config.additional_commands.as_deref().unwrap_or("-")
        );
        let _ = writeln!(
            output,
            "   Agents ({}, from {}):",
            config.agent_nodes.len(),
            config.agent_source
        );
        for name in config.agent_names() {
            let _ = writeln!(output, "     - {name}");
        }

        output
    }

    /// Formats warnings as text.
    fn format_warnings_text(warnings: &[String]) -> String {
        let mut output = format!("\n{} Warnings:\n", "⚠".yellow());
        for warning in warnings {
            let _ = writeln!(output, "   - {warning}");
        }
        output
    }

    /// Formats a provisioning plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &StackPlan, detailed: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan, detailed),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &StackPlan, detailed: bool) -> String {
        let mut output = String::from("\n📋 Provisioning Plan\n");
        let _ = write!(
            output,
            "   Config hash: {}\n\n",
            ConfigHasher::new().short_hash(&plan.config_hash)
        );

        let rows: Vec<PlanStepRow> = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| PlanStepRow {
                index: i + 1,
                step: Self::format_step_kind(step.kind),
                resource: step.resource_name.clone(),
                after: step
                    .dependencies
                    .iter()
                    .map(|d| (d + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        if detailed {
            for (i, step) in plan.steps.iter().enumerate() {
                let _ = writeln!(output, "\n{}. {}", i + 1, step.resource_name.bold());
                for detail in &step.details {
                    let _ = writeln!(output, "   {detail}");
                }
            }
        }

        let _ = write!(
            output,
            "\nPlan: {} provisioning steps\n",
            plan.step_count().to_string().green()
        );

        if !plan.warnings.is_empty() {
            output.push_str(&Self::format_warnings_text(&plan.warnings));
        }

        output
    }

    /// Formats agent catalog entries for display.
    #[must_use]
    pub fn format_agents(&self, title: &str, agents: &[&AgentNodeSpec]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(agents).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("\n🖥  {title}\n\n");

                if agents.is_empty() {
                    output.push_str("   No agents.\n");
                    return output;
                }

                let rows: Vec<AgentRow> = agents.iter().map(|a| AgentRow::from(*a)).collect();
                output.push_str(&Table::new(rows).to_string());
                let _ = write!(output, "\n\n{} agent profiles\n", agents.len());
                output
            }
        }
    }

    /// Formats an error for display.
    #[must_use]
    pub fn format_error(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "error", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✗".red()),
        }
    }

    /// Formats a step kind with color.
    fn format_step_kind(kind: StepKind) -> String {
        match kind {
            StepKind::Network | StepKind::SecurityGroups => kind.to_string().cyan().to_string(),
            StepKind::SecretsImport => kind.to_string().magenta().to_string(),
            StepKind::AgentCatalog | StepKind::MainNode => kind.to_string().green().to_string(),
            StepKind::LoadBalancer | StepKind::Waf => kind.to_string().yellow().to_string(),
            StepKind::ArtifactBucket | StepKind::Monitoring => kind.to_string().dimmed().to_string(),
        }
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct ResolutionJson<'a> {
    config: &'a DeploymentConfig,
    warnings: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentCatalog, ContextParams, DeploymentResolver, RawParameters};

    fn resolution() -> Resolution {
        let resolver = DeploymentResolver::new(AgentCatalog::builtin().unwrap());
        let context = ContextParams::parse([
            "useSsl=true",
            "serverAccessType=ipv4",
            "restrictServerAccessTo=all",
            "jenkinsInstanceType=gradle",
        ])
        .unwrap();
        resolver.resolve(&RawParameters::from_context(context)).unwrap()
    }

    #[test]
    fn test_resolution_json() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_resolution(&resolution(), false);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["config"]["deploymentType"], "gradle");
        assert_eq!(value["config"]["serverAccess"]["type"], "ipv4");
        assert_eq!(value["config"]["serverAccess"]["value"], "0.0.0.0/0");
        assert_eq!(value["config"]["agentNodes"].as_array().unwrap().len(), 2);
        assert!(!value["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_resolution_text_lists_agents() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_resolution(&resolution(), true);

        assert!(output.contains("UBUNTU2004-X64-GRADLE-CHECK"));
        assert!(output.contains("Warnings"));
    }

    #[test]
    fn test_plan_json_has_ordered_steps() {
        let resolution = resolution();
        let hash = ConfigHasher::new().hash_config(&resolution.config);
        let plan = StackPlan::from_config(&resolution.config, &hash);

        let formatter = OutputFormatter::new(OutputFormat::Json);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_plan(&plan, false)).unwrap();

        assert_eq!(value["steps"][0]["kind"], "network");
        assert_eq!(value["steps"][8]["kind"], "monitoring");
        assert_eq!(value["config_hash"], hash.as_str());
    }

    #[test]
    fn test_plan_text_shows_short_hash() {
        let resolution = resolution();
        let hash = ConfigHasher::new().hash_config(&resolution.config);
        let plan = StackPlan::from_config(&resolution.config, &hash);

        let output = OutputFormatter::new(OutputFormat::Text).format_plan(&plan, false);
        assert!(output.contains(&format!("Config hash: {}\n", &hash[..8])));
        assert!(!output.contains(&hash));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("abcdefghijkl", 8), "abcde...");
    }
}
