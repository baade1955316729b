//! Static provisioning tables.
//!
//! These are declarative inputs for the WAF and monitoring collaborators.
//! They do not depend on the resolved configuration.

/// Managed WAF rule groups attached to the controller's load balancer,
/// in evaluation order.
pub const WAF_MANAGED_RULES: &[&str] = &[
    "AWSManagedRulesCommonRuleSet",
    "AWSManagedRulesKnownBadInputsRuleSet",
    "AWSManagedRulesAmazonIpReputationList",
    "AWSManagedRulesLinuxRuleSet",
];

/// A CloudWatch alarm on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmSpec {
    /// Alarm name suffix.
    pub name: &'static str,
    /// Metric the alarm watches.
    pub metric: &'static str,
    /// Threshold, in the metric's unit.
    pub threshold: u32,
    /// Consecutive periods over threshold before the alarm fires.
    pub evaluation_periods: u32,
}

/// Alarms created for the controller.
pub const CONTROLLER_ALARMS: &[AlarmSpec] = &[
    AlarmSpec {
        name: "MainNodeCpuHigh",
        metric: "cpu_usage_user",
        threshold: 50,
        evaluation_periods: 5,
    },
    AlarmSpec {
        name: "MainNodeMemoryHigh",
        metric: "mem_used_percent",
        threshold: 80,
        evaluation_periods: 5,
    },
    AlarmSpec {
        name: "MainNodeDiskHigh",
        metric: "disk_used_percent",
        threshold: 70,
        evaluation_periods: 1,
    },
    AlarmSpec {
        name: "MainNodeStatusCheckFailed",
        metric: "StatusCheckFailed",
        threshold: 1,
        evaluation_periods: 1,
    },
    AlarmSpec {
        name: "ExternalLoadBalancerUnhealthyHosts",
        metric: "UnHealthyHostCount",
        threshold: 1,
        evaluation_periods: 3,
    },
];
