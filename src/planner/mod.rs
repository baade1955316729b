//! Planning module for provisioning calls.
//!
//! This module turns a resolved deployment configuration into the ordered
//! list of provisioning steps handed to the external collaborators.

mod plan;
mod tables;

pub use plan::{ProvisionStep, StackPlan, StepKind};
pub use tables::{AlarmSpec, CONTROLLER_ALARMS, WAF_MANAGED_RULES};
