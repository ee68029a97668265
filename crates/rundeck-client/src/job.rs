//! Job definition types.
//!
//! The types follow the declarative configuration that produces them. The
//! server's JSON job format is handled by the private `wire` module, through
//! which `JobDefinition` is serialized and deserialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete job as stored by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDefinition {
    /// Server-assigned identifier. Empty until the job has been imported once.
    pub id: String,
    pub name: String,
    pub group_name: String,
    pub project_name: String,
    pub description: String,
    pub log_level: String,
    pub allow_concurrent_executions: bool,
    pub dispatch: Option<JobDispatch>,
    pub command_sequence: Option<CommandSequence>,
    pub options_config: Option<JobOptions>,
    pub node_filter: Option<NodeFilter>,
    pub schedule: Option<JobSchedule>,
}

/// How commands are dispatched across target nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDispatch {
    pub max_thread_count: u32,
    pub continue_on_error: bool,
    pub rank_attribute: String,
    pub rank_order: String,
}

impl Default for JobDispatch {
    fn default() -> Self {
        Self {
            max_thread_count: 1,
            continue_on_error: false,
            rank_attribute: String::new(),
            rank_order: "ascending".to_string(),
        }
    }
}

/// Node selection query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeFilter {
    pub query: String,
    pub exclude_precedence: bool,
}

/// Ordered steps of a job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSequence {
    pub continue_on_error: bool,
    pub ordering_strategy: String,
    pub commands: Vec<JobCommand>,
}

/// A single step. Each of the reference and plugin slots holds at most one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCommand {
    pub description: String,
    pub shell_command: String,
    pub script: String,
    pub script_file: String,
    pub script_file_args: String,
    pub job: Option<JobReference>,
    pub step_plugin: Option<JobPlugin>,
    pub node_step_plugin: Option<JobPlugin>,
}

/// A step that runs another job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobReference {
    pub name: String,
    pub group_name: String,
    pub run_for_each_node: bool,
    pub arguments: String,
}

/// A step or node-step plugin invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPlugin {
    pub plugin_type: String,
    pub config: BTreeMap<String, String>,
}

/// Input options declared on a job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOptions {
    pub preserve_order: bool,
    pub options: Vec<JobOption>,
}

/// An input option. Serialized as-is in the server's option list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOption {
    pub name: String,

    #[serde(rename = "value", skip_serializing_if = "String::is_empty")]
    pub default_value: String,

    #[serde(rename = "values")]
    pub value_choices: Vec<String>,

    #[serde(rename = "valuesUrl", skip_serializing_if = "String::is_empty")]
    pub value_choices_url: String,

    #[serde(rename = "enforced")]
    pub require_predefined_choice: bool,

    #[serde(rename = "regex", skip_serializing_if = "String::is_empty")]
    pub validation_regex: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(rename = "required")]
    pub is_required: bool,

    #[serde(rename = "multivalued")]
    pub allows_multiple_values: bool,

    #[serde(rename = "delimiter", skip_serializing_if = "String::is_empty")]
    pub multi_value_delimiter: String,

    #[serde(rename = "secure")]
    pub obscure_input: bool,

    #[serde(rename = "valueExposed")]
    pub value_is_exposed_to_scripts: bool,
}

/// Quartz-style schedule split into its fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSchedule {
    pub time: ScheduleTime,
    pub month: ScheduleMonth,
    pub week_day: Option<ScheduleWeekDay>,
    pub year: ScheduleYear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleTime {
    pub seconds: String,
    pub minute: String,
    pub hour: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleMonth {
    /// Day of month; `?` when the weekday decides.
    pub day: String,
    pub month: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleWeekDay {
    pub day: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleYear {
    pub year: String,
}

/// Identity of a job as reported by a successful import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "group")]
    pub group_name: Option<String>,
    #[serde(rename = "project")]
    pub project_name: Option<String>,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
