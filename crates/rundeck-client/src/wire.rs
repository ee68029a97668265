//! Rundeck JSON job format.
//!
//! The public job types are shaped after the declarative configuration; the
//! structs here follow the server's export layout (`nodefilters.dispatch`,
//! flat plugin steps, `schedule.month` as a string, options as a list) and
//! `JobDefinition` is (de)serialized through them.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::job::{
    CommandSequence, JobCommand, JobDefinition, JobDispatch, JobOption, JobOptions, JobPlugin,
    JobReference, JobSchedule, NodeFilter, ScheduleMonth, ScheduleTime, ScheduleWeekDay,
    ScheduleYear,
};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireJob {
    #[serde(skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(skip_serializing)]
    uuid: String,
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    project: String,
    description: String,
    loglevel: String,
    #[serde(rename = "multipleExecutions", deserialize_with = "lenient_bool")]
    multiple_executions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodefilters: Option<WireNodeFilters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<WireSequence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<JobOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<WireSchedule>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireNodeFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dispatch: Option<WireDispatch>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct WireDispatch {
    #[serde(deserialize_with = "lenient_u32")]
    threadcount: u32,
    #[serde(deserialize_with = "lenient_bool")]
    keepgoing: bool,
    #[serde(rename = "rankAttribute", skip_serializing_if = "String::is_empty")]
    rank_attribute: String,
    #[serde(rename = "rankOrder")]
    rank_order: String,
    #[serde(rename = "excludePrecedence", deserialize_with = "lenient_bool")]
    exclude_precedence: bool,
}

impl Default for WireDispatch {
    fn default() -> Self {
        let dispatch = JobDispatch::default();
        Self {
            threadcount: dispatch.max_thread_count,
            keepgoing: dispatch.continue_on_error,
            rank_attribute: dispatch.rank_attribute,
            rank_order: dispatch.rank_order,
            exclude_precedence: false,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireSequence {
    #[serde(deserialize_with = "lenient_bool")]
    keepgoing: bool,
    strategy: String,
    commands: Vec<WireCommand>,
}

/// One step. Plugin steps are flat: `type`, `nodeStep` and `configuration`
/// sit next to the other step fields.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireCommand {
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    exec: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    script: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    scriptfile: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    args: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobref: Option<WireJobRef>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    plugin_type: String,
    #[serde(
        rename = "nodeStep",
        deserialize_with = "lenient_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    node_step: Option<bool>,
    #[serde(deserialize_with = "lenient_string_map", skip_serializing_if = "BTreeMap::is_empty")]
    configuration: BTreeMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireJobRef {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    group: String,
    #[serde(rename = "nodeStep", deserialize_with = "lenient_bool")]
    node_step: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    args: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<ScheduleTime>,
    #[serde(skip_serializing_if = "String::is_empty")]
    month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dayofmonth: Option<WireDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weekday: Option<WireDay>,
    #[serde(skip_serializing_if = "String::is_empty")]
    year: String,
    /// Set instead of the split fields when the job was saved with a crontab string.
    #[serde(skip_serializing_if = "Option::is_none")]
    crontab: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireDay {
    day: String,
}

impl Serialize for JobDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireJob::try_from(self)
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JobDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireJob::deserialize(deserializer)?;
        JobDefinition::try_from(wire).map_err(de::Error::custom)
    }
}

impl TryFrom<&JobDefinition> for WireJob {
    type Error = String;

    fn try_from(job: &JobDefinition) -> Result<Self, Self::Error> {
        let nodefilters = if job.node_filter.is_some() || job.dispatch.is_some() {
            let dispatch = job.dispatch.clone().unwrap_or_default();
            Some(WireNodeFilters {
                filter: job.node_filter.as_ref().map(|f| f.query.clone()),
                dispatch: Some(WireDispatch {
                    threadcount: dispatch.max_thread_count,
                    keepgoing: dispatch.continue_on_error,
                    rank_attribute: dispatch.rank_attribute,
                    rank_order: dispatch.rank_order,
                    exclude_precedence: job
                        .node_filter
                        .as_ref()
                        .is_some_and(|f| f.exclude_precedence),
                }),
            })
        } else {
            None
        };

        let sequence = match job.command_sequence {
            Some(ref sequence) => Some(WireSequence {
                keepgoing: sequence.continue_on_error,
                strategy: sequence.ordering_strategy.clone(),
                commands: sequence
                    .commands
                    .iter()
                    .enumerate()
                    .map(|(index, command)| wire_command(index, command))
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            None => None,
        };

        Ok(WireJob {
            id: job.id.clone(),
            uuid: String::new(),
            name: job.name.clone(),
            group: job.group_name.clone(),
            project: job.project_name.clone(),
            description: job.description.clone(),
            loglevel: job.log_level.clone(),
            multiple_executions: job.allow_concurrent_executions,
            nodefilters,
            sequence,
            options: job.options_config.as_ref().map(|o| o.options.clone()),
            schedule: job.schedule.as_ref().map(wire_schedule),
        })
    }
}

fn wire_command(index: usize, command: &JobCommand) -> Result<WireCommand, String> {
    let slots = [
        command.job.is_some(),
        command.step_plugin.is_some(),
        command.node_step_plugin.is_some(),
    ];
    if slots.iter().filter(|set| **set).count() > 1 {
        return Err(format!(
            "step {} carries more than one of job reference, step plugin and node-step plugin; \
             the JSON job format allows one per step",
            index
        ));
    }

    let mut wire = WireCommand {
        description: command.description.clone(),
        exec: command.shell_command.clone(),
        script: command.script.clone(),
        scriptfile: command.script_file.clone(),
        args: command.script_file_args.clone(),
        jobref: command.job.as_ref().map(|job| WireJobRef {
            name: job.name.clone(),
            group: job.group_name.clone(),
            node_step: job.run_for_each_node,
            args: job.arguments.clone(),
        }),
        ..Default::default()
    };

    let plugin = command
        .step_plugin
        .as_ref()
        .map(|p| (p, false))
        .or(command.node_step_plugin.as_ref().map(|p| (p, true)));
    if let Some((plugin, node_step)) = plugin {
        wire.plugin_type = plugin.plugin_type.clone();
        wire.node_step = Some(node_step);
        wire.configuration = plugin.config.clone();
    }

    Ok(wire)
}

fn wire_schedule(schedule: &JobSchedule) -> WireSchedule {
    WireSchedule {
        time: Some(schedule.time.clone()),
        month: schedule.month.month.clone(),
        dayofmonth: (!schedule.month.day.is_empty()).then(|| WireDay {
            day: schedule.month.day.clone(),
        }),
        weekday: schedule.week_day.as_ref().map(|w| WireDay { day: w.day.clone() }),
        year: schedule.year.year.clone(),
        crontab: None,
    }
}

impl TryFrom<WireJob> for JobDefinition {
    type Error = String;

    fn try_from(wire: WireJob) -> Result<Self, Self::Error> {
        let (dispatch, node_filter) = match wire.nodefilters {
            Some(filters) => {
                let exclude_precedence = filters
                    .dispatch
                    .as_ref()
                    .is_some_and(|d| d.exclude_precedence);
                let dispatch = filters.dispatch.map(|d| JobDispatch {
                    max_thread_count: d.threadcount,
                    continue_on_error: d.keepgoing,
                    rank_attribute: d.rank_attribute,
                    rank_order: d.rank_order,
                });
                let node_filter = filters
                    .filter
                    .filter(|query| !query.is_empty())
                    .map(|query| NodeFilter {
                        query,
                        exclude_precedence,
                    });
                (dispatch, node_filter)
            }
            None => (None, None),
        };

        let schedule = wire.schedule.map(job_schedule).transpose()?;

        Ok(JobDefinition {
            id: if wire.id.is_empty() { wire.uuid } else { wire.id },
            name: wire.name,
            group_name: wire.group,
            project_name: wire.project,
            description: wire.description,
            log_level: wire.loglevel,
            allow_concurrent_executions: wire.multiple_executions,
            dispatch,
            command_sequence: wire.sequence.map(|sequence| CommandSequence {
                continue_on_error: sequence.keepgoing,
                ordering_strategy: sequence.strategy,
                commands: sequence.commands.into_iter().map(job_command).collect(),
            }),
            // A JSON option list is always in declaration order
            options_config: wire.options.map(|options| JobOptions {
                preserve_order: true,
                options,
            }),
            node_filter,
            schedule,
        })
    }
}

fn job_command(wire: WireCommand) -> JobCommand {
    let plugin = (!wire.plugin_type.is_empty()).then(|| JobPlugin {
        plugin_type: wire.plugin_type,
        config: wire.configuration,
    });
    let (step_plugin, node_step_plugin) = match wire.node_step {
        Some(true) => (None, plugin),
        _ => (plugin, None),
    };

    JobCommand {
        description: wire.description,
        shell_command: wire.exec,
        script: wire.script,
        script_file: wire.scriptfile,
        script_file_args: wire.args,
        job: wire.jobref.map(|job| JobReference {
            name: job.name,
            group_name: job.group,
            run_for_each_node: job.node_step,
            arguments: job.args,
        }),
        step_plugin,
        node_step_plugin,
    }
}

fn job_schedule(wire: WireSchedule) -> Result<JobSchedule, String> {
    if let (None, Some(crontab)) = (&wire.time, &wire.crontab) {
        return crontab_schedule(crontab);
    }

    let or_any = |value: String| if value.is_empty() { "*".to_string() } else { value };
    Ok(JobSchedule {
        time: wire.time.unwrap_or_default(),
        month: ScheduleMonth {
            day: wire.dayofmonth.map_or_else(|| "?".to_string(), |d| d.day),
            month: or_any(wire.month),
        },
        week_day: wire.weekday.map(|w| ScheduleWeekDay { day: w.day }),
        year: ScheduleYear {
            year: or_any(wire.year),
        },
    })
}

/// Split a `seconds minute hour day month weekday [year]` crontab string.
fn crontab_schedule(crontab: &str) -> Result<JobSchedule, String> {
    let fields: Vec<&str> = crontab.split_whitespace().collect();
    let (seconds, minute, hour, day, month, week_day, year) = match *fields.as_slice() {
        [s, mi, h, d, mo, w] => (s, mi, h, d, mo, w, "*"),
        [s, mi, h, d, mo, w, y] => (s, mi, h, d, mo, w, y),
        _ => return Err(format!("crontab '{}' does not have 6 or 7 fields", crontab)),
    };
    Ok(JobSchedule {
        time: ScheduleTime {
            seconds: seconds.to_string(),
            minute: minute.to_string(),
            hour: hour.to_string(),
        },
        month: ScheduleMonth {
            day: day.to_string(),
            month: month.to_string(),
        },
        week_day: Some(ScheduleWeekDay {
            day: week_day.to_string(),
        }),
        year: ScheduleYear {
            year: year.to_string(),
        },
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(lenient_opt_bool(deserializer)?.unwrap_or(false))
}

/// Booleans arrive as JSON booleans or as `"true"`/`"false"` strings.
fn lenient_opt_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a boolean, found \"{}\"", s))),
        other => Err(de::Error::custom(format!("expected a boolean, found {}", other))),
    }
}

/// Thread counts are exported as numbers or numeric strings.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(ref n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(ref s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| de::Error::custom(format!("expected a thread count, found {}", value)))
}

/// Plugin configuration; scalar values are kept in their textual form.
fn lenient_string_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(entries) => entries,
        other => {
            return Err(de::Error::custom(format!(
                "expected a plugin configuration table, found {}",
                other
            )))
        }
    };
    entries
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Bool(_) | Value::Number(_) => Ok((key, value.to_string())),
            other => Err(de::Error::custom(format!(
                "plugin configuration '{}' is not a scalar: {}",
                key, other
            ))),
        })
        .collect()
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
