//! Mapping between the declared configuration tree and `JobDefinition`.

use rundeck_client::{
    CommandSequence, JobCommand, JobDefinition, JobDispatch, JobOption, JobOptions, JobPlugin,
    JobReference, NodeFilter,
};
use serde_json::{json, Map, Value};

use crate::data::{Block, ResourceData};
use crate::error::{BlockKind, ResourceError};
use crate::schedule::{format_schedule, parse_schedule};
use crate::schema::job_schema;

/// Build a job from declared configuration.
///
/// Fails on schema violations, on commands carrying more than one job
/// reference, step plugin or node-step plugin, and on malformed schedules.
pub fn decode_job(data: &ResourceData) -> Result<JobDefinition, ResourceError> {
    let schema = job_schema();
    schema.validate(data.attributes())?;
    let root = data.reader(schema);

    let node_filter_query = root.string("node_filter_query")?;
    let node_filter = if node_filter_query.is_empty() {
        None
    } else {
        Some(NodeFilter {
            query: node_filter_query,
            exclude_precedence: root.bool("node_filter_exclude_precedence")?,
        })
    };

    let schedule = root.string("schedule")?;
    let schedule = if schedule.is_empty() {
        None
    } else {
        Some(parse_schedule(&schedule)?)
    };

    Ok(JobDefinition {
        id: data.id().to_string(),
        name: root.string("name")?,
        group_name: root.string("group_name")?,
        project_name: root.string("project_name")?,
        description: root.string("description")?,
        log_level: root.string("log_level")?,
        allow_concurrent_executions: root.bool("allow_concurrent_executions")?,
        dispatch: Some(decode_dispatch(&root)?),
        command_sequence: Some(decode_sequence(&root)?),
        options_config: decode_options(&root)?,
        node_filter,
        schedule,
    })
}

fn decode_dispatch(root: &Block<'_>) -> Result<JobDispatch, ResourceError> {
    let thread_count = root.int("max_thread_count")?;
    let max_thread_count = u32::try_from(thread_count).map_err(|_| {
        ResourceError::invalid(
            "max_thread_count",
            format!("{} is not a valid thread count", thread_count),
        )
    })?;

    Ok(JobDispatch {
        max_thread_count,
        continue_on_error: root.bool("continue_on_error")?,
        rank_attribute: root.string("rank_attribute")?,
        rank_order: root.string("rank_order")?,
    })
}

fn decode_sequence(root: &Block<'_>) -> Result<CommandSequence, ResourceError> {
    let commands = root
        .blocks("command")?
        .iter()
        .map(decode_command)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CommandSequence {
        continue_on_error: root.bool("continue_on_error")?,
        ordering_strategy: root.string("command_ordering_strategy")?,
        commands,
    })
}

fn decode_command(block: &Block<'_>) -> Result<JobCommand, ResourceError> {
    let job = single_block(block, BlockKind::Job)?
        .map(|b| -> Result<JobReference, ResourceError> {
            Ok(JobReference {
                name: b.string("name")?,
                group_name: b.string("group_name")?,
                run_for_each_node: b.bool("run_for_each_node")?,
                arguments: b.string("args")?,
            })
        })
        .transpose()?;

    let step_plugin = single_block(block, BlockKind::StepPlugin)?
        .map(|b| decode_plugin(&b))
        .transpose()?;

    let node_step_plugin = single_block(block, BlockKind::NodeStepPlugin)?
        .map(|b| decode_plugin(&b))
        .transpose()?;

    Ok(JobCommand {
        description: block.string("description")?,
        shell_command: block.string("shell_command")?,
        script: block.string("inline_script")?,
        script_file: block.string("script_file")?,
        script_file_args: block.string("script_file_args")?,
        job,
        step_plugin,
        node_step_plugin,
    })
}

/// The only entry of a nested block list, if any.
fn single_block<'a>(
    block: &Block<'a>,
    kind: BlockKind,
) -> Result<Option<Block<'a>>, ResourceError> {
    let mut entries = block.blocks(kind.key())?;
    if entries.len() > 1 {
        return Err(ResourceError::TooManyBlocks {
            path: block.path().to_string(),
            kind,
        });
    }
    Ok(entries.pop())
}

fn decode_plugin(block: &Block<'_>) -> Result<JobPlugin, ResourceError> {
    Ok(JobPlugin {
        plugin_type: block.string("type")?,
        config: block.string_map("config")?,
    })
}

fn decode_options(root: &Block<'_>) -> Result<Option<JobOptions>, ResourceError> {
    let blocks = root.blocks("option")?;
    if blocks.is_empty() {
        return Ok(None);
    }

    let options = blocks
        .iter()
        .map(decode_option)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(JobOptions {
        preserve_order: root.bool("preserve_options_order")?,
        options,
    }))
}

fn decode_option(block: &Block<'_>) -> Result<JobOption, ResourceError> {
    Ok(JobOption {
        name: block.string("name")?,
        default_value: block.string("default_value")?,
        value_choices: block.strings("value_choices")?,
        value_choices_url: block.string("value_choices_url")?,
        require_predefined_choice: block.bool("require_predefined_choice")?,
        validation_regex: block.string("validation_regex")?,
        description: block.string("description")?,
        is_required: block.bool("required")?,
        allows_multiple_values: block.bool("allow_multiple_values")?,
        multi_value_delimiter: block.string("multi_value_delimiter")?,
        obscure_input: block.bool("obscure_input")?,
        value_is_exposed_to_scripts: block.bool("exposed_to_scripts")?,
    })
}

/// Write a job fetched from the server back into the configuration tree.
///
/// Lists and the schedule are rebuilt from scratch so entries removed on the
/// server disappear locally. An empty project name leaves the configured one
/// in place.
pub fn encode_job(job: &JobDefinition, data: &mut ResourceData) {
    data.set_id(job.id.as_str());
    data.set("name", job.name.as_str());
    data.set("group_name", job.group_name.as_str());

    // Some server versions omit the project from job exports.
    if !job.project_name.is_empty() {
        data.set("project_name", job.project_name.as_str());
    }

    data.set("description", job.description.as_str());
    data.set("log_level", job.log_level.as_str());
    data.set("allow_concurrent_executions", job.allow_concurrent_executions);

    match job.dispatch {
        Some(ref dispatch) => {
            data.set("max_thread_count", dispatch.max_thread_count);
            data.set("continue_on_error", dispatch.continue_on_error);
            data.set("rank_attribute", dispatch.rank_attribute.as_str());
            data.set("rank_order", dispatch.rank_order.as_str());
        }
        None => {
            data.set("max_thread_count", 1);
            data.clear("continue_on_error");
            data.clear("rank_attribute");
            data.set("rank_order", "ascending");
        }
    }

    data.clear("node_filter_query");
    data.clear("node_filter_exclude_precedence");
    if let Some(ref filter) = job.node_filter {
        data.set("node_filter_query", filter.query.as_str());
        data.set("node_filter_exclude_precedence", filter.exclude_precedence);
    }

    let mut options = Vec::new();
    if let Some(ref options_config) = job.options_config {
        set_computed(data, "preserve_options_order", options_config.preserve_order);
        options = options_config.options.iter().map(encode_option).collect();
    }
    data.set("option", Value::Array(options));

    let mut commands = Vec::new();
    if let Some(ref sequence) = job.command_sequence {
        data.set("command_ordering_strategy", sequence.ordering_strategy.as_str());
        commands = sequence.commands.iter().map(encode_command).collect();
    }
    data.set("command", Value::Array(commands));

    match job.schedule {
        Some(ref schedule) => data.set("schedule", format_schedule(schedule)),
        None => data.clear("schedule"),
    }
}

/// Computed attributes take the server's value only when left unset locally.
fn set_computed(data: &mut ResourceData, key: &str, value: impl Into<Value>) {
    let computed = job_schema().field(key).is_some_and(|f| f.computed);
    if !computed || data.get(key).is_none() {
        data.set(key, value);
    }
}

fn encode_option(option: &JobOption) -> Value {
    json!({
        "name": option.name,
        "default_value": option.default_value,
        "value_choices": option.value_choices,
        "value_choices_url": option.value_choices_url,
        "require_predefined_choice": option.require_predefined_choice,
        "validation_regex": option.validation_regex,
        "description": option.description,
        "required": option.is_required,
        "allow_multiple_values": option.allows_multiple_values,
        "multi_value_delimiter": option.multi_value_delimiter,
        "obscure_input": option.obscure_input,
        "exposed_to_scripts": option.value_is_exposed_to_scripts,
    })
}

fn encode_command(command: &JobCommand) -> Value {
    let mut block = Map::new();
    block.insert("description".to_string(), json!(command.description));
    block.insert("shell_command".to_string(), json!(command.shell_command));
    block.insert("inline_script".to_string(), json!(command.script));
    block.insert("script_file".to_string(), json!(command.script_file));
    block.insert("script_file_args".to_string(), json!(command.script_file_args));

    if let Some(ref job) = command.job {
        block.insert(
            BlockKind::Job.key().to_string(),
            json!([{
                "name": job.name,
                "group_name": job.group_name,
                "run_for_each_node": job.run_for_each_node,
                "args": job.arguments,
            }]),
        );
    }
    if let Some(ref plugin) = command.step_plugin {
        block.insert(BlockKind::StepPlugin.key().to_string(), encode_plugin(plugin));
    }
    if let Some(ref plugin) = command.node_step_plugin {
        block.insert(BlockKind::NodeStepPlugin.key().to_string(), encode_plugin(plugin));
    }

    Value::Object(block)
}

fn encode_plugin(plugin: &JobPlugin) -> Value {
    json!([{
        "type": plugin.plugin_type,
        "config": plugin.config,
    }])
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
