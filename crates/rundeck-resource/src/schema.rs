//! Declarative schema of the `rundeck_job` resource.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::error::ResourceError;

/// Value type of a configuration field.
#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Bool,
    Int,
    StringList,
    /// String keys to string values; other value types are rejected.
    StringMap,
    /// Repeated nested block, each entry described by the inner schema.
    Blocks(Schema),
}

impl FieldType {
    fn describe(&self) -> &'static str {
        match self {
            FieldType::String => "a string",
            FieldType::Bool => "a boolean",
            FieldType::Int => "an integer",
            FieldType::StringList => "a list of strings",
            FieldType::StringMap => "a table of strings",
            FieldType::Blocks(_) => "a list of blocks",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    /// Filled in from the server when left unset.
    pub computed: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
            computed: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a block against the schema: no unknown keys, no missing required
    /// fields, every present value of the declared type. `null` counts as unset.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), ResourceError> {
        self.validate_at("", values)
    }

    fn validate_at(&self, prefix: &str, values: &Map<String, Value>) -> Result<(), ResourceError> {
        for (key, value) in values {
            let path = join_path(prefix, key);
            let field = self
                .field(key)
                .ok_or_else(|| ResourceError::invalid(&path, "unknown field"))?;
            if !value.is_null() {
                check_type(&path, &field.field_type, value)?;
            }
        }

        for field in self.fields.iter().filter(|f| f.required) {
            let missing = match values.get(field.name) {
                None | Some(Value::Null) => true,
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            };
            if missing {
                return Err(ResourceError::invalid(
                    join_path(prefix, field.name),
                    "required field is not set",
                ));
            }
        }

        Ok(())
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

pub(crate) fn out_of_range(path: &str, value: &Value) -> ResourceError {
    ResourceError::invalid(path, format!("integer {} is out of range", value))
}

fn check_type(path: &str, field_type: &FieldType, value: &Value) -> Result<(), ResourceError> {
    let mismatch = || ResourceError::invalid(path, format!("expected {}", field_type.describe()));

    match field_type {
        FieldType::String if value.is_string() => Ok(()),
        FieldType::Bool if value.is_boolean() => Ok(()),
        FieldType::Int if value.is_i64() => Ok(()),
        FieldType::Int if value.is_u64() => Err(out_of_range(path, value)),
        FieldType::StringList => {
            let items = value.as_array().ok_or_else(mismatch)?;
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    return Err(ResourceError::invalid(
                        join_path(path, &index.to_string()),
                        "expected a string",
                    ));
                }
            }
            Ok(())
        }
        FieldType::StringMap => {
            let entries = value.as_object().ok_or_else(mismatch)?;
            for (key, entry) in entries {
                if !entry.is_string() {
                    return Err(ResourceError::invalid(
                        join_path(path, key),
                        "plugin configuration values must be strings",
                    ));
                }
            }
            Ok(())
        }
        FieldType::Blocks(schema) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            for (index, item) in items.iter().enumerate() {
                let item_path = join_path(path, &index.to_string());
                let block = item
                    .as_object()
                    .ok_or_else(|| ResourceError::invalid(&item_path, "expected a block"))?;
                schema.validate_at(&item_path, block)?;
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}

/// Schema of the `rundeck_job` resource.
pub fn job_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(build_job_schema)
}

fn build_job_schema() -> Schema {
    Schema::new(vec![
        Field::new("name", FieldType::String).required(),
        Field::new("group_name", FieldType::String),
        Field::new("project_name", FieldType::String).required(),
        Field::new("description", FieldType::String).required(),
        Field::new("log_level", FieldType::String).with_default("INFO"),
        Field::new("allow_concurrent_executions", FieldType::Bool),
        Field::new("max_thread_count", FieldType::Int).with_default(1),
        Field::new("continue_on_error", FieldType::Bool),
        Field::new("rank_order", FieldType::String).with_default("ascending"),
        Field::new("rank_attribute", FieldType::String),
        Field::new("preserve_options_order", FieldType::Bool).computed(),
        Field::new("command_ordering_strategy", FieldType::String).with_default("node-first"),
        Field::new("node_filter_query", FieldType::String),
        Field::new("node_filter_exclude_precedence", FieldType::Bool),
        Field::new("schedule", FieldType::String),
        Field::new("option", FieldType::Blocks(option_schema())),
        Field::new("command", FieldType::Blocks(command_schema())).required(),
    ])
}

fn option_schema() -> Schema {
    Schema::new(vec![
        Field::new("name", FieldType::String).required(),
        Field::new("default_value", FieldType::String),
        Field::new("value_choices", FieldType::StringList),
        Field::new("value_choices_url", FieldType::String),
        Field::new("require_predefined_choice", FieldType::Bool),
        Field::new("validation_regex", FieldType::String),
        Field::new("description", FieldType::String),
        Field::new("required", FieldType::Bool),
        Field::new("allow_multiple_values", FieldType::Bool),
        Field::new("multi_value_delimiter", FieldType::String),
        Field::new("obscure_input", FieldType::Bool),
        Field::new("exposed_to_scripts", FieldType::Bool),
    ])
}

fn command_schema() -> Schema {
    Schema::new(vec![
        Field::new("description", FieldType::String),
        Field::new("shell_command", FieldType::String),
        Field::new("inline_script", FieldType::String),
        Field::new("script_file", FieldType::String),
        Field::new("script_file_args", FieldType::String),
        Field::new("job", FieldType::Blocks(job_reference_schema())),
        Field::new("step_plugin", FieldType::Blocks(plugin_schema())),
        Field::new("node_step_plugin", FieldType::Blocks(plugin_schema())),
    ])
}

fn job_reference_schema() -> Schema {
    Schema::new(vec![
        Field::new("name", FieldType::String).required(),
        Field::new("group_name", FieldType::String),
        Field::new("run_for_each_node", FieldType::Bool),
        Field::new("args", FieldType::String),
    ])
}

fn plugin_schema() -> Schema {
    Schema::new(vec![
        Field::new("type", FieldType::String).required(),
        Field::new("config", FieldType::StringMap),
    ])
}
