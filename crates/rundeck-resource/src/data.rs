//! Loosely-typed configuration tree of a single resource.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ResourceError;
use crate::schema::{join_path, out_of_range, Field, FieldType, Schema};

/// Declared configuration of one resource plus the ID the server gave it.
///
/// Attribute values are untyped; a `null` value means the attribute is unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// Parse a TOML document whose top-level table holds the resource attributes.
    pub fn from_toml_str(content: &str) -> Result<Self, ResourceError> {
        let attributes: Map<String, Value> =
            toml::from_str(content).map_err(|e| ResourceError::InvalidDocument(e.to_string()))?;
        Ok(Self::from_attributes(attributes))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Attribute value, or `None` when unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn clear(&mut self, key: &str) {
        self.attributes.insert(key.to_string(), Value::Null);
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Typed view over the top-level attributes.
    pub fn reader<'a>(&'a self, schema: &'a Schema) -> Block<'a> {
        Block::new(String::new(), &self.attributes, schema)
    }
}

/// Typed, default-aware reads over one block of a configuration tree.
///
/// Unset values fall back to the schema default, then to the zero value of
/// the field type.
pub struct Block<'a> {
    path: String,
    values: &'a Map<String, Value>,
    schema: &'a Schema,
}

impl<'a> Block<'a> {
    pub fn new(path: String, values: &'a Map<String, Value>, schema: &'a Schema) -> Self {
        Self {
            path,
            values,
            schema,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn lookup(&self, key: &str) -> Result<(&'a Field, Option<&'a Value>), ResourceError> {
        let schema: &'a Schema = self.schema;
        let field = schema
            .field(key)
            .ok_or_else(|| ResourceError::invalid(self.child_path(key), "field is not in the schema"))?;
        let value = self
            .values
            .get(key)
            .filter(|v| !v.is_null())
            .or(field.default.as_ref());
        Ok((field, value))
    }

    fn child_path(&self, key: &str) -> String {
        join_path(&self.path, key)
    }

    fn mismatch(&self, key: &str, expected: &str) -> ResourceError {
        ResourceError::invalid(self.child_path(key), format!("expected {}", expected))
    }

    pub fn string(&self, key: &str) -> Result<String, ResourceError> {
        match self.lookup(key)?.1 {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.mismatch(key, "a string")),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, ResourceError> {
        match self.lookup(key)?.1 {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.mismatch(key, "a boolean")),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, ResourceError> {
        match self.lookup(key)?.1 {
            None => Ok(0),
            Some(v) if v.is_u64() && !v.is_i64() => Err(out_of_range(&self.child_path(key), v)),
            Some(v) => v.as_i64().ok_or_else(|| self.mismatch(key, "an integer")),
        }
    }

    pub fn strings(&self, key: &str) -> Result<Vec<String>, ResourceError> {
        let Some(value) = self.lookup(key)?.1 else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.mismatch(key, "a list of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| self.mismatch(key, "a list of strings"))
            })
            .collect()
    }

    /// String-to-string table. Non-string values are an error, never coerced.
    pub fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>, ResourceError> {
        let Some(value) = self.lookup(key)?.1 else {
            return Ok(BTreeMap::new());
        };
        let entries = value
            .as_object()
            .ok_or_else(|| self.mismatch(key, "a table of strings"))?;
        entries
            .iter()
            .map(|(k, v)| match v.as_str() {
                Some(s) => Ok((k.clone(), s.to_string())),
                None => Err(ResourceError::invalid(
                    join_path(&self.child_path(key), k),
                    "plugin configuration values must be strings",
                )),
            })
            .collect()
    }

    /// Entries of a repeated nested block.
    pub fn blocks(&self, key: &str) -> Result<Vec<Block<'a>>, ResourceError> {
        let (field, value) = self.lookup(key)?;
        let FieldType::Blocks(ref schema) = field.field_type else {
            return Err(self.mismatch(key, "a nested block field"));
        };
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.mismatch(key, "a list of blocks"))?;

        let list_path = self.child_path(key);
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let item_path = join_path(&list_path, &index.to_string());
                match item.as_object() {
                    Some(values) => Ok(Block::new(item_path, values, schema)),
                    None => Err(ResourceError::invalid(item_path, "expected a block")),
                }
            })
            .collect()
    }
}
