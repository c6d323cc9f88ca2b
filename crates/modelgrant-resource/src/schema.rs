//! Resource schema as presented to the provider host.
//!
//! The host uses the schema to validate practitioner configuration, decide
//! which attribute changes force replacement, and render documentation.

use serde::{Deserialize, Serialize};

/// Type name the resource is registered under.
pub const ACCESS_MODEL_TYPE: &str = "modelgrant_access_model";

/// Schema version of the persisted state.
pub const SCHEMA_VERSION: u32 = 0;

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A single string.
    String,
    /// An ordered list of strings.
    StringList,
}

/// Description of one resource attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,

    /// Value type.
    pub kind: AttributeType,

    /// Human-readable description.
    pub description: String,

    /// Must be set in configuration.
    #[serde(default)]
    pub required: bool,

    /// Set by the provider rather than the practitioner.
    #[serde(default)]
    pub computed: bool,

    /// Changing the value replaces the resource.
    #[serde(default)]
    pub force_new: bool,
}

impl Attribute {
    /// A required attribute.
    pub fn required(
        name: impl Into<String>,
        kind: AttributeType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            computed: false,
            force_new: false,
        }
    }

    /// A computed attribute.
    pub fn computed(
        name: impl Into<String>,
        kind: AttributeType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            computed: true,
            force_new: false,
        }
    }

    /// Marks the attribute as forcing replacement when changed.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

/// Full description of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Registered type name.
    pub type_name: String,

    /// Schema version.
    pub version: u32,

    /// Human-readable description.
    pub description: String,

    /// Whether existing objects can be adopted by identifier.
    pub importable: bool,

    /// Attributes, in declaration order.
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of attributes whose change forces replacement.
    pub fn force_new_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|a| a.force_new)
            .map(|a| a.name.as_str())
    }
}

/// Schema of the access-model resource.
pub fn access_model_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: ACCESS_MODEL_TYPE.to_string(),
        version: SCHEMA_VERSION,
        description: "A resource that represent an Access Model.".to_string(),
        importable: true,
        attributes: vec![
            Attribute::computed(
                "id",
                AttributeType::String,
                "Identifier of the grant, formatted as <model>:<access>",
            ),
            Attribute::required(
                "model",
                AttributeType::String,
                "The name of the model for access management",
            )
            .with_force_new(),
            Attribute::required(
                "users",
                AttributeType::StringList,
                "List of users to grant access to",
            ),
            Attribute::required("access", AttributeType::String, "Type of access to the model"),
        ],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_attributes() {
        let schema = access_model_schema();
        for name in ["model", "users", "access"] {
            let attr = schema.attribute(name).unwrap();
            assert!(attr.required, "{name} should be required");
            assert!(!attr.computed);
        }
    }

    #[test]
    fn test_only_model_forces_replacement() {
        let schema = access_model_schema();
        let force_new: Vec<_> = schema.force_new_attributes().collect();
        assert_eq!(force_new, vec!["model"]);
    }

    #[test]
    fn test_users_is_a_list() {
        let schema = access_model_schema();
        assert_eq!(
            schema.attribute("users").unwrap().kind,
            AttributeType::StringList
        );
    }

    #[test]
    fn test_id_is_computed() {
        let schema = access_model_schema();
        let id = schema.attribute("id").unwrap();
        assert!(id.computed);
        assert!(!id.required);
    }

    #[test]
    fn test_schema_metadata() {
        let schema = access_model_schema();
        assert_eq!(schema.type_name, "modelgrant_access_model");
        assert!(schema.importable);
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn test_schema_serializes() {
        let json = serde_json::to_value(access_model_schema()).unwrap();
        assert_eq!(json["attributes"][1]["name"], "model");
        assert_eq!(json["attributes"][1]["force_new"], true);
        assert_eq!(json["attributes"][2]["kind"], "string_list");
    }
}
