//! Descriptions of the helpers as agent tools.
//!
//! Agent frameworks register tools by name, description and a typed list of
//! inputs. Each adapter publishes its descriptor(s) so callers do not have to
//! restate them.

use serde::Serialize;

/// Type of a tool input or output, as agent frameworks spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolValueType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInput {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ToolValueType,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    pub nullable: bool,
}

impl ToolInput {
    pub fn required(
        name: &'static str,
        value_type: ToolValueType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            value_type,
            description,
            default: None,
            nullable: false,
        }
    }

    pub fn optional(
        name: &'static str,
        value_type: ToolValueType,
        description: &'static str,
        default: serde_json::Value,
    ) -> Self {
        Self {
            name,
            value_type,
            description,
            default: Some(default),
            nullable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: Vec<ToolInput>,
    pub output_type: ToolValueType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_serialization() {
        let tool = ToolDescriptor {
            name: "echo",
            description: "Echo the input",
            inputs: vec![
                ToolInput::required("text", ToolValueType::String, "Text to echo"),
                ToolInput::optional("times", ToolValueType::Integer, "Repetitions", json!(1)),
            ],
            output_type: ToolValueType::String,
        };

        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["inputs"][0]["type"], "string");
        assert!(value["inputs"][0].get("default").is_none());
        assert_eq!(value["inputs"][1]["default"], 1);
        assert_eq!(value["inputs"][1]["nullable"], true);
    }
}
