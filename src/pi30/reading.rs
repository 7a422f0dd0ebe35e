use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::field::Value;

/// One decoded value with its display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingField {
    pub label: &'static str,
    pub value: Value,
    pub unit: &'static str,
    pub icon: Option<&'static str>,
}

/// The ordered, labeled result of decoding one response. Field order is
/// the command definition's declaration order and survives serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub command: String,
    pub description: &'static str,
    fields: Vec<ReadingField>,
}

impl Reading {
    pub fn new(command: &str, description: &'static str) -> Self {
        Self {
            command: command.to_string(),
            description,
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, field: ReadingField) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[ReadingField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&ReadingField> {
        self.fields.iter().find(|field| field.label == label)
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            value: &'a Value,
            unit: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            icon: Option<&'a str>,
        }

        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("_command", &self.command)?;
        map.serialize_entry("_command_description", self.description)?;
        for field in &self.fields {
            map.serialize_entry(
                field.label,
                &Entry {
                    value: &field.value,
                    unit: field.unit,
                    icon: field.icon,
                },
            )?;
        }
        map.end()
    }
}
