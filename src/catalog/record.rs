use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const TOOL_LABEL_PROPERTY: &str = "toolLabel";
pub const TOOL_DESCRIPTION_PROPERTY: &str = "toolDescription";

/// A tool descriptor as stored in the catalog directory, one JSON file per tool.
///
/// Only `toolURI` is strictly typed. The other fields fall back to their
/// empty value when they are missing, `null`, or shaped unexpectedly, so a
/// partially filled record is still usable for the lookups it supports.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ToolRecord {
    #[serde(rename = "toolURI", default)]
    pub tool_uri: Option<String>,

    #[serde(rename = "typeURI", default, deserialize_with = "lenient")]
    pub type_uri: Vec<TypeEntry>,

    #[serde(rename = "fileTypes", default, deserialize_with = "lenient")]
    pub file_types: FileTypes,

    #[serde(rename = "toolProperties", default, deserialize_with = "lenient")]
    pub tool_properties: Map<String, Value>,
}

/// A declared type, either a bare URI or an object carrying it under `typeURI`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum TypeEntry {
    Plain(String),
    Structured {
        #[serde(rename = "typeURI", default)]
        type_uri: Option<String>,
    },
    Other(Value),
}

impl TypeEntry {
    pub fn value(&self) -> Option<&str> {
        match self {
            TypeEntry::Plain(uri) => Some(uri),
            TypeEntry::Structured { type_uri } => type_uri.as_deref(),
            TypeEntry::Other(_) => None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct FileTypes {
    #[serde(default, deserialize_with = "lenient")]
    pub input: Vec<FileTypeEntry>,
    #[serde(default, deserialize_with = "lenient")]
    pub output: Vec<FileTypeEntry>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum FileTypeEntry {
    Declared {
        #[serde(default)]
        extension: Option<String>,
    },
    Other(Value),
}

impl FileTypeEntry {
    pub fn extension(&self) -> Option<&str> {
        match self {
            FileTypeEntry::Declared { extension } => extension.as_deref(),
            FileTypeEntry::Other(_) => None,
        }
    }
}

impl ToolRecord {
    pub fn label(&self) -> &str {
        self.property_str(TOOL_LABEL_PROPERTY)
    }

    pub fn description(&self) -> &str {
        self.property_str(TOOL_DESCRIPTION_PROPERTY)
    }

    fn property_str(&self, key: &str) -> &str {
        self.tool_properties
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn declared_types(&self) -> impl Iterator<Item = &str> {
        self.type_uri.iter().filter_map(TypeEntry::value)
    }

    pub fn input_extensions(&self) -> impl Iterator<Item = &str> {
        self.file_types
            .input
            .iter()
            .filter_map(FileTypeEntry::extension)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
