use super::record::{ToolRecord, TOOL_DESCRIPTION_PROPERTY, TOOL_LABEL_PROPERTY};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const TOOL_URI_KEY: &str = "toolURI";
pub const TYPE_URI_KEY: &str = "typeURI";

/// How a record is compared against a lookup value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    ByIdentifier,
    ByDeclaredType,
    ByInputExtension,
}

impl MatchKind {
    /// Maps a batch search criteria key to its match kind.
    /// Input extension lookups are only reachable through the tools API.
    pub fn from_criteria_key(key: &str) -> Option<Self> {
        match key {
            TOOL_URI_KEY => Some(MatchKind::ByIdentifier),
            TYPE_URI_KEY => Some(MatchKind::ByDeclaredType),
            _ => None,
        }
    }

    pub fn summary_key(&self) -> &'static str {
        match self {
            MatchKind::ByIdentifier | MatchKind::ByInputExtension => TOOL_URI_KEY,
            MatchKind::ByDeclaredType => TYPE_URI_KEY,
        }
    }
}

/// Compact description of a matched tool.
///
/// Serialized as `{<key>: <value>, "toolLabel": .., "toolDescription": ..}`
/// where `<key>` is the key the tool was matched by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSummary {
    pub key: &'static str,
    pub value: String,
    pub label: String,
    pub description: String,
}

impl ToolSummary {
    fn from_record(key: &'static str, value: String, record: &ToolRecord) -> Self {
        Self {
            key,
            value,
            label: record.label().to_owned(),
            description: record.description().to_owned(),
        }
    }
}

impl Serialize for ToolSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.key, &self.value)?;
        map.serialize_entry(TOOL_LABEL_PROPERTY, &self.label)?;
        map.serialize_entry(TOOL_DESCRIPTION_PROPERTY, &self.description)?;
        map.end()
    }
}

/// Lower-cases an extension and strips one leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    match lower.strip_prefix('.') {
        Some(stripped) => stripped.to_owned(),
        None => lower,
    }
}

pub fn matches(record: &ToolRecord, kind: MatchKind, value: &str) -> bool {
    match kind {
        MatchKind::ByIdentifier => record.tool_uri.as_deref() == Some(value),
        MatchKind::ByDeclaredType => record.declared_types().any(|t| t == value),
        MatchKind::ByInputExtension => {
            let wanted = normalize_extension(value);
            record
                .input_extensions()
                .any(|ext| normalize_extension(ext) == wanted)
        }
    }
}

/// Returns the summary of `record` if it matches.
///
/// Extension matches are reported by `toolURI`, so a record without one,
/// or with an empty one, never matches by extension.
pub fn match_record(record: &ToolRecord, kind: MatchKind, value: &str) -> Option<ToolSummary> {
    if !matches(record, kind, value) {
        return None;
    }
    let summary_value = match kind {
        MatchKind::ByIdentifier | MatchKind::ByDeclaredType => value.to_owned(),
        MatchKind::ByInputExtension => listed_uri(record)?.to_owned(),
    };
    Some(ToolSummary::from_record(
        kind.summary_key(),
        summary_value,
        record,
    ))
}

pub fn find_first<I>(records: I, kind: MatchKind, value: &str) -> Option<ToolSummary>
where
    I: IntoIterator<Item = ToolRecord>,
{
    records
        .into_iter()
        .find_map(|record| match_record(&record, kind, value))
}

pub fn find_all<I>(records: I, kind: MatchKind, value: &str) -> Vec<ToolSummary>
where
    I: IntoIterator<Item = ToolRecord>,
{
    records
        .into_iter()
        .filter_map(|record| match_record(&record, kind, value))
        .collect()
}

/// The `toolURI` of a record, if it has a non-empty one.
fn listed_uri(record: &ToolRecord) -> Option<&str> {
    record.tool_uri.as_deref().filter(|uri| !uri.is_empty())
}

/// Summaries of every record carrying a non-empty `toolURI`.
pub fn list_tools<I>(records: I) -> Vec<ToolSummary>
where
    I: IntoIterator<Item = ToolRecord>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let uri = listed_uri(&record)?.to_owned();
            Some(ToolSummary::from_record(TOOL_URI_KEY, uri, &record))
        })
        .collect()
}
