mod matcher;
mod reader;
mod record;

pub use matcher::{
    find_all, find_first, list_tools, match_record, matches, normalize_extension, MatchKind,
    ToolSummary, TOOL_URI_KEY, TYPE_URI_KEY,
};
pub use reader::{parse_record_file, CatalogError, CatalogReader, DirCatalogReader};
pub use record::{FileTypeEntry, FileTypes, ToolRecord, TypeEntry};
