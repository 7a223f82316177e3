//! Test fixture creation for the tools directory

use super::constants::*;
use anyhow::Result;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

/// Creates a temporary tools directory.
///
/// Files are prefixed so their name order is the catalog order. Besides the
/// three listed tools it holds a record without `toolURI`, one with an
/// empty `toolURI`, a malformed record and a non-JSON file, which readers
/// must skip or tolerate.
pub fn create_test_tools_dir() -> Result<TempDir> {
    let dir = TempDir::new()?;

    let records = [
        (
            "01_tool_x.json",
            json!({
                "toolURI": TOOL_X_URI,
                "typeURI": [TOOL_X_TYPE_URI],
                "fileTypes": {
                    "input": [{"extension": "csv"}],
                    "output": [{"extension": "json"}]
                },
                "toolProperties": {
                    "toolLabel": TOOL_X_LABEL,
                    "toolDescription": TOOL_X_DESCRIPTION
                }
            }),
        ),
        (
            "02_tool_y.json",
            json!({
                "toolURI": TOOL_Y_URI,
                "typeURI": [{"typeURI": TOOL_Y_TYPE_URI}, {"typeURI": SHARED_TYPE_URI}],
                "fileTypes": {"input": [{"extension": ".TSV"}]},
                "toolProperties": {"toolLabel": TOOL_Y_LABEL}
            }),
        ),
        (
            "03_tool_z.json",
            json!({
                "toolURI": TOOL_Z_URI,
                "typeURI": [SHARED_TYPE_URI],
                "fileTypes": {"input": [{"extension": "CSV"}, {"extension": "csv"}]}
            }),
        ),
        (
            "04_orphan.json",
            json!({
                "typeURI": [ORPHAN_TYPE_URI],
                "fileTypes": {"input": [{"extension": "csv"}]},
                "toolProperties": {"toolLabel": "Orphan"}
            }),
        ),
        (
            "05_blank_uri.json",
            json!({
                "toolURI": "",
                "fileTypes": {"input": [{"extension": "csv"}]},
                "toolProperties": {"toolLabel": "Blank"}
            }),
        ),
    ];

    for (name, record) in records {
        fs::write(dir.path().join(name), serde_json::to_string_pretty(&record)?)?;
    }

    fs::write(dir.path().join("00_broken.json"), "{ \"toolURI\": ")?;
    fs::write(dir.path().join("README.txt"), "not a tool")?;

    Ok(dir)
}
