//! Shared constants for end-to-end tests
//!
//! When the fixture tool records change, update only this file and
//! `fixtures.rs`.

// ============================================================================
// Test Tool Records
// ============================================================================

/// First tool in catalog order, accepts `csv` input
pub const TOOL_X_URI: &str = "edc:tool.X";
pub const TOOL_X_LABEL: &str = "A";
pub const TOOL_X_DESCRIPTION: &str = "B";
pub const TOOL_X_TYPE_URI: &str = "edc:fil.X";

/// Declares its types as objects, accepts `.TSV` input
pub const TOOL_Y_URI: &str = "edc:tool.Y";
pub const TOOL_Y_LABEL: &str = "Tool Y";
pub const TOOL_Y_TYPE_URI: &str = "edc:fil.Y";

/// Has no `toolProperties`, accepts `CSV` input
pub const TOOL_Z_URI: &str = "edc:tool.Z";

/// Declared by both tool Y and tool Z, Y comes first
pub const SHARED_TYPE_URI: &str = "edc:fil.shared";

/// Declared only by a record without `toolURI`
pub const ORPHAN_TYPE_URI: &str = "edc:fil.orphan";

/// Number of records with a non-empty `toolURI`
pub const LISTED_TOOLS_COUNT: usize = 3;

pub const MISSING_TOOL_URI: &str = "edc:tool.nonexistent";

// ============================================================================
// Timeouts and Configuration
// ============================================================================

/// Default HTTP request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Server startup timeout in milliseconds
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server ready
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// How long to wait for a search job to reach a status
pub const JOB_WAIT_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for a search job
pub const JOB_POLL_INTERVAL_MS: u64 = 20;
