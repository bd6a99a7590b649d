//! Query text compilation for the telemetry remote.
//!
//! Shortcuts compile to the literal table name, with a `limit` stage
//! appended when a row cap is requested. Free-form query text never passes
//! through here; it is forwarded to the remote verbatim.

use std::fmt;

/// Telemetry tables exposed as query shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryTable {
    Exceptions,
    Requests,
    Dependencies,
    Traces,
    PerformanceCounters,
}

impl TelemetryTable {
    /// The table's literal name in the remote's query language.
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryTable::Exceptions => "exceptions",
            TelemetryTable::Requests => "requests",
            TelemetryTable::Dependencies => "dependencies",
            TelemetryTable::Traces => "traces",
            TelemetryTable::PerformanceCounters => "performanceCounters",
        }
    }
}

impl fmt::Display for TelemetryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile a table shortcut into query text.
pub fn compile_shortcut(table: TelemetryTable, top: Option<u32>) -> String {
    match top {
        Some(top) => format!("{} | limit {}", table, top),
        None => table.as_str().to_string(),
    }
}
