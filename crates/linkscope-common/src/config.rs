//! Analysis options.
//!
//! Read from `linkscope.json` by the command line driver (or handed over by an
//! embedding editor integration). Every field has a default, so an empty
//! object is a valid configuration:
//!
//! ```json
//! {
//!   "positionShift": { "line": 1, "column": 1 },
//!   "wrapperName": "dummy_wrapper",
//!   "extraBuiltins": ["myHelper"],
//!   "runtimeCheck": { "enabled": true, "command": "linx", "args": [], "timeoutMs": 3000 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::limits::DEFAULT_RUNTIME_CHECK_TIMEOUT_MS;

/// Name of the synthetic function the parser wraps every document in.
pub const DEFAULT_WRAPPER_NAME: &str = "dummy_wrapper";

/// Default configuration file name looked up by the driver.
pub const CONFIG_FILE_NAME: &str = "linkscope.json";

/// Offset between parser-native and editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionShiftConfig {
    /// Lines added in front of the document by the wrapper.
    pub line: u32,
    /// Column origin of the parser (1 for 1-based columns).
    pub column: u32,
}

impl Default for PositionShiftConfig {
    fn default() -> Self {
        PositionShiftConfig { line: 1, column: 1 }
    }
}

/// Options for the best-effort runtime check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeCheckOptions {
    pub enabled: bool,
    /// Interpreter executable.
    pub command: String,
    /// Arguments placed before the document path.
    pub args: Vec<String>,
    /// Hard wall-clock cap for one run.
    pub timeout_ms: u64,
}

impl Default for RuntimeCheckOptions {
    fn default() -> Self {
        RuntimeCheckOptions {
            enabled: false,
            command: "linx".to_string(),
            args: Vec::new(),
            timeout_ms: DEFAULT_RUNTIME_CHECK_TIMEOUT_MS,
        }
    }
}

/// Options for one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisOptions {
    pub position_shift: PositionShiftConfig,
    pub wrapper_name: String,
    /// Names treated as defined in addition to the built-in catalogue.
    pub extra_builtins: Vec<String>,
    pub runtime_check: RuntimeCheckOptions,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            position_shift: PositionShiftConfig::default(),
            wrapper_name: DEFAULT_WRAPPER_NAME.to_string(),
            extra_builtins: Vec::new(),
            runtime_check: RuntimeCheckOptions::default(),
        }
    }
}

impl AnalysisOptions {
    /// Parse options from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn is_extra_builtin(&self, name: &str) -> bool {
        self.extra_builtins.iter().any(|b| b == name)
    }
}
