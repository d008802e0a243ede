use crate::models::feature_table::AppliedMethod;
use serde::{Deserialize, Serialize};

/// Name under which gap filling is recorded in a table's applied methods.
pub const GAP_FILL_METHOD: &str = "Gap filling using RT and m/z range";

/// Raw data is only ever looked up in survey (MS1) scans.
pub const GAP_FILL_MS_LEVEL: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapFillConfig {
    /// Appended to the input table name to name the output table.
    pub suffix: String,
    /// Process rows on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GapFillConfig {
    fn default() -> Self {
        Self {
            suffix: "gap-filled".into(),
            parallel: false,
        }
    }
}

impl GapFillConfig {
    pub fn output_name(&self, input_name: &str) -> String {
        format!("{} {}", input_name, self.suffix)
    }

    pub fn applied_method(&self) -> AppliedMethod {
        AppliedMethod {
            description: GAP_FILL_METHOD.into(),
            parameters: serde_json::json!({
                "suffix": self.suffix,
                "parallel": self.parallel,
            }),
        }
    }
}
