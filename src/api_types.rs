use serde::{Deserialize, Serialize};
use serde_json::Value;

/* Caption service */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCaptionResponse {
    #[serde(default)]
    pub data: Option<ApiCaptionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCaptionData {
    #[serde(default)]
    pub content: Option<String>,
}

impl ApiCaptionResponse {
    pub fn content(self) -> String {
        self.data.and_then(|d| d.content).unwrap_or_default()
    }
}

/* Model envelopes */

/// Request entries stay untyped; the analysis stage reads each one on its own
/// so a single odd entry cannot sink the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiVisualizationRequests {
    #[serde(default)]
    pub visualization_requests: Vec<Value>,
}

/// Section entries stay untyped until the assembler has looked at each one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStructuredSections {
    #[serde(default)]
    pub sections: Vec<Value>,
}
