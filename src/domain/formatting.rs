//! Google Docs formatting request payloads.
//!
//! Builds the `batchUpdate` request bodies that apply page margins, line
//! spacing and a running header to a pushed document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Segment placeholder for the header created in the same batch.
pub const HEADER_SEGMENT_PLACEHOLDER: &str = "{header}";

/// Formatting applied after a push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Page margin on every side, in points.
    #[serde(default = "default_margin_pt")]
    pub margin_pt: f64,

    /// Line spacing as a percentage (100 = single).
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f64,

    /// Text for the default page header.
    #[serde(default)]
    pub header: Option<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            margin_pt: default_margin_pt(),
            line_spacing: default_line_spacing(),
            header: None,
        }
    }
}

const fn default_margin_pt() -> f64 {
    72.0 // one inch
}

const fn default_line_spacing() -> f64 {
    115.0
}

fn dimension(magnitude: f64) -> Value {
    json!({ "magnitude": magnitude, "unit": "PT" })
}

/// Build the request list for a document whose body ends at `body_end_index`.
#[must_use]
pub fn build_formatting_requests(options: &FormatOptions, body_end_index: u64) -> Vec<Value> {
    let margin = dimension(options.margin_pt);

    let mut requests = vec![json!({
        "updateDocumentStyle": {
            "documentStyle": {
                "marginTop": margin,
                "marginBottom": margin,
                "marginLeft": margin,
                "marginRight": margin,
            },
            "fields": "marginTop,marginBottom,marginLeft,marginRight",
        }
    })];

    // Index 1 is the first character of the body.
    if body_end_index > 1 {
        requests.push(json!({
            "updateParagraphStyle": {
                "range": { "startIndex": 1, "endIndex": body_end_index },
                "paragraphStyle": { "lineSpacing": options.line_spacing },
                "fields": "lineSpacing",
            }
        }));
    }

    if let Some(header) = options.header.as_deref().filter(|h| !h.is_empty()) {
        requests.push(json!({ "createHeader": { "type": "DEFAULT" } }));
        requests.push(json!({
            "insertText": {
                "location": { "segmentId": HEADER_SEGMENT_PLACEHOLDER, "index": 0 },
                "text": header,
            }
        }));
    }

    requests
}
