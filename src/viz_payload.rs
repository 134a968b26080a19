// src/viz_payload.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical visualization kind understood by the report assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VizKind {
    Chart,
    Network,
    Flow,
    Table,
    Timeline,
    Text,
}

impl VizKind {
    /// Maps a generator `type` tag (or an already canonical kind name) onto a kind.
    /// Unknown tags, including the legacy "diagram" alias, yield `None`.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "chartjs" | "plotly" | "chart" => Some(VizKind::Chart),
            "table" => Some(VizKind::Table),
            "visjs" | "vis.js" | "network" => Some(VizKind::Network),
            "reactflow" | "react flow" | "flow" => Some(VizKind::Flow),
            "d3js" | "d3.js" | "d3" | "timeline" => Some(VizKind::Timeline),
            "creative" | "text" => Some(VizKind::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VizKind::Chart => "chart",
            VizKind::Network => "network",
            VizKind::Flow => "flow",
            VizKind::Table => "table",
            VizKind::Timeline => "timeline",
            VizKind::Text => "text",
        }
    }
}

/// One payload shape per kind. Only the normalizer builds these from untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VizPayload {
    Chart(ChartPayload),
    Network(NetworkPayload),
    Flow(FlowPayload),
    Table(TablePayload),
    Timeline(TimelinePayload),
    Text(TextPayload),
}

impl VizPayload {
    pub fn kind(&self) -> VizKind {
        match self {
            VizPayload::Chart(_) => VizKind::Chart,
            VizPayload::Network(_) => VizKind::Network,
            VizPayload::Flow(_) => VizKind::Flow,
            VizPayload::Table(_) => VizKind::Table,
            VizPayload::Timeline(_) => VizKind::Timeline,
            VizPayload::Text(_) => VizKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartLibrary {
    ChartJs,
    Plotly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub library: ChartLibrary,
    pub chart_type: String,
    /// Library-native config; always carries a `data` entry.
    pub config: Map<String, Value>,
}

/// vis.js accepts numeric or string node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Num(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: NodeId,
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPayload {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeData {
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub data: FlowNodeData,
    pub position: Position,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPayload {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLink {
    pub source: String,
    pub target: String,
}

/// D3 timeline: the dated events as the model emitted them plus the node/link
/// graph the renderer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePayload {
    pub chart_type: String,
    pub events: Vec<Value>,
    pub nodes: Vec<TimelineNode>,
    pub links: Vec<TimelineLink>,
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub method: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tags_map_to_kinds() {
        assert_eq!(VizKind::from_type_tag("chartjs"), Some(VizKind::Chart));
        assert_eq!(VizKind::from_type_tag("plotly"), Some(VizKind::Chart));
        assert_eq!(VizKind::from_type_tag("table"), Some(VizKind::Table));
        assert_eq!(VizKind::from_type_tag("visjs"), Some(VizKind::Network));
        assert_eq!(VizKind::from_type_tag("reactflow"), Some(VizKind::Flow));
        assert_eq!(VizKind::from_type_tag("d3js"), Some(VizKind::Timeline));
        assert_eq!(VizKind::from_type_tag("creative"), Some(VizKind::Text));
        assert_eq!(VizKind::from_type_tag("Network"), Some(VizKind::Network));
        assert_eq!(VizKind::from_type_tag("diagram"), None);
    }

    #[test]
    fn payload_serializes_with_kind_tag() {
        let p = VizPayload::Table(TablePayload {
            headers: vec!["a".into()],
            rows: vec![vec![json!(1)]],
        });
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["kind"], "table");
        assert_eq!(v["headers"], json!(["a"]));
        let back: VizPayload = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);
    }
}
