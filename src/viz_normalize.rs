// src/viz_normalize.rs
use anyhow::{anyhow, bail, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::viz_payload::{
    ChartLibrary, ChartPayload, FlowEdge, FlowNode, FlowNodeData, FlowPayload, NetworkEdge,
    NetworkNode, NetworkPayload, NodeId, Position, TablePayload, TextPayload, TimelineLink,
    TimelineNode, TimelinePayload, VizKind, VizPayload,
};

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Maps a raw generator payload onto the canonical payload for `declared`.
///
/// `declared` may be a generator tag (`chartjs`, `visjs`, ...) or a canonical kind
/// name. Anything unrecognised is treated as a legacy diagram and rebuilt as a
/// network. Never fails: a payload that cannot be read becomes the kind's
/// placeholder.
pub fn normalize(raw: &Value, declared: &str) -> VizPayload {
    let (kind, legacy) = match VizKind::from_type_tag(declared) {
        Some(k) => (k, false),
        None => {
            debug!("Unknown visualization kind '{}' - remapping to network", declared);
            (VizKind::Network, true)
        }
    };

    match try_normalize(raw, declared, kind, legacy) {
        Ok(p) => p,
        Err(e) => {
            warn!(
                "Visualization normalization failed - kind={}, error={}, using placeholder",
                kind.as_str(),
                e
            );
            placeholder(kind, declared, legacy)
        }
    }
}

fn try_normalize(raw: &Value, declared: &str, kind: VizKind, legacy: bool) -> Result<VizPayload> {
    let obj = raw
        .as_object()
        .ok_or_else(|| anyhow!("payload is not a JSON object"))?;

    Ok(match kind {
        VizKind::Chart => VizPayload::Chart(normalize_chart(obj, declared)?),
        VizKind::Network => VizPayload::Network(normalize_network(obj, legacy)?),
        VizKind::Flow => VizPayload::Flow(normalize_flow(obj)?),
        VizKind::Table => VizPayload::Table(normalize_table(obj)?),
        VizKind::Timeline => VizPayload::Timeline(normalize_timeline(obj)?),
        VizKind::Text => VizPayload::Text(TextPayload {
            method: str_field(obj, "method").unwrap_or_default(),
            description: str_field(obj, "description").unwrap_or_default(),
        }),
    })
}

/// Minimal structurally valid payload per kind.
pub fn placeholder(kind: VizKind, declared: &str, legacy: bool) -> VizPayload {
    match kind {
        VizKind::Chart => VizPayload::Chart(ChartPayload {
            library: library_for(declared, None),
            chart_type: "bar".into(),
            config: default_chart_config(library_for(declared, None)),
        }),
        VizKind::Network => VizPayload::Network(NetworkPayload {
            nodes: numbered_network_nodes(if legacy { 3 } else { 2 }),
            edges: chain_network_edges(if legacy { 3 } else { 2 }),
            options: Map::new(),
        }),
        VizKind::Flow => VizPayload::Flow(placeholder_flow(Map::new())),
        VizKind::Table => VizPayload::Table(TablePayload {
            headers: Vec::new(),
            rows: Vec::new(),
        }),
        VizKind::Timeline => {
            let nodes = placeholder_timeline_nodes(2);
            let links = chain_timeline_links(&nodes);
            VizPayload::Timeline(TimelinePayload {
                chart_type: "timeline".into(),
                events: Vec::new(),
                nodes,
                links,
                options: Map::new(),
            })
        }
        VizKind::Text => VizPayload::Text(TextPayload {
            method: String::new(),
            description: String::new(),
        }),
    }
}

/* -------------------------------------------------------------------------- */
/* Field lookup                                                               */
/* -------------------------------------------------------------------------- */

/// Generator schemas disagree on nesting: fields may sit under `config`, under
/// an object-valued `data`, or at the top level. Checked in that order.
fn nested<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    for container in ["config", "data"] {
        if let Some(v) = obj
            .get(container)
            .and_then(Value::as_object)
            .and_then(|c| c.get(name))
        {
            if !v.is_null() {
                return Some(v);
            }
        }
    }
    obj.get(name).filter(|v| !v.is_null())
}

fn str_field(obj: &Map<String, Value>, name: &str) -> Option<String> {
    obj.get(name).and_then(Value::as_str).map(str::to_string)
}

fn array_of<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Result<Vec<&'a Value>> {
    for name in names {
        match nested(obj, name) {
            Some(Value::Array(items)) => return Ok(items.iter().collect()),
            Some(other) => bail!("'{}' is not an array (found {})", name, type_name(other)),
            None => {}
        }
    }
    Ok(Vec::new())
}

fn object_or_empty(v: Option<&Value>) -> Map<String, Value> {
    v.and_then(Value::as_object).cloned().unwrap_or_default()
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(v: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    v.as_object()
        .ok_or_else(|| anyhow!("{} is not an object (found {})", what, type_name(v)))
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn label_of(obj: &Map<String, Value>) -> Option<String> {
    ["label", "name", "title", "event"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/* -------------------------------------------------------------------------- */
/* Chart / table                                                              */
/* -------------------------------------------------------------------------- */

fn library_for(declared: &str, explicit: Option<&str>) -> ChartLibrary {
    let tag = explicit.unwrap_or(declared).to_ascii_lowercase();
    if tag == "plotly" {
        ChartLibrary::Plotly
    } else {
        ChartLibrary::ChartJs
    }
}

fn default_chart_config(library: ChartLibrary) -> Map<String, Value> {
    let mut config = Map::new();
    config.insert("data".into(), default_chart_data(library));
    config
}

fn default_chart_data(library: ChartLibrary) -> Value {
    match library {
        ChartLibrary::ChartJs => json!({ "labels": [], "datasets": [] }),
        ChartLibrary::Plotly => json!([]),
    }
}

fn normalize_chart(obj: &Map<String, Value>, declared: &str) -> Result<ChartPayload> {
    let library = library_for(declared, obj.get("library").and_then(Value::as_str));

    let mut config = match obj.get("config") {
        Some(Value::Object(c)) => c.clone(),
        Some(Value::Null) | None => {
            // flat schema: data/options at the top level
            let mut c = Map::new();
            if let Some(d) = obj.get("data").filter(|d| !d.is_null()) {
                c.insert("data".into(), d.clone());
            }
            if let Some(o) = obj.get("options").filter(|o| o.is_object()) {
                c.insert("options".into(), o.clone());
            }
            c
        }
        Some(other) => bail!("chart config is not an object (found {})", type_name(other)),
    };

    if config.get("data").map_or(true, Value::is_null) {
        config.insert("data".into(), default_chart_data(library));
    }

    let chart_type = str_field(obj, "chart_type")
        .or_else(|| config.get("type").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "bar".to_string());

    Ok(ChartPayload {
        library,
        chart_type,
        config,
    })
}

fn normalize_table(obj: &Map<String, Value>) -> Result<TablePayload> {
    let headers = array_of(obj, &["headers"])?
        .into_iter()
        .map(|h| scalar_to_string(h).unwrap_or_else(|| h.to_string()))
        .collect();

    let rows = array_of(obj, &["rows"])?
        .into_iter()
        .map(|r| match r {
            Value::Array(cells) => Ok(cells.clone()),
            other => Err(anyhow!("table row is not an array (found {})", type_name(other))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TablePayload { headers, rows })
}

/* -------------------------------------------------------------------------- */
/* Network                                                                    */
/* -------------------------------------------------------------------------- */

/// Synthetic ids are hashed from the node's own JSON so re-normalizing the same
/// node produces the same id. Kept under 2^53 for JavaScript consumers.
fn synthetic_node_id(node: &Map<String, Value>) -> NodeId {
    let seed = Value::Object(node.clone()).to_string();
    NodeId::Num((xxh3_64(seed.as_bytes()) >> 11) as i64)
}

fn node_id_of(v: &Value) -> Option<NodeId> {
    match v {
        Value::Number(n) => n.as_i64().map(NodeId::Num),
        Value::String(s) if !s.trim().is_empty() => Some(NodeId::Text(s.clone())),
        _ => None,
    }
}

fn numbered_network_nodes(n: usize) -> Vec<NetworkNode> {
    (0..n)
        .map(|i| NetworkNode {
            id: NodeId::Num(i as i64 + 1),
            label: format!("node {}", i + 1),
            extra: Map::new(),
        })
        .collect()
}

fn chain_network_edges(n: usize) -> Vec<NetworkEdge> {
    (1..n)
        .map(|i| NetworkEdge {
            from: NodeId::Num(i as i64),
            to: NodeId::Num(i as i64 + 1),
            extra: Map::new(),
        })
        .collect()
}

fn normalize_network(obj: &Map<String, Value>, legacy: bool) -> Result<NetworkPayload> {
    let raw_nodes = array_of(obj, &["nodes"])?;
    let raw_edges = array_of(obj, &["edges", "links"])?;
    let options = object_or_empty(nested(obj, "options"));

    if raw_nodes.is_empty() {
        let n = if legacy { 3 } else { 2 };
        debug!("Network payload without nodes - synthesizing {}-node chain", n);
        return Ok(NetworkPayload {
            nodes: numbered_network_nodes(n),
            edges: chain_network_edges(n),
            options,
        });
    }

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (i, raw) in raw_nodes.into_iter().enumerate() {
        let node = as_object(raw, "network node")?;
        let id = node
            .get("id")
            .and_then(node_id_of)
            .unwrap_or_else(|| synthetic_node_id(node));
        let label = label_of(node).unwrap_or_else(|| format!("node {}", i + 1));
        let mut extra = node.clone();
        extra.remove("id");
        extra.remove("label");
        nodes.push(NetworkNode { id, label, extra });
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for raw in raw_edges {
        let edge = as_object(raw, "network edge")?;
        let from = edge
            .get("from")
            .or_else(|| edge.get("source"))
            .and_then(node_id_of)
            .ok_or_else(|| anyhow!("network edge without 'from'"))?;
        let to = edge
            .get("to")
            .or_else(|| edge.get("target"))
            .and_then(node_id_of)
            .ok_or_else(|| anyhow!("network edge without 'to'"))?;
        let mut extra = edge.clone();
        for k in ["from", "to", "source", "target"] {
            extra.remove(k);
        }
        edges.push(NetworkEdge { from, to, extra });
    }

    if edges.is_empty() {
        if nodes.len() == 1 {
            nodes.push(NetworkNode {
                id: NodeId::Text("node-2".into()),
                label: "node 2".into(),
                extra: Map::new(),
            });
        }
        edges = nodes
            .windows(2)
            .map(|w| NetworkEdge {
                from: w[0].id.clone(),
                to: w[1].id.clone(),
                extra: Map::new(),
            })
            .collect();
    }

    Ok(NetworkPayload {
        nodes,
        edges,
        options,
    })
}

/* -------------------------------------------------------------------------- */
/* Flow                                                                       */
/* -------------------------------------------------------------------------- */

fn flow_node(
    index: usize,
    id: Option<String>,
    label: Option<String>,
    extra: Map<String, Value>,
) -> FlowNode {
    let offset = index as f64 * 100.0;
    FlowNode {
        id: id.unwrap_or_else(|| (index + 1).to_string()),
        data: FlowNodeData {
            label: label.unwrap_or_else(|| format!("node {}", index + 1)),
            extra: Map::new(),
        },
        position: Position {
            x: offset,
            y: offset,
        },
        extra,
    }
}

fn chain_flow_edges(nodes: &[FlowNode]) -> Vec<FlowEdge> {
    nodes
        .windows(2)
        .map(|w| FlowEdge {
            id: format!("e{}-{}", w[0].id, w[1].id),
            source: w[0].id.clone(),
            target: w[1].id.clone(),
            extra: Map::new(),
        })
        .collect()
}

fn placeholder_flow(options: Map<String, Value>) -> FlowPayload {
    let nodes: Vec<FlowNode> = (0..2).map(|i| flow_node(i, None, None, Map::new())).collect();
    let edges = chain_flow_edges(&nodes);
    FlowPayload {
        nodes,
        edges,
        options,
    }
}

fn position_of(v: Option<&Value>) -> Option<Position> {
    let p = v?.as_object()?;
    Some(Position {
        x: p.get("x")?.as_f64()?,
        y: p.get("y")?.as_f64()?,
    })
}

fn normalize_flow(obj: &Map<String, Value>) -> Result<FlowPayload> {
    let raw_nodes = array_of(obj, &["nodes"])?;
    let raw_edges = array_of(obj, &["edges"])?;
    let options = object_or_empty(nested(obj, "options"));

    if raw_nodes.is_empty() {
        debug!("Flow payload without nodes - synthesizing placeholder");
        return Ok(placeholder_flow(options));
    }

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (i, raw) in raw_nodes.into_iter().enumerate() {
        let node = as_object(raw, "flow node")?;
        let id = node.get("id").and_then(scalar_to_string);
        let data = object_or_empty(node.get("data"));
        let label = data
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| label_of(node));

        let mut extra = node.clone();
        for k in ["id", "data", "position", "label"] {
            extra.remove(k);
        }
        let mut built = flow_node(i, id, label, extra);
        let mut data_extra = data;
        data_extra.remove("label");
        built.data.extra = data_extra;
        if let Some(p) = position_of(node.get("position")) {
            built.position = p;
        }
        nodes.push(built);
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for raw in raw_edges {
        let edge = as_object(raw, "flow edge")?;
        let source = edge
            .get("source")
            .or_else(|| edge.get("from"))
            .and_then(scalar_to_string)
            .ok_or_else(|| anyhow!("flow edge without 'source'"))?;
        let target = edge
            .get("target")
            .or_else(|| edge.get("to"))
            .and_then(scalar_to_string)
            .ok_or_else(|| anyhow!("flow edge without 'target'"))?;
        let id = edge
            .get("id")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| format!("e{}-{}", source, target));
        let mut extra = edge.clone();
        for k in ["id", "source", "target", "from", "to"] {
            extra.remove(k);
        }
        edges.push(FlowEdge {
            id,
            source,
            target,
            extra,
        });
    }

    if edges.is_empty() {
        if nodes.len() == 1 {
            nodes.push(flow_node(1, Some("node-2".into()), None, Map::new()));
        }
        edges = chain_flow_edges(&nodes);
    }

    Ok(FlowPayload {
        nodes,
        edges,
        options,
    })
}

/* -------------------------------------------------------------------------- */
/* Timeline                                                                   */
/* -------------------------------------------------------------------------- */

fn placeholder_timeline_nodes(n: usize) -> Vec<TimelineNode> {
    (0..n)
        .map(|i| TimelineNode {
            id: (i + 1).to_string(),
            label: format!("node {}", i + 1),
            date: None,
        })
        .collect()
}

fn chain_timeline_links(nodes: &[TimelineNode]) -> Vec<TimelineLink> {
    nodes
        .windows(2)
        .map(|w| TimelineLink {
            source: w[0].id.clone(),
            target: w[1].id.clone(),
        })
        .collect()
}

fn normalize_timeline(obj: &Map<String, Value>) -> Result<TimelinePayload> {
    // d3 generator shape: config.data is the dated event list
    let events: Vec<Value> = match obj.get("config").and_then(Value::as_object) {
        Some(c) => match c.get("data") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        },
        None => Vec::new(),
    };
    let events = if events.is_empty() {
        match obj.get("events") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    } else {
        events
    };

    let raw_nodes = array_of(obj, &["nodes"])?;
    let raw_links = array_of(obj, &["links", "edges"])?;
    let options = object_or_empty(nested(obj, "options"));
    let chart_type = str_field(obj, "chart_type").unwrap_or_else(|| "timeline".to_string());

    let mut nodes = Vec::new();
    for (i, raw) in raw_nodes.into_iter().enumerate() {
        let node = as_object(raw, "timeline node")?;
        nodes.push(TimelineNode {
            id: node
                .get("id")
                .and_then(scalar_to_string)
                .unwrap_or_else(|| (i + 1).to_string()),
            label: label_of(node).unwrap_or_else(|| format!("node {}", i + 1)),
            date: node.get("date").and_then(Value::as_str).map(str::to_string),
        });
    }

    if nodes.is_empty() && !events.is_empty() {
        for (i, raw) in events.iter().enumerate() {
            let event = as_object(raw, "timeline event")?;
            nodes.push(TimelineNode {
                id: (i + 1).to_string(),
                label: label_of(event).unwrap_or_else(|| format!("node {}", i + 1)),
                date: event.get("date").and_then(Value::as_str).map(str::to_string),
            });
        }
    }

    if nodes.is_empty() {
        debug!("Timeline payload without nodes - synthesizing placeholder");
        nodes = placeholder_timeline_nodes(2);
    }

    let mut links = Vec::new();
    for raw in raw_links {
        let link = as_object(raw, "timeline link")?;
        let source = link
            .get("source")
            .or_else(|| link.get("from"))
            .and_then(scalar_to_string)
            .ok_or_else(|| anyhow!("timeline link without 'source'"))?;
        let target = link
            .get("target")
            .or_else(|| link.get("to"))
            .and_then(scalar_to_string)
            .ok_or_else(|| anyhow!("timeline link without 'target'"))?;
        links.push(TimelineLink { source, target });
    }

    if links.is_empty() {
        if nodes.len() == 1 {
            nodes.push(TimelineNode {
                id: "node-2".into(),
                label: "node 2".into(),
                date: None,
            });
        }
        links = chain_timeline_links(&nodes);
    }

    Ok(TimelinePayload {
        chart_type,
        events,
        nodes,
        links,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renormalize(p: &VizPayload, declared: &str) -> VizPayload {
        normalize(&serde_json::to_value(p).unwrap(), declared)
    }

    fn assert_idempotent(raw: Value, declared: &str) {
        let once = normalize(&raw, declared);
        let twice = renormalize(&once, declared);
        assert_eq!(once, twice, "not idempotent for {} / {}", declared, raw);
    }

    #[test]
    fn network_nodes_get_stable_synthetic_ids() {
        let raw = json!({
            "type": "visjs",
            "config": {
                "nodes": [{"label": "Rust"}, {"id": 7, "label": "Cargo"}],
                "edges": [{"from": 7, "to": 7}]
            }
        });
        let VizPayload::Network(p) = normalize(&raw, "visjs") else {
            panic!("expected network");
        };
        assert_eq!(p.nodes.len(), 2);
        assert!(matches!(p.nodes[0].id, NodeId::Num(_)));
        assert_eq!(p.nodes[1].id, NodeId::Num(7));

        let VizPayload::Network(again) = normalize(&raw, "visjs") else {
            panic!("expected network");
        };
        assert_eq!(p.nodes[0].id, again.nodes[0].id);
    }

    #[test]
    fn network_without_nodes_gets_two_node_placeholder() {
        let VizPayload::Network(p) = normalize(&json!({"type": "visjs"}), "network") else {
            panic!("expected network");
        };
        assert_eq!(p.nodes.len(), 2);
        assert_eq!(p.edges.len(), 1);
    }

    #[test]
    fn legacy_diagram_becomes_three_node_chain() {
        let p = normalize(&json!({"type": "diagram", "title": "x"}), "diagram");
        let VizPayload::Network(n) = p else {
            panic!("expected network");
        };
        assert_eq!(n.nodes.len(), 3);
        assert_eq!(n.edges.len(), 2);
        assert_eq!(n.edges[1].from, NodeId::Num(2));
        assert_eq!(n.edges[1].to, NodeId::Num(3));
    }

    #[test]
    fn flow_nodes_get_positions_and_labels() {
        let raw = json!({
            "type": "reactflow",
            "config": {
                "nodes": [
                    {"id": "a", "data": {"label": "시작"}, "position": {"x": 5, "y": 6}},
                    {"id": "b"},
                    {"type": "output"}
                ],
                "edges": [{"source": "a", "target": "b"}]
            }
        });
        let VizPayload::Flow(p) = normalize(&raw, "reactflow") else {
            panic!("expected flow");
        };
        assert_eq!(p.nodes[0].position, Position { x: 5.0, y: 6.0 });
        assert_eq!(p.nodes[0].data.label, "시작");
        assert_eq!(p.nodes[1].position, Position { x: 100.0, y: 100.0 });
        assert_eq!(p.nodes[1].data.label, "node 2");
        assert_eq!(p.nodes[2].id, "3");
        assert_eq!(p.nodes[2].extra.get("type"), Some(&json!("output")));
        assert_eq!(p.edges[0].id, "ea-b");
    }

    #[test]
    fn timeline_builds_graph_from_events() {
        let raw = json!({
            "type": "d3js",
            "chart_type": "timeline",
            "config": {
                "data": [
                    {"date": "2020-01-01", "event": "출시"},
                    {"date": "2021-06-15", "event": "개정"},
                    {"date": "2023-12-31", "event": "종료"}
                ]
            }
        });
        let VizPayload::Timeline(p) = normalize(&raw, "d3js") else {
            panic!("expected timeline");
        };
        assert_eq!(p.events.len(), 3);
        assert_eq!(p.nodes.len(), 3);
        assert_eq!(p.nodes[0].label, "출시");
        assert_eq!(p.links.len(), 2);
    }

    #[test]
    fn timeline_remaps_edges_to_links() {
        let raw = json!({
            "nodes": [{"id": "a", "label": "A"}, {"id": "b", "label": "B"}],
            "edges": [{"from": "a", "to": "b"}]
        });
        let VizPayload::Timeline(p) = normalize(&raw, "timeline") else {
            panic!("expected timeline");
        };
        assert_eq!(p.links, vec![TimelineLink { source: "a".into(), target: "b".into() }]);
    }

    #[test]
    fn chart_and_table_get_default_containers() {
        let VizPayload::Chart(c) = normalize(&json!({"type": "chartjs", "title": "t"}), "chartjs") else {
            panic!("expected chart");
        };
        assert_eq!(c.config["data"], json!({"labels": [], "datasets": []}));
        assert_eq!(c.library, ChartLibrary::ChartJs);

        let VizPayload::Chart(p) = normalize(&json!({"config": {"data": [{"x": [1]}]}}), "plotly") else {
            panic!("expected chart");
        };
        assert_eq!(p.library, ChartLibrary::Plotly);

        let VizPayload::Table(t) = normalize(&json!({"type": "table", "data": {"headers": ["a", 2]}}), "table") else {
            panic!("expected table");
        };
        assert_eq!(t.headers, vec!["a".to_string(), "2".to_string()]);
        assert!(t.rows.is_empty());
    }

    #[test]
    fn malformed_payload_falls_back_to_placeholder() {
        let p = normalize(&json!({"config": {"nodes": "not a list"}}), "visjs");
        assert_eq!(p, placeholder(VizKind::Network, "visjs", false));

        let p = normalize(&json!("just text"), "reactflow");
        assert_eq!(p, placeholder(VizKind::Flow, "reactflow", false));

        let p = normalize(&json!({"data": {"rows": [1, 2]}}), "table");
        assert_eq!(p, placeholder(VizKind::Table, "table", false));
    }

    #[test]
    fn normalization_is_idempotent_for_every_kind() {
        assert_idempotent(
            json!({"type": "chartjs", "chart_type": "pie", "config": {"type": "pie", "data": {"labels": ["a"], "datasets": [{"data": [1]}]}}}),
            "chartjs",
        );
        assert_idempotent(json!({"config": {"data": [{"x": [1, 2], "y": [3, 4]}]}}), "plotly");
        assert_idempotent(json!({"type": "chartjs"}), "chart");
        assert_idempotent(
            json!({"data": {"headers": ["항목", "값"], "rows": [["a", 1], ["b", 2]]}}),
            "table",
        );
        assert_idempotent(
            json!({"config": {"nodes": [{"label": "A", "group": "main"}, {"id": "b", "label": "B"}], "edges": []}}),
            "visjs",
        );
        assert_idempotent(json!({}), "network");
        assert_idempotent(
            json!({"config": {"nodes": [{"id": "1"}, {"id": "2", "data": {"label": "끝", "color": "red"}}], "edges": []}}),
            "reactflow",
        );
        assert_idempotent(
            json!({"config": {"data": [{"date": "2020", "event": "A"}, {"date": "2021", "event": "B"}]}}),
            "d3js",
        );
        assert_idempotent(json!({"nodes": [{"id": "x"}]}), "timeline");
        assert_idempotent(json!({"method": "그림", "description": "설명"}), "creative");
        assert_idempotent(json!({"type": "diagram"}), "diagram");
        assert_idempotent(json!(42), "visjs");
    }
}
