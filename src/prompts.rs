use crate::llm::Prompt;
use crate::models::VisualizationRequest;
use crate::settings::AnalysisPromptVariant;

const SUMMARY_SYSTEM: &str = r#"You analyse YouTube caption transcripts and write a summary complete enough that a reader understands the video without watching it.

PRINCIPLES:
- Completeness: cover every important point of the video.
- Structure: organise the material in a logical reading order.
- Context: explain background, prerequisites and related concepts.
- Specificity: prefer concrete examples, figures and facts over abstractions.
- Visualisation-ready: state processes, comparisons and numbers explicitly so they can be charted later.

STRUCTURE:
1. Overview: topic, purpose, core message.
2. Main content: the key concepts in logical order.
3. Details: tips, cautions, recommendations.
4. Key takeaways: the 3-5 most important messages.

CONSTRAINTS:
- At least 800 characters.
- Write in Korean."#;

pub fn summary(transcript: &str) -> Prompt {
    Prompt::new(
        SUMMARY_SYSTEM,
        format!(
            "Write a comprehensive summary of the following YouTube caption transcript:\n\n{}",
            transcript
        ),
    )
}

/// The single follow-up sent when the first summary comes back too short.
pub fn summary_elaboration(transcript: &str, previous: &str) -> Prompt {
    Prompt::new(
        "The previous summary is too brief. Write a more detailed and comprehensive summary. Write in Korean.",
        format!(
            "ORIGINAL CAPTIONS:\n{}\n\nPREVIOUS SUMMARY:\n{}\n\nWrite a more detailed summary.",
            transcript, previous
        ),
    )
}

pub fn visualization_analysis(summary: &str, variant: AnalysisPromptVariant) -> Prompt {
    match variant {
        AnalysisPromptVariant::Detailed => detailed_analysis(summary),
        AnalysisPromptVariant::Compact => compact_analysis(summary),
    }
}

fn detailed_analysis(summary: &str) -> Prompt {
    Prompt::new(
        "You are a data visualisation specialist. Identify the parts of a report that would gain the most from an accurate, attractive visualisation.",
        format!(
            r#"REPORT:
<{summary}>

TASKS:
1. Data: passages with concrete numbers, statistics or comparisons come first.
2. Structure: passages with clear processes, relationships or hierarchies.
3. Visual potential: content that reads well as a chart, graph or diagram.
4. Source text: copy the complete paragraph(s) the visualisation is about.

WHAT TO LOOK FOR:
- data: numeric comparisons, trends, ratios, distributions ("sales rose 30%").
- network: links between concepts, influence, composition ("A affects B").
- process: ordered steps, decision branches ("step 1 → step 2 → step 3").
- structure: classifications and components ("three kinds of ...").
- timeline: dated events in order.

RULES FOR related_content:
- Copy it verbatim from the report; do not paraphrase or add facts.
- Only complete sentences; never cut a sentence in half.
- At least 150 characters.

Output JSON only:
{{
  "visualization_requests": [
    {{
      "purpose": "data|network|process|structure|comparison|timeline",
      "content_description": "what the visualisation should show and why",
      "related_content": "verbatim paragraph(s) from the report, 150+ characters",
      "visualization_type": "chart|network|flow|table|timeline",
      "data_quality": "high|medium|low",
      "expected_impact": "what the reader gains from it"
    }}
  ]
}}"#,
            summary = summary
        ),
    )
}

fn compact_analysis(summary: &str) -> Prompt {
    Prompt::new(
        "You pick the passages of a report that deserve a chart, diagram or table.",
        format!(
            r#"REPORT:
<{summary}>

For every passage with data, structure, comparison, process or timeline content, return one request.
"source_excerpt" must be copied verbatim from the report (complete sentences, 100+ characters).

Output JSON only:
{{
  "visualization_requests": [
    {{"purpose": "data|network|process|structure|comparison|timeline", "description": "what to visualise", "source_excerpt": "verbatim text"}}
  ]
}}"#,
            summary = summary
        ),
    )
}

const GENERATION_SYSTEM: &str = r#"You build one precise visualisation from a tagged request and its source text.

AVAILABLE TYPES:
- chartjs: comparisons, trends, ratios
- plotly: mathematical or scientific plots, dense data
- table: structured facts, comparison tables
- visjs: relationships, hierarchies, grouped nodes
- reactflow: processes, decision flows, mind maps, flowcharts, taxonomies
- d3js: timelines, historical events

RULES:
- Use only facts stated in the source text or the caption context. Never invent data.
- Match the requested purpose.
- Labels and titles in Korean.
- Output exactly one JSON object in one of the shapes below and nothing else."#;

const GENERATION_SHAPES: &str = r##"SHAPES:
1. {"type": "chartjs", "chart_type": "bar|line|pie|radar|scatter", "title": "...", "config": {"type": "bar", "data": {"labels": ["..."], "datasets": [{"label": "...", "data": [10, 20]}]}, "options": {"responsive": true, "maintainAspectRatio": false}}, "insight": "..."}
2. {"type": "plotly", "chart_type": "function|scatter|heatmap|3d|line|pie|bubble|histogram", "title": "...", "config": {"data": [{"x": [1, 2], "y": [3, 4], "type": "scatter", "mode": "lines+markers"}], "layout": {"title": "...", "xaxis": {"title": "..."}, "yaxis": {"title": "..."}}}, "insight": "..."}
3. {"type": "table", "title": "...", "data": {"headers": ["..."], "rows": [["..."]]}, "insight": "..."}
4. {"type": "visjs", "network_type": "network|hierarchy|cluster", "title": "...", "config": {"nodes": [{"id": 1, "label": "...", "group": "main"}], "edges": [{"from": 1, "to": 2, "label": "..."}], "options": {"physics": {"stabilization": false}}}, "insight": "..."}
5. {"type": "reactflow", "flow_type": "flowchart|mindmap|process|decision", "title": "...", "config": {"nodes": [{"id": "1", "type": "input", "data": {"label": "..."}, "position": {"x": 100, "y": 100}}], "edges": [{"id": "e1-2", "source": "1", "target": "2", "label": "..."}]}, "insight": "..."}
6. {"type": "d3js", "chart_type": "timeline|gantt|calendar|tree", "title": "...", "config": {"data": [{"date": "2020-01-01", "event": "...", "category": "..."}], "options": {"timeFormat": "%Y-%m-%d"}}, "insight": "..."}
7. {"type": "creative", "method": "...", "description": "...", "insight": "..."}"##;

pub fn visualization_generation(req: &VisualizationRequest, transcript_context: &str) -> Prompt {
    Prompt::new(
        GENERATION_SYSTEM,
        format!(
            "REQUEST:\n- purpose: {purpose}\n- description: {description}\n\nSOURCE TEXT (use only this):\n<{excerpt}>\n\nCAPTION CONTEXT (reference only):\n<{context}>\n\n{shapes}",
            purpose = req.purpose,
            description = req.description,
            excerpt = req.source_excerpt,
            context = transcript_context,
            shapes = GENERATION_SHAPES
        ),
    )
}

pub fn structure_sections(summary: &str) -> Prompt {
    Prompt::new(
        r#"Split the given summary into logical sections.

PRINCIPLES:
- One topic or concept per section.
- Clear, specific section titles.
- Sections follow each other naturally.
- Avoid very short or very long sections (ideal: 100-300 characters).
- Keep the original wording and language.

Output JSON only:
{"sections": [{"id": "section_1", "title": "...", "type": "text", "content": "...", "level": 1, "keywords": ["..."]}]}"#,
        summary.to_string(),
    )
}
