// src/render.rs
use crate::out_models::{ReportDocument, Section};

pub fn render_report_markdown(doc: &ReportDocument) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", doc.title.trim()));

    if !doc.brief_summary.trim().is_empty() {
        md.push_str(&format!("> {}\n\n", doc.brief_summary.trim()));
    }

    for section in &doc.sections {
        match section {
            Section::Text(t) => {
                // the document title owns level 1
                let depth = (t.level as usize + 1).clamp(2, 6);
                md.push_str(&format!("{} {}\n\n", "#".repeat(depth), t.title.trim()));
                md.push_str(&format!("{}\n\n", t.content.trim()));
                if !t.keywords.is_empty() {
                    md.push_str(&format!("_{}_\n\n", t.keywords.join(", ")));
                }
            }
            Section::Visualization(v) => {
                md.push_str(&format!("### 📊 {}\n\n", v.title.trim()));
                md.push_str(&format!("- kind: {}\n", v.visualization_type.as_str()));
                if !v.insight.trim().is_empty() {
                    md.push_str(&format!("- insight: {}\n", v.insight.trim()));
                }
                if !v.user_benefit.trim().is_empty() {
                    md.push_str(&format!("- benefit: {}\n", v.user_benefit.trim()));
                }
                if let Some(err) = &v.error {
                    md.push_str(&format!("- ⚠️ {}\n", err));
                }
                md.push('\n');
                let payload = serde_json::to_string_pretty(&v.data).unwrap_or_else(|_| "{}".to_string());
                md.push_str(&format!("```json\n{}\n```\n\n", payload));
            }
            Section::Malformed { id, raw } => {
                md.push_str(&format!("<!-- unreadable section {} -->\n{}\n\n", id, raw));
            }
        }
    }

    md.push_str(&format!(
        "---\n{} sections · {} text · {} visualizations\n",
        doc.stats.total_sections, doc.stats.text_sections, doc.stats.visual_sections
    ));
    md
}
