use std::collections::HashSet;

use tracing::{debug, info};

/// Importance markers for Korean captions.
pub const IMPORTANCE_KEYWORDS: &[&str] = &[
    "중요", "핵심", "주요", "필수", "결론", "요약", "정리",
    "첫째", "둘째", "셋째", "마지막",
    "장점", "단점", "특징", "방법", "이유", "결과",
    "주의", "팁", "추천", "권장",
    "데이터", "통계", "수치", "비교",
    "정의", "개념", "원리", "이론",
];

const HEAD_UNITS: usize = 10;
const TAIL_UNITS: usize = 10;
const TOP_SCORED: usize = 30;
const SAMPLED: usize = 20;
const TRUNCATION_MARKER: &str = "...";

/// Number of distinct keywords that occur in `unit`.
fn importance(unit: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| unit.contains(*k)).count()
}

/// Compresses `text` to at most `max_chars` characters, keeping the opening,
/// the highest scoring sentences, an even sample of the rest, and the ending.
///
/// Lossy but deterministic for a given input and keyword list. Text already
/// within budget is returned untouched.
pub fn condense(text: &str, max_chars: usize) -> String {
    condense_with(text, max_chars, IMPORTANCE_KEYWORDS)
}

pub fn condense_with(text: &str, max_chars: usize, keywords: &[&str]) -> String {
    let original_len = text.chars().count();
    if original_len <= max_chars {
        return text.to_string();
    }

    info!(
        "Transcript over budget - chars={}, max={}, condensing",
        original_len, max_chars
    );

    let flat = text.replace('\n', " ");
    let units: Vec<&str> = flat
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut scored: Vec<(usize, &str)> = Vec::new();
    let mut regular: Vec<&str> = Vec::new();
    for &u in &units {
        match importance(u, keywords) {
            0 => regular.push(u),
            score => scored.push((score, u)),
        }
    }
    // stable: ties keep original order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let stride = (regular.len() / SAMPLED).max(1);

    let picked = units
        .iter()
        .take(HEAD_UNITS)
        .copied()
        .chain(scored.iter().take(TOP_SCORED).map(|(_, u)| *u))
        .chain(regular.iter().step_by(stride).take(SAMPLED).copied())
        .chain(units.iter().skip(units.len().saturating_sub(TAIL_UNITS)).copied());

    let mut seen = HashSet::new();
    let kept: Vec<&str> = picked.filter(|u| seen.insert(*u)).collect();

    debug!(
        "Condense selection - units={}, scored={}, regular={}, stride={}, kept={}",
        units.len(),
        scored.len(),
        regular.len(),
        stride,
        kept.len()
    );

    let mut out = kept.join(". ");
    if out.chars().count() > max_chars {
        let keep = max_chars.saturating_sub(TRUNCATION_MARKER.chars().count());
        out = out.chars().take(keep).collect();
        out.push_str(TRUNCATION_MARKER);
    }

    info!(
        "Transcript condensed - chars_before={}, chars_after={}",
        original_len,
        out.chars().count()
    );
    out
}
