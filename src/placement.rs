use unicode_normalization::UnicodeNormalization;

use crate::models::{LocationHint, Placement};

const HINT_TOKENS: usize = 5;
const LOCATION_BONUS: u32 = 2;

fn fold(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

fn hint_tokens(content_hint: &str) -> Vec<String> {
    fold(content_hint)
        .split_whitespace()
        .take(HINT_TOKENS)
        .map(str::to_string)
        .collect()
}

/// Picks the paragraph a piece of generated content should follow.
///
/// Score per paragraph: hint tokens (first five words of `content_hint`) found
/// in the paragraph, +2 when the paragraph sits in the tertile named by
/// `location`. Highest score wins, earliest index on ties; index 0 when nothing
/// scores.
pub fn place<S: AsRef<str>>(paragraphs: &[S], content_hint: &str, location: LocationHint) -> Placement {
    let tokens = hint_tokens(content_hint);
    let n = paragraphs.len();

    let mut best = Placement {
        after_paragraph_index: 0,
        relevance_score: 0,
    };

    for (i, p) in paragraphs.iter().enumerate() {
        let text = fold(p.as_ref());
        let mut score = tokens.iter().filter(|t| text.contains(t.as_str())).count() as u32;
        if LocationHint::from_position(i, n) == location {
            score += LOCATION_BONUS;
        }
        if score > best.relevance_score {
            best = Placement {
                after_paragraph_index: i,
                relevance_score: score,
            };
        }
    }

    best
}
