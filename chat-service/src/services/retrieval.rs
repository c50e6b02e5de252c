//! Keyword-matched context retrieval over the places dataset.
//!
//! No embeddings and no index: per request, every place is scored by
//! token containment and the best few become prompt context. Scoring
//! and selection are pure functions over the loaded dataset.

use crate::models::chat::{ContextMeta, ContextSnippet};
use crate::models::place::PlaceRecord;

/// Lowercase the query and split it into tokens on every
/// non-alphanumeric boundary. Works on Cyrillic and Kazakh letters,
/// not just ASCII.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Additive containment score of one place against the query tokens.
///
/// Weights: name 3, desc 2, tags 2, century 1 per token, plus a flat 4
/// when some token equals the category exactly. No normalization by
/// field or query length.
pub fn score_place(tokens: &[String], place: &PlaceRecord) -> u32 {
    let name = place.name.as_deref().unwrap_or("").to_lowercase();
    let desc = place.desc.as_deref().unwrap_or("").to_lowercase();
    let tags = place.tags.join(" ").to_lowercase();
    let century = place.century.as_deref().unwrap_or("");

    let mut score = 0;
    for token in tokens {
        if name.contains(token.as_str()) {
            score += 3;
        }
        if desc.contains(token.as_str()) {
            score += 2;
        }
        if tags.contains(token.as_str()) {
            score += 2;
        }
        if century.contains(token.as_str()) {
            score += 1;
        }
    }

    let cat = place.cat.as_deref().unwrap_or("").to_lowercase();
    if tokens.iter().any(|t| *t == cat) {
        score += 4;
    }

    score
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredPlace<'a> {
    pub place: &'a PlaceRecord,
    pub score: u32,
}

#[derive(Debug)]
pub struct Selection<'a> {
    pub chosen: Vec<ScoredPlace<'a>>,
    /// True when nothing scored positive and the top of the sorted
    /// dataset was kept anyway.
    pub used_fallback: bool,
}

/// Score the whole dataset and pick at most `top_k` context candidates.
///
/// Sort is descending by score and stable, so ties keep dataset order.
/// Positive scorers win; with none and a nonempty dataset the first
/// `top_k` of the sorted list are kept regardless of score.
pub fn select_contexts<'a>(
    places: &'a [PlaceRecord],
    tokens: &[String],
    top_k: usize,
) -> Selection<'a> {
    let mut scored: Vec<ScoredPlace<'a>> = places
        .iter()
        .map(|place| ScoredPlace {
            place,
            score: score_place(tokens, place),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let chosen: Vec<ScoredPlace<'a>> = scored
        .iter()
        .copied()
        .filter(|s| s.score > 0)
        .take(top_k)
        .collect();

    if chosen.is_empty() && !scored.is_empty() {
        return Selection {
            chosen: scored.into_iter().take(top_k).collect(),
            used_fallback: true,
        };
    }

    Selection {
        chosen,
        used_fallback: false,
    }
}

/// Render chosen candidates into response/prompt snippets.
///
/// The text template is part of the observable contract: it is
/// embedded verbatim in the outbound prompt.
pub fn render_snippets(chosen: &[ScoredPlace]) -> Vec<ContextSnippet> {
    chosen
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let place = scored.place;
            let text = format!(
                "{}\n{}\nКатегория: {} • Ғасыр: {}",
                place.name.as_deref().unwrap_or(""),
                place.desc.as_deref().unwrap_or(""),
                or_dash(&place.cat),
                or_dash(&place.century),
            );

            ContextSnippet {
                id: place
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("idx-{}", i)),
                score: scored.score,
                meta: ContextMeta {
                    name: place.name.clone(),
                    cat: place.cat.clone(),
                    century: place.century.clone(),
                    source: place.source.clone(),
                },
                text,
            }
        })
        .collect()
}

fn or_dash(field: &Option<String>) -> &str {
    match field.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => "—",
    }
}
