//! Strip conversational chatter from generated text, keeping the tree drawing.
//!
//! The heuristics are advisory: [`normalize_or_raw`] falls back to the raw
//! text whenever they leave too little behind.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Glyphs that only appear inside a tree drawing.
pub const TREE_GLYPHS: [char; 4] = ['├', '└', '─', '│'];

static LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:here is|here's|sure, here|certainly, here|the following is|note:|note |```)")
        .expect("lead-in pattern is valid")
});

static META_COMMENTARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"suggested structure|you can adjust this|this is just an example")
        .expect("meta commentary pattern is valid")
});

/// Keep only the lines that look like part of the tree drawing.
///
/// Never fails; the result may be empty.
pub fn normalize(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_structure = false;

    for line in content.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if LEAD_IN.is_match(&lower) || META_COMMENTARY.is_match(&lower) {
            continue;
        }

        let keep = line.contains(TREE_GLYPHS)
            || (!in_structure && looks_like_root_item(trimmed))
            || (in_structure && !trimmed.is_empty());

        if keep {
            kept.push(line);
            in_structure = true;
        }
    }

    kept.join("\n")
}

/// Normalize `raw`, falling back to `raw` itself when fewer than two lines survive.
pub fn normalize_or_raw(raw: &str) -> Cow<'_, str> {
    let cleaned = normalize(raw);
    if cleaned.lines().count() < 2 && !raw.trim().is_empty() {
        tracing::debug!("normalized layout too short, using raw text");
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(cleaned)
    }
}

fn looks_like_root_item(trimmed: &str) -> bool {
    !trimmed.is_empty()
        && !trimmed.chars().any(char::is_whitespace)
        && (trimmed.ends_with('/') || trimmed.contains('.'))
}
