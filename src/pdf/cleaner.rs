// file: src/pdf/cleaner.rs
// description: publisher boilerplate removal and back-matter truncation
// reference: light-touch cleaning that keeps the paper body intact

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// Publisher declaration lines dropped wherever they appear.
    static ref REMOVE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i).*all rights (are )?reserved.*").unwrap(),
        Regex::new(r"(?i).*text and data mining.*").unwrap(),
        Regex::new(r"(?i).*ai training.*and similar technologies.*").unwrap(),
        Regex::new(r"(?i)^Contents lists available at ScienceDirect$").unwrap(),
        Regex::new(r"(?i)^journal homepage:.*$").unwrap(),
        Regex::new(r"(?i)^Available online.*$").unwrap(),
    ];

    /// Standalone back-matter headings that end the paper body.
    static ref TRUNCATE_PATTERN: Regex = Regex::new(
        r"(?im)^\s*(Acknowledgements|Acknowledgments|Declaration of Competing Interest|Conflict of interest|CRediT authorship contribution statement|References)\s*$"
    )
    .unwrap();
}

/// Remove publisher declaration lines, keeping the paper body verbatim.
pub fn clean_paper_text(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let stripped = line.trim();
            if stripped.is_empty() {
                return true;
            }
            !REMOVE_PATTERNS.iter().any(|pat| pat.is_match(stripped))
        })
        .collect();
    kept.join("\n")
}

/// Drop acknowledgements / conflict-of-interest / reference sections.
///
/// Only the trailing 30% of the text is searched for a standalone heading,
/// so a "References" mention inside the body never truncates it. The
/// earliest match in that zone wins. Unmatched or very short texts pass
/// through unchanged.
pub fn truncate_back_matter(text: &str) -> String {
    if text.len() < 100 {
        return text.to_string();
    }

    let mut search_start = (text.len() * 7) / 10;
    while search_start < text.len() && !text.is_char_boundary(search_start) {
        search_start += 1;
    }

    if let Some(m) = TRUNCATE_PATTERN.find(&text[search_start..]) {
        let cut = search_start + m.start();
        let out = text[..cut].trim_end();
        debug!(
            "Truncated back matter at {} ({:?}), {} -> {} chars",
            cut,
            m.as_str().trim(),
            text.len(),
            out.len()
        );
        return out.to_string();
    }

    text.to_string()
}
