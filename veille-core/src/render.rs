//! Heuristic splitting of a generated report into titled sections.
//!
//! Reports come back from the model as free-form French text, usually (but
//! not reliably) organized under numbered or markdown-style headings. This
//! module re-detects that structure for presentation:
//! - heading forms: `#`/`##`/`###`, `N. Titre`, `**Titre**`, and short
//!   colon-terminated lines
//! - text before the first heading becomes an implicit "Introduction"
//! - each section is tagged with a display category keyed off its title
//!
//! Parsing is presentation-only. It never touches storage, accepts any
//! input, and an empty result means "no structure found, show the raw text".

use regex::Regex;

/// Longest line still accepted as a colon-terminated heading.
const COLON_TITLE_MAX: usize = 100;

/// Heading patterns, compiled once per parse.
struct HeadingPatterns {
    hash: Regex,
    numbered: Regex,
    bold: Regex,
    colon: Regex,
}

impl HeadingPatterns {
    fn compile() -> Option<Self> {
        Some(Self {
            hash: Regex::new(r"^#{1,3}\s*(.+)$").ok()?,
            numbered: Regex::new(r"^\d+\.\s*(.+)$").ok()?,
            bold: Regex::new(r"^\*\*(.+?)\*\*\s*:?$").ok()?,
            colon: Regex::new(r"^(.+?)\s*:$").ok()?,
        })
    }
}

/// One displayable slice of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
    pub category: SectionCategory,
}

/// Display family of a section, derived from keywords in its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionCategory {
    Summary,
    Trends,
    Actors,
    Challenges,
    Recommendations,
    General,
}

impl SectionCategory {
    /// French display label.
    pub fn label(&self) -> &'static str {
        match self {
            SectionCategory::Summary => "Synthèse",
            SectionCategory::Trends => "Tendances",
            SectionCategory::Actors => "Acteurs",
            SectionCategory::Challenges => "Enjeux",
            SectionCategory::Recommendations => "Recommandations",
            SectionCategory::General => "Général",
        }
    }
}

/// Split `text` into titled sections.
///
/// Lines are trimmed and blank lines dropped. A line matching one of the
/// heading forms opens a new section; everything else accumulates into the
/// current one. Sections that end up with no body at all (two headings in a
/// row, or a trailing heading) are discarded. An empty vector means the text
/// had no usable structure; callers should then fall back to the raw text.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let Some(patterns) = HeadingPatterns::compile() else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    let mut current: Option<(String, SectionCategory)> = None;
    let mut body_lines: Vec<&str> = Vec::new();

    for raw_line in text.split('\n') {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        match heading_of(&patterns, line) {
            Some(title) => {
                flush(&mut sections, current.take(), &body_lines);
                body_lines.clear();
                let category = categorize(&title);
                current = Some((title, category));
            }
            None => {
                if current.is_none() {
                    // Preamble before the first heading.
                    current = Some(("Introduction".to_string(), SectionCategory::Summary));
                }
                body_lines.push(line);
            }
        }
    }

    flush(&mut sections, current.take(), &body_lines);
    sections
}

fn flush(
    sections: &mut Vec<Section>,
    current: Option<(String, SectionCategory)>,
    body_lines: &[&str],
) {
    if let Some((title, category)) = current {
        if !body_lines.is_empty() {
            sections.push(Section {
                title,
                body: body_lines.join("\n"),
                category,
            });
        }
    }
}

/// The title a line would open a section with, if any. Patterns are tried
/// in a fixed order, so `### Résumé :` is a markdown heading (colon kept in
/// the title) rather than a colon heading.
fn heading_of(patterns: &HeadingPatterns, line: &str) -> Option<String> {
    if let Some(caps) = patterns.hash.captures(line) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = patterns.numbered.captures(line) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = patterns.bold.captures(line) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = patterns.colon.captures(line) {
        let candidate = &caps[1];
        // A colon line only counts as a heading when it is short and not a
        // full sentence; otherwise it is body text that happens to end in a
        // colon.
        if candidate.chars().count() < COLON_TITLE_MAX && !candidate.contains('.') {
            return Some(candidate.to_string());
        }
    }
    None
}

fn categorize(title: &str) -> SectionCategory {
    let lower = title.to_lowercase();
    if lower.contains("résumé") || lower.contains("executive") || lower.contains("synthèse") {
        SectionCategory::Summary
    } else if lower.contains("tendance") || lower.contains("point") || lower.contains("clé") {
        SectionCategory::Trends
    } else if lower.contains("acteur") || lower.contains("innovation") || lower.contains("principal")
    {
        SectionCategory::Actors
    } else if lower.contains("enjeu") || lower.contains("perspective") || lower.contains("risque") {
        SectionCategory::Challenges
    } else if lower.contains("recommandation") || lower.contains("conseil") || lower.contains("action")
    {
        SectionCategory::Recommendations
    } else {
        SectionCategory::General
    }
}

// ============================================================================
// TESTS
// ============================================================================
