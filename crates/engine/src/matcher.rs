//! Label matching strategies.
//!
//! Report labels are typed by hand upstream, so a description is tried against
//! the fixed labels with progressively looser strategies. Callers run the
//! strategies in [`MatchStrategy::ORDERED`] order and stop at the first pass
//! that produces a match.

/// Context a strategy may need besides the text and the candidate label.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchContext<'a> {
    /// Cost center code for the `CC<code>` prefix strategy.
    pub cost_center: Option<&'a str>,
    /// Words that must all appear (case-insensitive) for the contains strategy.
    pub keywords: &'a [&'a str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Equal after trimming whitespace and one trailing colon.
    Exact,
    /// Equal after removing a leading `CC<code>` (or bare `<code>`) prefix.
    CostCenterPrefix,
    /// Case-insensitive starts-with.
    StartsWith,
    /// Case-insensitive contains, only when every context keyword is present.
    ContainsWithKeyword,
}

impl MatchStrategy {
    pub const ORDERED: [MatchStrategy; 4] = [
        MatchStrategy::Exact,
        MatchStrategy::CostCenterPrefix,
        MatchStrategy::StartsWith,
        MatchStrategy::ContainsWithKeyword,
    ];

    pub fn matches(self, text: &str, candidate: &str, ctx: &MatchContext<'_>) -> bool {
        let text = clean_label(text);
        let candidate = clean_label(candidate);
        if text.is_empty() || candidate.is_empty() {
            return false;
        }
        match self {
            Self::Exact => text == candidate,
            Self::CostCenterPrefix => match ctx.cost_center {
                Some(code) => strip_cost_center_prefix(text, code)
                    .map(|rest| rest == candidate)
                    .unwrap_or(false),
                None => false,
            },
            Self::StartsWith => text.to_lowercase().starts_with(&candidate.to_lowercase()),
            Self::ContainsWithKeyword => {
                if ctx.keywords.is_empty() {
                    return false;
                }
                let lower = text.to_lowercase();
                lower.contains(&candidate.to_lowercase())
                    && ctx.keywords.iter().all(|k| lower.contains(&k.to_lowercase()))
            }
        }
    }
}

/// Run the strategies in order; within the first pass that matches anything,
/// the longest candidate wins. Returns the winning value and the strategy.
pub fn best_match<'c, T: Copy>(
    text: &str,
    candidates: impl IntoIterator<Item = (&'c str, T)> + Clone,
    ctx: &MatchContext<'_>,
) -> Option<(T, MatchStrategy)> {
    for strategy in MatchStrategy::ORDERED {
        let winner = candidates
            .clone()
            .into_iter()
            .filter(|(label, _)| strategy.matches(text, label, ctx))
            .max_by_key(|(label, _)| label.len());
        if let Some((_, value)) = winner {
            return Some((value, strategy));
        }
    }
    None
}

/// Trim whitespace and a single trailing colon.
pub fn clean_label(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end()
}

/// Remove a leading service-level prefix (case-insensitive) and a trailing
/// colon. Returns the remaining text and whether a prefix was removed.
pub fn strip_service_level<'t>(text: &'t str, prefix: &str) -> (&'t str, bool) {
    let trimmed = text.trim();
    let has_prefix = trimmed.len() >= prefix.len()
        && trimmed.is_char_boundary(prefix.len())
        && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix);
    if has_prefix {
        (clean_label(&trimmed[prefix.len()..]), true)
    } else {
        (clean_label(trimmed), false)
    }
}

fn strip_cost_center_prefix<'t>(text: &'t str, code: &str) -> Option<&'t str> {
    let prefixed = format!("CC{code}");
    text.strip_prefix(prefixed.as_str())
        .or_else(|| text.strip_prefix(code))
        .map(str::trim)
}
