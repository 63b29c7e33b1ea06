//! Fuzzy resolution of free-text queries to catalog rows.
//!
//! The resolver is built once over a lowercased snapshot of the catalog
//! titles and queried read-only afterwards. A query matches the title with
//! the highest normalized edit-distance similarity, provided it clears the
//! 0.6 floor; ties keep the first title in catalog order. This floor and
//! tie-break are the service's "did you mean" behavior and must stay stable.

/// Minimum similarity for a query to resolve at all.
const MIN_SIMILARITY: f64 = 0.6;

/// Resolves fuzzy, possibly-misspelled queries against an immutable corpus
/// of lowercased titles, one per catalog row.
#[derive(Debug, Clone)]
pub struct FuzzyResolver {
    titles: Vec<String>,
}

impl FuzzyResolver {
    /// Builds a resolver over a lowercased title snapshot in catalog row
    /// order (see `CatalogStore::titles_lowercase`).
    pub fn new(titles: Vec<String>) -> Self {
        Self { titles }
    }

    /// Returns the catalog row of the best match above the similarity floor,
    /// or `None`. A `None` is an expected outcome, not an error.
    pub fn resolve(&self, query: &str) -> Option<usize> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (row, title) in self.titles.iter().enumerate() {
            let score = similarity(&query, title);
            if score < MIN_SIMILARITY {
                continue;
            }
            // strictly-greater comparison keeps the first row on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((row, score));
            }
        }

        best.map(|(row, _)| row)
    }
}

/// Normalized Levenshtein similarity in [0, 1]: 1 is an exact match, 0 shares
/// nothing. Two empty strings count as identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Levenshtein edit distance over Unicode scalars, two-row formulation.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0; b_chars.len() + 1];

    for (i, &a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, &b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}
