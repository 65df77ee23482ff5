//! "Did You Mean?" Suggestions for Unknown Commands
//!
//! Ranks known command names against a mistyped token using edit distance,
//! Jaro-Winkler, Dice and prefix matching.

use std::collections::HashMap;

/// Configuration for suggestion generation
#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    /// Maximum edit distance for suggestions (lower = more strict)
    pub max_edit_distance: usize,
    /// Minimum similarity threshold (0.0 - 1.0, higher = more strict)
    pub min_similarity: f64,
    /// Maximum number of suggestions to return
    pub max_suggestions: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: 2,
            min_similarity: 0.6,
            max_suggestions: 3,
        }
    }
}

/// Suggestion engine over a set of command names
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    config: SuggestionConfig,
    candidates: Vec<String>,
}

impl SuggestionEngine {
    pub fn new(config: SuggestionConfig) -> Self {
        Self {
            config,
            candidates: Vec::new(),
        }
    }

    /// Replace the candidate names
    pub fn update_candidates(&mut self, names: &[String]) {
        self.candidates = names.to_vec();
        self.candidates.sort();
        self.candidates.dedup();
    }

    /// Get suggestions for an unknown token, best first
    pub fn suggest(&self, input: &str) -> Vec<Suggestion> {
        if input.is_empty() {
            return Vec::new();
        }

        let mut suggestions = Vec::new();
        for candidate in &self.candidates {
            // An exact match means the command exists
            if input == candidate {
                continue;
            }

            let similarity = calculate_similarity(input, candidate);
            let edit_distance = levenshtein_distance(input, candidate);
            let is_prefix = input.chars().count() >= 2 && candidate.starts_with(input);

            let close = similarity >= self.config.min_similarity
                && edit_distance <= self.config.max_edit_distance;
            if close || is_prefix {
                suggestions.push(Suggestion {
                    text: candidate.clone(),
                    similarity,
                    edit_distance,
                });
            }
        }

        // Highest similarity first, then lowest edit distance
        suggestions.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.edit_distance.cmp(&b.edit_distance))
        });

        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }

    /// Suggested names only
    pub fn suggest_names(&self, input: &str) -> Vec<String> {
        self.suggest(input).into_iter().map(|s| s.text).collect()
    }
}

/// A single suggestion with its scores
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub text: String,
    pub similarity: f64,
    pub edit_distance: usize,
}

/// Weighted average of several similarity measures
fn calculate_similarity(a: &str, b: &str) -> f64 {
    let jaro_winkler = jaro_winkler_similarity(a, b);
    let dice = dice_coefficient(a, b);
    let normalized_levenshtein = normalized_levenshtein_similarity(a, b);

    // Jaro-Winkler is best for typos, others for context
    jaro_winkler * 0.5 + dice * 0.3 + normalized_levenshtein * 0.2
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows of the distance matrix
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Calculate normalized Levenshtein similarity (0.0 - 1.0)
pub fn normalized_levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein_distance(a, b) as f64 / max_len as f64)
}

/// Calculate Jaro-Winkler similarity
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    let jaro = jaro_similarity(a, b);
    if jaro < 0.7 {
        return jaro;
    }

    // Common prefix, up to 4 characters
    let prefix_len = a
        .chars()
        .zip(b.chars())
        .take(4)
        .take_while(|(a_char, b_char)| a_char == b_char)
        .count();

    jaro + (0.1 * prefix_len as f64 * (1.0 - jaro))
}

/// Calculate Jaro similarity
pub fn jaro_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 && b_len == 0 {
        return 1.0;
    }
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }

    let match_window = (a_len.max(b_len) / 2).saturating_sub(1);

    let mut a_matches = vec![false; a_len];
    let mut b_matches = vec![false; b_len];
    let mut matches = 0;

    for i in 0..a_len {
        let start = i.saturating_sub(match_window);
        let end = (i + match_window + 1).min(b_len);

        for j in start..end {
            if b_matches[j] || a_chars[i] != b_chars[j] {
                continue;
            }
            a_matches[i] = true;
            b_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0;
    let mut k = 0;
    for i in 0..a_len {
        if !a_matches[i] {
            continue;
        }
        while !b_matches[k] {
            k += 1;
        }
        if a_chars[i] != b_chars[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    (m / a_len as f64 + m / b_len as f64 + (m - transpositions as f64 / 2.0) / m) / 3.0
}

/// Calculate Dice coefficient (Sørensen-Dice index)
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a_bigrams = bigrams(a);
    let b_bigrams = bigrams(b);

    if a_bigrams.is_empty() && b_bigrams.is_empty() {
        return 1.0;
    }
    if a_bigrams.is_empty() || b_bigrams.is_empty() {
        return 0.0;
    }

    let mut a_counts: HashMap<&(char, char), usize> = HashMap::new();
    for bigram in &a_bigrams {
        *a_counts.entry(bigram).or_insert(0) += 1;
    }

    let mut intersection = 0;
    for bigram in &b_bigrams {
        if let Some(count) = a_counts.get_mut(bigram) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    (2.0 * intersection as f64) / (a_bigrams.len() + b_bigrams.len()) as f64
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(names: &[&str]) -> SuggestionEngine {
        let mut engine = SuggestionEngine::new(SuggestionConfig::default());
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        engine.update_candidates(&names);
        engine
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "ab"), 1);
        assert_eq!(levenshtein_distance("abc", "abcd"), 1);
        assert_eq!(levenshtein_distance("abc", "axc"), 1);
        assert_eq!(levenshtein_distance("crush", "crsh"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_jaro_winkler_similarity() {
        assert!((jaro_winkler_similarity("", "") - 1.0).abs() < 0.01);
        assert!((jaro_winkler_similarity("abc", "abc") - 1.0).abs() < 0.01);
        assert!(jaro_winkler_similarity("", "abc") < 0.01);
        assert!(jaro_winkler_similarity("crush", "crsh") > 0.8);
        assert!(jaro_winkler_similarity("export", "exprt") > 0.7);
    }

    #[test]
    fn test_dice_coefficient() {
        assert!((dice_coefficient("", "") - 1.0).abs() < 0.01);
        assert!((dice_coefficient("abc", "abc") - 1.0).abs() < 0.01);
        assert!(dice_coefficient("", "abc") < 0.01);
        assert!(dice_coefficient("commits", "commit") > 0.8);
    }

    #[test]
    fn test_suggest_typo() {
        let engine = engine(&["abc", "help", "crush", "smash"]);
        assert_eq!(engine.suggest_names("abd"), vec!["abc".to_string()]);
        assert_eq!(engine.suggest_names("crsh").first().map(String::as_str), Some("crush"));
    }

    #[test]
    fn test_suggest_prefix() {
        let engine = engine(&["in-empty-group", "something-else"]);
        assert_eq!(engine.suggest_names("some"), vec!["something-else".to_string()]);
    }

    #[test]
    fn test_no_suggestions() {
        let engine = engine(&["crush", "see", "hear"]);
        assert!(engine.suggest("dance").is_empty());
        assert!(engine.suggest("").is_empty());
        // Exact matches are not suggestions
        assert!(engine.suggest("see").is_empty());
    }

    #[test]
    fn test_limit() {
        let config = SuggestionConfig {
            max_suggestions: 1,
            ..SuggestionConfig::default()
        };
        let mut engine = SuggestionEngine::new(config);
        engine.update_candidates(&["sea".to_string(), "see".to_string(), "set".to_string()]);
        assert_eq!(engine.suggest("sez").len(), 1);
    }
}
