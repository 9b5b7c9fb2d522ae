use super::index::{IndexEntry, KeyedIndex, MarketIndex};
use crate::error::{Result, SbrError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Offsets at which a run-together abbreviation like "1hou" is split.
/// Search dictionary abbreviations are at most 3 characters long.
pub const SPLIT_OFFSETS: [usize; 2] = [2, 3];

/// A caller-supplied search term: either an already-known id or text to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    Id(i64),
    Text(String),
}

impl From<i64> for SearchTerm {
    fn from(id: i64) -> Self {
        SearchTerm::Id(id)
    }
}

impl From<&str> for SearchTerm {
    fn from(text: &str) -> Self {
        SearchTerm::Text(text.to_string())
    }
}

impl From<String> for SearchTerm {
    fn from(text: String) -> Self {
        SearchTerm::Text(text)
    }
}

impl TryFrom<&Value> for SearchTerm {
    type Error = SbrError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(SearchTerm::Id)
                .ok_or_else(|| SbrError::InvalidInput(format!("search id {} is not an integer", n))),
            Value::String(s) => Ok(SearchTerm::Text(s.clone())),
            other => Err(SbrError::InvalidInput(format!(
                "search terms must be ints or strings, got {}",
                other
            ))),
        }
    }
}

/// Accepts a single int / string or a list of them.
pub fn terms_from_value(value: &Value) -> Result<Vec<SearchTerm>> {
    match value {
        Value::Array(items) => items.iter().map(SearchTerm::try_from).collect(),
        single => Ok(vec![SearchTerm::try_from(single)?]),
    }
}

/// Drop repeated ids, keeping first-occurrence order.
pub fn dedup_ordered(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Shorthand token -> canonical token ("ou" -> "total", "1h" -> "1st half").
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    words: HashMap<String, String>,
}

impl SynonymTable {
    pub fn new(words: HashMap<String, String>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
                .collect(),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let words: HashMap<String, String> = serde_json::from_value(value.clone())
            .map_err(|e| SbrError::Config(format!("search dictionary: {}", e)))?;
        Ok(Self::new(words))
    }

    /// Substitute each whitespace-separated word, rejoining with single spaces.
    pub fn translate(&self, phrase: &str) -> String {
        phrase
            .split_whitespace()
            .map(|w| self.words.get(w).map(String::as_str).unwrap_or(w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn split_word(word: &str) -> Vec<String> {
    SPLIT_OFFSETS
        .iter()
        .filter(|&&i| i < word.len() && word.is_char_boundary(i))
        .map(|&i| format!("{} {}", &word[..i], &word[i..]))
        .collect()
}

fn match_market(index: &MarketIndex, synonyms: &SynonymTable, term: &str) -> Option<i64> {
    let term = term.trim().to_lowercase();
    let translated = synonyms.translate(&term);
    if let Some(id) = index.lookup(&translated) {
        return Some(id);
    }
    if translated.contains(' ') {
        // "money line" -> "moneyline"
        let joined = translated.replace(' ', "");
        if let Some(id) = index.lookup(&joined).or_else(|| index.lookup(&synonyms.translate(&joined))) {
            return Some(id);
        }
    }
    if term.split_whitespace().count() == 1 {
        for candidate in split_word(&term) {
            if let Some(id) = index.lookup(&synonyms.translate(&candidate)) {
                return Some(id);
            }
        }
    }
    None
}

/// Resolve market search terms to market ids.
pub fn resolve_markets(
    index: &MarketIndex,
    synonyms: &SynonymTable,
    terms: &[SearchTerm],
) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            SearchTerm::Id(id) => ids.push(*id),
            SearchTerm::Text(text) => match match_market(index, synonyms, text) {
                Some(id) => ids.push(id),
                None => {
                    return Err(SbrError::NotFound {
                        domain: "market",
                        term: text.clone(),
                    })
                }
            },
        }
    }
    Ok(dedup_ordered(ids))
}

/// Resolve team or sportsbook terms. Every key class is consulted; a term is
/// ambiguous if any class holds several ids for it, or if classes disagree.
pub fn resolve_keyed(index: &KeyedIndex, terms: &[SearchTerm]) -> Result<Vec<i64>> {
    let domain = index.domain();
    let mut ids = Vec::with_capacity(terms.len());
    for term in terms {
        let text = match term {
            SearchTerm::Id(id) => {
                ids.push(*id);
                continue;
            }
            SearchTerm::Text(text) => text,
        };

        let hits = index.matches(&text.trim().to_lowercase());
        if hits.is_empty() {
            return Err(SbrError::NotFound {
                domain,
                term: text.clone(),
            });
        }

        let mut candidates: Vec<i64> = Vec::new();
        for (_, entry) in &hits {
            match entry {
                IndexEntry::Unique(id) => candidates.push(*id),
                IndexEntry::Ambiguous(list) => candidates.extend(list.iter().copied()),
            }
        }
        let candidates = dedup_ordered(candidates);
        if candidates.len() > 1 {
            return Err(SbrError::Ambiguous {
                domain,
                term: text.clone(),
                candidates,
            });
        }
        ids.push(candidates[0]);
    }
    Ok(dedup_ordered(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{MarketGroup, TeamRecord};
    use crate::engine::index::build_team_index;
    use serde_json::json;

    fn index() -> MarketIndex {
        let groups: Vec<MarketGroup> = serde_json::from_value(json!([
            {
                "name": "full game", "alias": ["fg", "full-game"], "url": "full-game",
                "market_types": [
                    { "market_id": 83, "name": "moneyline", "alias": "ml", "url": "money-line" },
                    { "market_id": 401, "name": "point spread", "alias": "ps", "url": "pointspread" },
                    { "market_id": 402, "name": "total", "alias": "ou", "url": "totals" }
                ]
            },
            {
                "name": "1st half", "alias": "1h", "url": "1st-half", "periods": [1, 3],
                "market_types": [
                    { "market_id": 398, "name": "total", "alias": "ou", "url": "totals" }
                ]
            }
        ]))
        .unwrap();
        MarketIndex::build(&groups)
    }

    fn synonyms() -> SynonymTable {
        SynonymTable::new(HashMap::from([
            ("o/u".to_string(), "total".to_string()),
            ("over/under".to_string(), "total".to_string()),
            ("totals".to_string(), "total".to_string()),
            ("first".to_string(), "1st".to_string()),
            ("tot".to_string(), "total".to_string()),
            ("lines".to_string(), "line".to_string()),
        ]))
    }

    fn t(s: &str) -> SearchTerm {
        SearchTerm::from(s)
    }

    #[test]
    fn test_market_terms_case_and_whitespace_insensitive() {
        let (idx, syn) = (index(), synonyms());
        for term in ["1H OU", "1h ou", " 1h ou ", "1st half o/u", "first half totals", "1h tot"] {
            assert_eq!(resolve_markets(&idx, &syn, &[t(term)]).unwrap(), vec![398], "{}", term);
        }
    }

    #[test]
    fn test_concatenated_abbreviations_split() {
        let (idx, syn) = (index(), synonyms());
        assert_eq!(resolve_markets(&idx, &syn, &[t("1hou")]).unwrap(), vec![398]);
        assert_eq!(resolve_markets(&idx, &syn, &[t("1HTOT")]).unwrap(), vec![398]);
        assert_eq!(resolve_markets(&idx, &syn, &[t("fgps")]).unwrap(), vec![401]);
    }

    #[test]
    fn test_moneyline_scenario() {
        let (idx, syn) = (index(), synonyms());
        let ids = resolve_markets(&idx, &syn, &[t("ml"), t("money lines"), t("fg ml")]).unwrap();
        assert_eq!(ids, vec![83]);
    }

    #[test]
    fn test_spaced_words_rejoin() {
        let (idx, syn) = (index(), synonyms());
        assert_eq!(resolve_markets(&idx, &syn, &[t("Money Line")]).unwrap(), vec![83]);
        assert_eq!(resolve_markets(&idx, &syn, &[t("point spread")]).unwrap(), vec![401]);
        assert!(resolve_markets(&idx, &syn, &[t("money foo")]).is_err());
    }

    #[test]
    fn test_ids_pass_through_in_order() {
        let (idx, syn) = (index(), synonyms());
        let terms = vec![SearchTerm::Id(7), t("ps"), SearchTerm::Id(83), t("ml"), SearchTerm::Id(7)];
        assert_eq!(resolve_markets(&idx, &syn, &terms).unwrap(), vec![7, 401, 83]);
    }

    #[test]
    fn test_unknown_market_fails_whole_call() {
        let (idx, syn) = (index(), synonyms());
        let err = resolve_markets(&idx, &syn, &[t("ml"), t("foo")]).unwrap_err();
        assert!(matches!(err, SbrError::NotFound { domain: "market", ref term } if term == "foo"));
        assert!(resolve_markets(&idx, &syn, &[t("fg foo")]).is_err());
    }

    #[test]
    fn test_split_skips_short_and_multibyte() {
        assert!(split_word("ab").is_empty());
        assert_eq!(split_word("abc"), vec!["ab c".to_string()]);
        assert_eq!(split_word("1hou"), vec!["1h ou".to_string(), "1ho u".to_string()]);
        assert_eq!(split_word("aé"), Vec::<String>::new());
    }

    fn team(id: i64, abbr: &str, nickname: &str, location: &str) -> TeamRecord {
        TeamRecord {
            team_id: id,
            abbreviation: abbr.to_string(),
            sbr_abbreviation: abbr.to_string(),
            name: location.to_string(),
            nickname: nickname.to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn test_team_ambiguity_and_unique_nicknames() {
        let idx = build_team_index(&[
            team(1530, "NYJ", "Jets", "New York"),
            team(1540, "NYG", "Giants", "New York"),
            team(1548, "SEA", "Seahawks", "Seattle"),
        ]);
        let err = resolve_keyed(&idx, &[t("new york")]).unwrap_err();
        match err {
            SbrError::Ambiguous { domain, term, candidates } => {
                assert_eq!(domain, "team");
                assert_eq!(term, "new york");
                assert_eq!(candidates, vec![1530, 1540]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
        assert_eq!(resolve_keyed(&idx, &[t("Jets"), t("giants")]).unwrap(), vec![1530, 1540]);
        assert_eq!(
            resolve_keyed(&idx, &[t("SEA"), t("Seattle Seahawks"), t("seattle")]).unwrap(),
            vec![1548]
        );
    }

    #[test]
    fn test_classes_disagreeing_is_ambiguous() {
        // "Dallas" is the Cowboys' location and a different team's nickname
        let idx = build_team_index(&[
            team(1, "DAL", "Cowboys", "Dallas"),
            team(2, "XYZ", "Dallas", "Somewhere"),
        ]);
        assert!(matches!(
            resolve_keyed(&idx, &[t("dallas")]),
            Err(SbrError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_unknown_team() {
        let idx = build_team_index(&[team(1548, "SEA", "Seahawks", "Seattle")]);
        assert!(matches!(
            resolve_keyed(&idx, &[t("foo Seahawks")]),
            Err(SbrError::NotFound { domain: "team", .. })
        ));
    }

    #[test]
    fn test_terms_from_value_validates_shape() {
        assert_eq!(
            terms_from_value(&json!([16, "nfl"])).unwrap(),
            vec![SearchTerm::Id(16), t("nfl")]
        );
        assert_eq!(terms_from_value(&json!("ml")).unwrap(), vec![t("ml")]);
        assert!(matches!(terms_from_value(&json!([1.5])), Err(SbrError::InvalidInput(_))));
        assert!(matches!(terms_from_value(&json!({"a": 1})), Err(SbrError::InvalidInput(_))));
    }

    #[test]
    fn test_dedup_ordered() {
        assert_eq!(dedup_ordered([3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
