use crate::catalog::types::{MarketGroup, SportsbookRecord, TeamRecord};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Bet-type classification of a market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetKind {
    Moneyline,
    Spread,
    Total,
    /// Futures and anything else; carries the market group's url.
    Other(String),
}

impl BetKind {
    /// Classify from the type url, falling back to the group url.
    fn classify(type_url: &str, group_url: &str) -> Self {
        match type_url.trim().to_lowercase().as_str() {
            "money-line" => BetKind::Moneyline,
            "pointspread" => BetKind::Spread,
            "totals" => BetKind::Total,
            _ => BetKind::Other(group_url.trim().to_lowercase()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BetKind::Moneyline => "moneyline",
            BetKind::Spread => "spread",
            BetKind::Total => "total",
            BetKind::Other(label) => label,
        }
    }
}

/// Search phrases and per-market metadata for one sport or league.
#[derive(Debug, Clone, Default)]
pub struct MarketIndex {
    ids: HashMap<String, i64>,
    names: HashMap<i64, String>,
    periods: HashMap<i64, Vec<i64>>,
    kinds: HashMap<i64, BetKind>,
}

impl MarketIndex {
    pub fn build(groups: &[MarketGroup]) -> Self {
        let mut index = MarketIndex::default();
        for group in groups {
            let group_keys = group.descriptors();
            for market in &group.market_types {
                let id = market.market_id;
                let type_keys = market.descriptors();

                for g in &group_keys {
                    for t in &type_keys {
                        index.ids.insert(format!("{} {}", g, t).trim().to_string(), id);
                    }
                }
                // Bare type descriptors. First registration wins so the full-game
                // group (listed first) owns "ml", "ps" and friends.
                for t in &type_keys {
                    index.ids.entry(t.clone()).or_insert(id);
                }

                index.names.insert(id, market.name.clone());
                if let Some(ref periods) = group.periods {
                    index.periods.insert(id, periods.clone());
                }
                index.kinds.insert(id, BetKind::classify(&market.url, &group.url));
            }
        }
        tracing::debug!(
            phrases = index.ids.len(),
            markets = index.names.len(),
            "market index built"
        );
        index
    }

    pub fn lookup(&self, phrase: &str) -> Option<i64> {
        self.ids.get(phrase).copied()
    }

    pub fn name(&self, market_id: i64) -> Option<&str> {
        self.names.get(&market_id).map(String::as_str)
    }

    /// `None` means the market spans the whole game.
    pub fn periods(&self, market_id: i64) -> Option<&[i64]> {
        self.periods.get(&market_id).map(Vec::as_slice)
    }

    pub fn kind(&self, market_id: i64) -> Option<&BetKind> {
        self.kinds.get(&market_id)
    }

    pub fn names(&self) -> &HashMap<i64, String> {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Value stored under a search string. A string shared by several ids within
/// one key class is kept as `Ambiguous` and rejected at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEntry {
    Unique(i64),
    Ambiguous(Vec<i64>),
}

/// Lower-cased string -> id lookups, one table per key class.
#[derive(Debug, Clone)]
pub struct KeyedIndex {
    domain: &'static str,
    classes: Vec<(&'static str, HashMap<String, IndexEntry>)>,
}

impl KeyedIndex {
    pub fn new(domain: &'static str, classes: &[&'static str]) -> Self {
        Self {
            domain,
            classes: classes.iter().map(|c| (*c, HashMap::new())).collect(),
        }
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    fn insert(&mut self, class: usize, key: &str, id: i64) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        let domain = self.domain;
        let (class_name, table) = &mut self.classes[class];
        match table.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(IndexEntry::Unique(id));
            }
            Entry::Occupied(mut slot) => match slot.get().clone() {
                IndexEntry::Unique(existing) if existing == id => {}
                IndexEntry::Unique(existing) => {
                    tracing::debug!(domain, class = *class_name, key = %slot.key(), "ambiguous search key");
                    slot.insert(IndexEntry::Ambiguous(vec![existing, id]));
                }
                IndexEntry::Ambiguous(mut ids) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                        slot.insert(IndexEntry::Ambiguous(ids));
                    }
                }
            },
        }
    }

    /// Every key class in which `term` (already lower-cased) is present.
    pub fn matches(&self, term: &str) -> Vec<(&'static str, &IndexEntry)> {
        self.classes
            .iter()
            .filter_map(|(class, table)| table.get(term).map(|e| (*class, e)))
            .collect()
    }
}

pub const TEAM_KEY_CLASSES: [&str; 6] = [
    "abbreviation",
    "sbr abbreviation",
    "name",
    "nickname",
    "location",
    "full name",
];

pub fn build_team_index(teams: &[TeamRecord]) -> KeyedIndex {
    let mut index = KeyedIndex::new("team", &TEAM_KEY_CLASSES);
    for team in teams {
        let full_name = format!("{} {}", team.location.trim(), team.nickname.trim());
        let keys = [
            team.abbreviation.as_str(),
            team.sbr_abbreviation.as_str(),
            team.name.as_str(),
            team.nickname.as_str(),
            team.location.as_str(),
            full_name.as_str(),
        ];
        for (class, key) in keys.iter().enumerate() {
            index.insert(class, key, team.team_id);
        }
    }
    index
}

/// Sportsbook search keys plus id -> display name.
#[derive(Debug, Clone)]
pub struct SportsbookIndex {
    keys: KeyedIndex,
    names: HashMap<i64, String>,
}

impl SportsbookIndex {
    pub fn build(books: &[SportsbookRecord]) -> Self {
        let mut keys = KeyedIndex::new("sportsbook", &["name", "alias"]);
        let mut names = HashMap::new();
        for book in books {
            keys.insert(0, &book.name, book.sportsbook_id);
            for alias in &book.alias {
                keys.insert(1, alias, book.sportsbook_id);
            }
            names.insert(book.sportsbook_id, book.name.clone());
        }
        Self { keys, names }
    }

    pub fn keys(&self) -> &KeyedIndex {
        &self.keys
    }

    pub fn name(&self, sportsbook_id: i64) -> Option<&str> {
        self.names.get(&sportsbook_id).map(String::as_str)
    }
}
