pub mod source;
pub mod sport;
pub mod types;

pub use source::{DirSource, MappingSource, StaticSource};
pub use sport::{League, Sport};

use crate::engine::index::SportsbookIndex;
use crate::engine::resolver::{self, SearchTerm, SynonymTable};
use crate::engine::translate::TranslationTable;
use crate::error::{Result, SbrError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use types::{LeagueConfig, Registry, SportConfig, SportsbookList};

/// Loaded static configuration shared by every query.
///
/// Tables every query needs are read up front so a broken catalog fails at
/// startup. Sports and leagues are built on first use and then shared.
pub struct Catalog {
    source: Box<dyn MappingSource>,
    translations: TranslationTable,
    synonyms: Arc<SynonymTable>,
    sportsbooks: SportsbookIndex,
    registry: Registry,
    args: HashMap<String, String>,
    fields: HashMap<String, String>,
    sports: Mutex<HashMap<String, Arc<Sport>>>,
    leagues: Mutex<HashMap<String, Arc<League>>>,
}

impl Catalog {
    pub fn load(source: impl MappingSource + 'static) -> Result<Self> {
        let translations = TranslationTable::from_value(&source.load_mapping("dictionary")?)?;
        let synonyms = SynonymTable::from_value(&source.load_mapping("search_dictionary")?)?;
        let books: SportsbookList = parse(&source, "sportsbooks")?;
        let registry: Registry = parse(&source, "registry")?;
        let args: HashMap<String, String> = parse(&source, "args")?;
        let fields: HashMap<String, String> = parse(&source, "fields")?;

        tracing::debug!(
            translations = translations.len(),
            sportsbooks = books.sportsbooks.len(),
            leagues = registry.leagues.len(),
            sports = registry.sports.len(),
            "catalog loaded"
        );

        Ok(Self {
            source: Box::new(source),
            translations,
            synonyms: Arc::new(synonyms),
            sportsbooks: SportsbookIndex::build(&books.sportsbooks),
            registry,
            args,
            fields,
            sports: Mutex::new(HashMap::new()),
            leagues: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::load(DirSource::new(dir))
    }

    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    pub fn sport(&self, key: &str) -> Result<Arc<Sport>> {
        let key = key.trim().to_lowercase();
        let mut cache = self.sports.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sport) = cache.get(&key) {
            return Ok(sport.clone());
        }
        let config: SportConfig = parse(self.source.as_ref(), &key)?;
        let sport = Arc::new(Sport::new(&key, &config, self.synonyms.clone()));
        tracing::debug!(sport = %key, markets = sport.markets().names().len(), "sport built");
        cache.insert(key, sport.clone());
        Ok(sport)
    }

    pub fn league(&self, key: &str) -> Result<Arc<League>> {
        let key = key.trim().to_lowercase();
        if let Some(league) = self.leagues.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            return Ok(league.clone());
        }
        let config: LeagueConfig = parse(self.source.as_ref(), &key)?;
        // built outside the league lock; sport() takes its own lock
        let sport = self.sport(&config.sport)?;
        let league = Arc::new(League::new(&key, &config, sport));
        tracing::debug!(league = %key, teams = league.has_teams(), "league built");
        let mut cache = self.leagues.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cache.entry(key).or_insert(league).clone())
    }

    /// `None` when the league id is not registered.
    pub fn league_by_id(&self, league_id: i64) -> Result<Option<Arc<League>>> {
        match self.registry.leagues.iter().find(|e| e.id == league_id) {
            Some(entry) => self.league(&entry.key).map(Some),
            None => Ok(None),
        }
    }

    pub fn sport_by_id(&self, sport_id: i64) -> Result<Option<Arc<Sport>>> {
        match self.registry.sports.iter().find(|e| e.id == sport_id) {
            Some(entry) => self.sport(&entry.key).map(Some),
            None => Ok(None),
        }
    }

    pub fn sportsbook_ids(&self, terms: &[SearchTerm]) -> Result<Vec<i64>> {
        resolver::resolve_keyed(self.sportsbooks.keys(), terms)
    }

    pub fn sportsbook_id(&self, term: impl Into<SearchTerm>) -> Result<i64> {
        let ids = self.sportsbook_ids(&[term.into()])?;
        ids.first()
            .copied()
            .ok_or_else(|| SbrError::InvalidInput("no search term given".to_string()))
    }

    pub fn sportsbook_name(&self, sportsbook_id: i64) -> Option<&str> {
        self.sportsbooks.name(sportsbook_id)
    }

    pub fn args_template(&self, name: &str) -> Result<&str> {
        template(&self.args, "argument", name)
    }

    pub fn fields_template(&self, name: &str) -> Result<&str> {
        template(&self.fields, "field", name)
    }
}

fn template<'a>(table: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    table
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| SbrError::Config(format!("no {} template '{}'", kind, name)))
}

fn parse<T: DeserializeOwned>(source: &dyn MappingSource, key: &str) -> Result<T> {
    let value = source.load_mapping(key)?;
    serde_json::from_value(value).map_err(|e| SbrError::Config(format!("mapping '{}': {}", key, e)))
}
