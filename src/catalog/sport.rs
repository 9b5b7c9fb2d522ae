use super::types::{LeagueConfig, SportConfig};
use crate::engine::index::{build_team_index, KeyedIndex, MarketIndex};
use crate::engine::resolver::{self, SearchTerm, SynonymTable};
use crate::error::{Result, SbrError};
use std::sync::Arc;

/// Sport-level configuration: market taxonomy and defaults.
#[derive(Debug)]
pub struct Sport {
    pub key: String,
    pub sport_id: i64,
    pub default_market_id: i64,
    pub consensus_market_ids: Vec<i64>,
    markets: MarketIndex,
    synonyms: Arc<SynonymTable>,
}

impl Sport {
    pub fn new(key: &str, config: &SportConfig, synonyms: Arc<SynonymTable>) -> Self {
        Self {
            key: key.to_string(),
            sport_id: config.sport_id,
            default_market_id: config.default_market_id,
            consensus_market_ids: config.consensus_market_ids.clone(),
            markets: MarketIndex::build(&config.markets),
            synonyms,
        }
    }

    pub fn markets(&self) -> &MarketIndex {
        &self.markets
    }

    pub fn market_ids(&self, terms: &[SearchTerm]) -> Result<Vec<i64>> {
        resolver::resolve_markets(&self.markets, &self.synonyms, terms)
    }

    pub fn market_id(&self, term: impl Into<SearchTerm>) -> Result<i64> {
        first(self.market_ids(&[term.into()])?)
    }
}

/// League-level configuration. Markets fall back to the sport's unless the
/// league overrides them.
#[derive(Debug)]
pub struct League {
    pub key: String,
    pub league_id: i64,
    pub name: String,
    pub abbreviation: String,
    pub sport: Arc<Sport>,
    markets: Option<MarketIndex>,
    teams: Option<KeyedIndex>,
}

impl League {
    pub fn new(key: &str, config: &LeagueConfig, sport: Arc<Sport>) -> Self {
        let teams = config.teams.as_deref().map(build_team_index);
        Self {
            key: key.to_string(),
            league_id: config.league_id,
            name: config.name.clone(),
            abbreviation: config.abbreviation.clone(),
            markets: config.markets.as_deref().map(MarketIndex::build),
            teams,
            sport,
        }
    }

    pub fn markets(&self) -> &MarketIndex {
        self.markets.as_ref().unwrap_or(&self.sport.markets)
    }

    pub fn market_ids(&self, terms: &[SearchTerm]) -> Result<Vec<i64>> {
        resolver::resolve_markets(self.markets(), &self.sport.synonyms, terms)
    }

    pub fn market_id(&self, term: impl Into<SearchTerm>) -> Result<i64> {
        first(self.market_ids(&[term.into()])?)
    }

    pub fn has_teams(&self) -> bool {
        self.teams.is_some()
    }

    pub fn team_ids(&self, terms: &[SearchTerm]) -> Result<Vec<i64>> {
        match &self.teams {
            Some(index) => resolver::resolve_keyed(index, terms),
            None => Err(SbrError::InvalidInput(format!(
                "league '{}' has no team roster",
                self.key
            ))),
        }
    }

    pub fn team_id(&self, term: impl Into<SearchTerm>) -> Result<i64> {
        first(self.team_ids(&[term.into()])?)
    }
}

fn first(ids: Vec<i64>) -> Result<i64> {
    ids.first()
        .copied()
        .ok_or_else(|| SbrError::InvalidInput("no search term given".to_string()))
}
