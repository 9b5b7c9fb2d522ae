use serde::{Deserialize, Deserializer};

/// Static configuration records, as stored in the catalog mappings.

#[derive(Debug, Deserialize, Clone)]
pub struct SportConfig {
    pub sport_id: i64,
    pub default_market_id: i64,
    #[serde(default)]
    pub consensus_market_ids: Vec<i64>,
    pub markets: Vec<MarketGroup>,
}

/// A grouping of markets by game segment ("full game", "1st half", futures).
#[derive(Debug, Deserialize, Clone)]
pub struct MarketGroup {
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub alias: Vec<String>,
    pub url: String,
    /// Half-open period span the group covers, e.g. `[1, 3]` for the 1st half.
    #[serde(default)]
    pub periods: Option<Vec<i64>>,
    pub market_types: Vec<MarketType>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketType {
    pub market_id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub alias: Vec<String>,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeagueConfig {
    pub league_id: i64,
    pub name: String,
    pub abbreviation: String,
    /// Catalog key of the league's sport.
    pub sport: String,
    /// League-level market list; replaces the sport's when present.
    #[serde(default)]
    pub markets: Option<Vec<MarketGroup>>,
    #[serde(default)]
    pub teams: Option<Vec<TeamRecord>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeamRecord {
    pub team_id: i64,
    pub abbreviation: String,
    pub sbr_abbreviation: String,
    pub name: String,
    pub nickname: String,
    pub location: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SportsbookList {
    pub sportsbooks: Vec<SportsbookRecord>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SportsbookRecord {
    pub sportsbook_id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub alias: Vec<String>,
}

/// Maps service-side league / sport ids to catalog keys.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Registry {
    #[serde(default)]
    pub sports: Vec<RegistryEntry>,
    #[serde(default)]
    pub leagues: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryEntry {
    pub id: i64,
    pub key: String,
}

impl MarketGroup {
    /// Lower-cased search descriptors: name, aliases, url.
    pub fn descriptors(&self) -> Vec<String> {
        descriptors(&self.name, &self.alias, &self.url)
    }
}

impl MarketType {
    pub fn descriptors(&self) -> Vec<String> {
        descriptors(&self.name, &self.alias, &self.url)
    }
}

fn descriptors(name: &str, aliases: &[String], url: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(aliases.len() + 2);
    for raw in std::iter::once(name)
        .chain(aliases.iter().map(String::as_str))
        .chain(std::iter::once(url))
    {
        let d = raw.trim().to_lowercase();
        if !d.is_empty() && !out.contains(&d) {
            out.push(d);
        }
    }
    out
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_accepts_string_or_list() {
        let one: MarketType = serde_json::from_value(json!({
            "market_id": 83, "name": "Moneyline", "alias": "ML", "url": "money-line"
        }))
        .unwrap();
        assert_eq!(one.alias, vec!["ML".to_string()]);

        let many: MarketGroup = serde_json::from_value(json!({
            "name": "full game", "alias": ["fg", "full-game"], "url": "full-game",
            "market_types": []
        }))
        .unwrap();
        assert_eq!(many.alias.len(), 2);
        assert!(many.periods.is_none());
    }

    #[test]
    fn test_descriptors_are_lowercase_and_unique() {
        let group: MarketGroup = serde_json::from_value(json!({
            "name": "Full Game", "alias": ["FG", "full-game"], "url": "full-game",
            "market_types": []
        }))
        .unwrap();
        assert_eq!(group.descriptors(), vec!["full game", "fg", "full-game"]);
    }

    #[test]
    fn test_missing_required_key_fails() {
        let err = serde_json::from_value::<TeamRecord>(json!({
            "team_id": 1, "abbreviation": "SEA", "name": "Seattle"
        }));
        assert!(err.is_err());
    }
}
