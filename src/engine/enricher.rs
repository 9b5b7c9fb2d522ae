use super::index::{BetKind, MarketIndex};
use super::outcome::{
    self, PeriodRange, PeriodScore, Settlement, OVER_PARTICIPANT_ID, UNDER_PARTICIPANT_ID,
};
use crate::catalog::{Catalog, League, Sport};
use crate::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct EventInfo {
    description: Option<String>,
    league_id: Option<i64>,
    sport_id: Option<i64>,
    status: Option<String>,
    /// `None` when the event carries no usable score list.
    scores: Option<Vec<PeriodScore>>,
}

/// Attaches readable names and bet results to normalized line records, using
/// a companion list of normalized event records.
pub struct Enricher<'a> {
    catalog: &'a Catalog,
    events: HashMap<i64, EventInfo>,
    leagues: HashMap<i64, Arc<League>>,
    sports: HashMap<i64, Arc<Sport>>,
    participants: HashMap<i64, String>,
    participants_full: HashMap<i64, String>,
}

impl<'a> Enricher<'a> {
    pub fn new(catalog: &'a Catalog, events: &[Value]) -> Result<Self> {
        let mut enricher = Self {
            catalog,
            events: HashMap::new(),
            leagues: HashMap::new(),
            sports: HashMap::new(),
            participants: HashMap::from([
                (OVER_PARTICIPANT_ID, "over".to_string()),
                (UNDER_PARTICIPANT_ID, "under".to_string()),
            ]),
            participants_full: HashMap::from([
                (OVER_PARTICIPANT_ID, "over".to_string()),
                (UNDER_PARTICIPANT_ID, "under".to_string()),
            ]),
        };

        for event in events {
            let Some(event_id) = int_field(event, "event id") else {
                continue;
            };
            let info = EventInfo {
                description: str_field(event, "description").map(str::to_string),
                league_id: int_field(event, "league id"),
                sport_id: int_field(event, "sport id"),
                status: str_field(event, "event status").map(str::to_lowercase),
                scores: event.get("scores").and_then(parse_scores),
            };
            enricher.register_config(&info)?;
            enricher.events.insert(event_id, info);

            if let Some(Value::Array(participants)) = event.get("participants") {
                for p in participants {
                    enricher.register_participant(p);
                }
            }
        }

        tracing::debug!(
            events = enricher.events.len(),
            leagues = enricher.leagues.len(),
            sports = enricher.sports.len(),
            participants = enricher.participants.len(),
            "enricher initialised"
        );
        Ok(enricher)
    }

    fn register_config(&mut self, info: &EventInfo) -> Result<()> {
        if let Some(id) = info.league_id {
            if !self.leagues.contains_key(&id) {
                match self.catalog.league_by_id(id)? {
                    Some(league) => {
                        self.leagues.insert(id, league);
                    }
                    None => tracing::debug!(league_id = id, "no catalog entry for league"),
                }
            }
        }
        if let Some(id) = info.sport_id {
            if !self.sports.contains_key(&id) {
                match self.catalog.sport_by_id(id)? {
                    Some(sport) => {
                        self.sports.insert(id, sport);
                    }
                    None => tracing::debug!(sport_id = id, "no catalog entry for sport"),
                }
            }
        }
        Ok(())
    }

    fn register_participant(&mut self, participant: &Value) {
        let Some(id) = int_field(participant, "participant id") else {
            return;
        };
        let Some(source) = participant.get("source") else {
            return;
        };

        let short = str_field(source, "last name")
            .or_else(|| str_field(source, "abbreviation"))
            .or_else(|| str_field(source, "name"));
        if let Some(short) = short {
            self.participants.insert(id, short.to_string());
        }

        let full = match (
            str_field(source, "short name"),
            str_field(source, "nickname"),
            str_field(source, "first name"),
            str_field(source, "last name"),
        ) {
            (Some(short_name), Some(nickname), _, _) => Some(format!("{} {}", short_name, nickname)),
            (_, _, Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => str_field(source, "name").map(str::to_string),
        };
        if let Some(full) = full {
            self.participants_full.insert(id, full);
        }
    }

    /// League-level markets take precedence over the sport's.
    fn markets_for(&self, event: &EventInfo) -> Option<&MarketIndex> {
        if let Some(league) = event.league_id.and_then(|id| self.leagues.get(&id)) {
            return Some(league.markets());
        }
        event
            .sport_id
            .and_then(|id| self.sports.get(&id))
            .map(|sport| sport.markets())
    }

    fn settle(&self, line: &Value, event: &EventInfo, markets: &MarketIndex) -> Option<Settlement> {
        if event.status.as_deref() != Some("complete") {
            return None;
        }
        let scores = event.scores.as_ref().filter(|s| !s.is_empty())?;
        let market_id = int_field(line, "market id")?;
        let participant_id = int_field(line, "participant id")?;
        let kind = markets.kind(market_id)?;

        let line_value = match (number_field(line, "spread / total"), kind) {
            (Some(v), _) => v,
            (None, BetKind::Moneyline) => 0.0,
            (None, _) => return None,
        };
        let decimal_odds = number_field(line, "decimal odds")
            .or_else(|| number_field(line, "american odds").and_then(outcome::american_to_decimal))?;

        let range = PeriodRange::from_config(markets.periods(market_id));
        Some(outcome::settle(
            kind,
            participant_id,
            scores,
            range,
            line_value,
            decimal_odds,
        ))
    }

    fn enrich_one(&self, line: &Value) -> Value {
        let Value::Object(fields) = line else {
            return line.clone();
        };
        let mut out: Map<String, Value> = fields.clone();
        let event = int_field(line, "event id").and_then(|id| self.events.get(&id));

        if let Some(description) = event.and_then(|e| e.description.as_ref()) {
            out.insert("event".to_string(), Value::from(description.as_str()));
        }

        if let Some(event) = event {
            if let Some(markets) = self.markets_for(event) {
                if let Some(name) = int_field(line, "market id").and_then(|id| markets.name(id)) {
                    out.insert("market".to_string(), Value::from(name));
                }
                if let Some(settled) = self.settle(line, event, markets) {
                    out.insert("result".to_string(), Value::from(settled.outcome.label()));
                    out.insert("profit".to_string(), Value::from(settled.profit));
                    out.insert("participant score".to_string(), Value::from(settled.points));
                }
            }
        }

        if let Some(name) = int_field(line, "sportsbook id").and_then(|id| self.catalog.sportsbook_name(id)) {
            out.insert("sportsbook".to_string(), Value::from(name));
        }
        if let Some(participant_id) = int_field(line, "participant id") {
            if let Some(name) = self.participants.get(&participant_id) {
                out.insert("participant".to_string(), Value::from(name.as_str()));
            }
            if let Some(name) = self.participants_full.get(&participant_id) {
                out.insert("participant full name".to_string(), Value::from(name.as_str()));
            }
        }
        Value::Object(out)
    }

    /// Copy of `lines` with derived fields added. Source fields are never
    /// altered and fields that cannot be derived are left out.
    pub fn enrich(&self, lines: &[Value]) -> Vec<Value> {
        lines.iter().map(|line| self.enrich_one(line)).collect()
    }
}

fn int_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key)?.as_str().filter(|s| !s.trim().is_empty())
}

fn parse_scores(value: &Value) -> Option<Vec<PeriodScore>> {
    value
        .as_array()?
        .iter()
        .map(|s| {
            Some(PeriodScore {
                participant_id: int_field(s, "participant id")?,
                period: int_field(s, "period")?,
                points: number_field(s, "points scored")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticSource;
    use serde_json::json;

    fn catalog() -> Catalog {
        let source = StaticSource::new()
            .with("dictionary", json!({}))
            .with("search_dictionary", json!({}))
            .with("args", json!({}))
            .with("fields", json!({}))
            .with(
                "sportsbooks",
                json!({ "sportsbooks": [ { "sportsbook_id": 20, "name": "Pinnacle" } ] }),
            )
            .with(
                "registry",
                json!({ "sports": [ { "id": 4, "key": "football" } ], "leagues": [ { "id": 16, "key": "nfl" }, { "id": 6, "key": "ncaaf" } ] }),
            )
            .with(
                "football",
                json!({
                    "sport_id": 4,
                    "default_market_id": 401,
                    "markets": [
                        { "name": "full game", "url": "full-game", "market_types": [
                            { "market_id": 83, "name": "money line", "url": "money-line" },
                            { "market_id": 402, "name": "total", "url": "totals" }
                        ] },
                        { "name": "1st half", "url": "1st-half", "periods": [1, 3], "market_types": [
                            { "market_id": 397, "name": "point spread", "url": "pointspread" }
                        ] }
                    ]
                }),
            )
            .with(
                "nfl",
                json!({ "league_id": 16, "name": "National Football League", "abbreviation": "NFL", "sport": "football" }),
            )
            .with(
                "ncaaf",
                json!({
                    "league_id": 6,
                    "name": "NCAA Football",
                    "abbreviation": "NCAAF",
                    "sport": "football",
                    "markets": [
                        { "name": "1st quarter", "url": "1st-quarter", "periods": [1, 2], "market_types": [
                            { "market_id": 397, "name": "1st quarter spread", "url": "pointspread" }
                        ] }
                    ]
                }),
            );
        Catalog::load(source).unwrap()
    }

    fn events(status: &str) -> Vec<Value> {
        vec![json!({
            "event id": 100,
            "description": "Pittsburgh @ Baltimore",
            "league id": 16,
            "sport id": 4,
            "event status": status,
            "participants": [
                { "participant id": 1519, "source": { "abbreviation": "PIT", "short name": "Pittsburgh", "nickname": "Steelers", "name": "Pittsburgh" } },
                { "participant id": 1521, "source": { "abbreviation": "BAL", "short name": "Baltimore", "nickname": "Ravens", "name": "Baltimore" } }
            ],
            "scores": [
                { "participant id": 1519, "period": 1, "points scored": 7 },
                { "participant id": 1521, "period": 1, "points scored": 10 },
                { "participant id": 1519, "period": 2, "points scored": 14 },
                { "participant id": 1521, "period": 2, "points scored": 3 },
                { "participant id": 1519, "period": 3, "points scored": 3 },
                { "participant id": 1521, "period": 3, "points scored": 14 },
                { "participant id": 1519, "period": 4, "points scored": 0 },
                { "participant id": 1521, "period": 4, "points scored": 0 }
            ]
        })]
    }

    fn lines() -> Vec<Value> {
        vec![
            json!({ "event id": 100, "market id": 402, "participant id": 15143, "sportsbook id": 20, "spread / total": 45.5, "decimal odds": 1.91 }),
            json!({ "event id": 100, "market id": 397, "participant id": 1519, "sportsbook id": 20, "spread / total": -3.5, "american odds": -110 }),
            json!({ "event id": 100, "market id": 83, "participant id": 1519, "sportsbook id": 99, "decimal odds": 2.2 }),
        ]
    }

    #[test]
    fn test_complete_event_gets_results() {
        let catalog = catalog();
        let evs = events("complete");
        let out = Enricher::new(&catalog, &evs).unwrap().enrich(&lines());

        assert_eq!(out[0]["event"], json!("Pittsburgh @ Baltimore"));
        assert_eq!(out[0]["market"], json!("total"));
        assert_eq!(out[0]["participant"], json!("over"));
        assert_eq!(out[0]["result"], json!("W"));
        assert_eq!(out[0]["participant score"], json!(51.0));
        assert_eq!(out[0]["profit"], json!(91.0));
        assert_eq!(out[0]["sportsbook"], json!("Pinnacle"));

        // 1st half: 21 - 13, covers -3.5
        assert_eq!(out[1]["result"], json!("W"));
        assert_eq!(out[1]["profit"], json!(90.91));
        assert_eq!(out[1]["participant"], json!("PIT"));
        assert_eq!(out[1]["participant full name"], json!("Pittsburgh Steelers"));

        // full game 24 - 27
        assert_eq!(out[2]["result"], json!("L"));
        assert_eq!(out[2]["profit"], json!(-100.0));
        assert!(out[2].get("sportsbook").is_none());
    }

    #[test]
    fn test_incomplete_event_omits_results() {
        let catalog = catalog();
        let evs = events("scheduled");
        let out = Enricher::new(&catalog, &evs).unwrap().enrich(&lines());
        for line in &out {
            assert!(line.get("result").is_none());
            assert!(line.get("profit").is_none());
            assert!(line.get("participant score").is_none());
            assert!(line.get("market").is_some());
        }
    }

    #[test]
    fn test_enrichment_is_idempotent_and_keeps_source_fields() {
        let catalog = catalog();
        let evs = events("complete");
        let enricher = Enricher::new(&catalog, &evs).unwrap();
        let once = enricher.enrich(&lines());
        let twice = enricher.enrich(&once);
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
        assert_eq!(once[1]["american odds"], json!(-110));
        assert_eq!(once[1]["spread / total"], json!(-3.5));
    }

    #[test]
    fn test_unregistered_league_and_sport_skip_market() {
        let catalog = catalog();
        let mut evs = events("complete");
        evs[0]["league id"] = json!(999);
        evs[0]["sport id"] = json!(998);
        let out = Enricher::new(&catalog, &evs).unwrap().enrich(&lines());
        assert!(out[0].get("market").is_none());
        assert!(out[0].get("result").is_none());
        assert_eq!(out[0]["event"], json!("Pittsburgh @ Baltimore"));
    }

    #[test]
    fn test_league_markets_override_sport() {
        let catalog = catalog();
        let mut evs = events("complete");
        evs[0]["league id"] = json!(6);
        let out = Enricher::new(&catalog, &evs).unwrap().enrich(&lines());

        // 1st quarter only: 7 - 10, does not cover -3.5
        assert_eq!(out[1]["market"], json!("1st quarter spread"));
        assert_eq!(out[1]["result"], json!("L"));
        assert_eq!(out[1]["profit"], json!(-100.0));
        assert_eq!(out[1]["participant score"], json!(7.0));
        // not in the league's list
        assert!(out[0].get("market").is_none());
        assert!(out[0].get("result").is_none());
    }

    #[test]
    fn test_unregistered_league_falls_back_to_sport() {
        let catalog = catalog();
        let mut evs = events("complete");
        evs[0]["league id"] = json!(999);
        let out = Enricher::new(&catalog, &evs).unwrap().enrich(&lines());

        assert_eq!(out[0]["market"], json!("total"));
        assert_eq!(out[0]["result"], json!("W"));
        assert_eq!(out[1]["market"], json!("point spread"));
        assert_eq!(out[1]["result"], json!("W"));
        assert_eq!(out[1]["participant score"], json!(21.0));
    }

    #[test]
    fn test_individual_participant_names() {
        let catalog = catalog();
        let evs = vec![json!({
            "event id": 200,
            "league id": 16,
            "sport id": 4,
            "event status": "scheduled",
            "participants": [
                { "participant id": 5001, "source": { "first name": "Tiger", "last name": "Woods", "abbreviation": "TW" } },
                { "participant id": 5002, "source": { "abbreviation": "PM", "name": "Phil Mickelson" } }
            ]
        })];
        let lines = vec![
            json!({ "event id": 200, "market id": 83, "participant id": 5001, "decimal odds": 1.5 }),
            json!({ "event id": 200, "market id": 83, "participant id": 5002, "decimal odds": 2.5 }),
        ];
        let out = Enricher::new(&catalog, &evs).unwrap().enrich(&lines);

        assert_eq!(out[0]["participant"], json!("Woods"));
        assert_eq!(out[0]["participant full name"], json!("Tiger Woods"));
        assert_eq!(out[1]["participant"], json!("PM"));
        assert_eq!(out[1]["participant full name"], json!("Phil Mickelson"));
        assert!(out[0].get("event").is_none());
    }
}
