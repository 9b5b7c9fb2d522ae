//! Descriptors for every supported query and the builders that pair a
//! descriptor with resolved argument values.

use crate::engine::translate::datetime_to_millis;
use crate::graphql::request::{ArgValue, Args};
use chrono::{DateTime, TimeZone};

/// How records are pulled out of the raw response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// `raw[operation]`, then each subpath key in turn.
    Path,
    /// `raw[operation][*].lines[0]`
    FirstLineOfEach,
    /// `raw[operation][*].events[*]`
    FlattenEvents,
}

/// Line-shaped queries can be enriched from a companion events query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    NotLines,
    /// Noise keys stripped before translation.
    Lines,
    /// Returned as-is.
    Consensus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryKind {
    pub name: &'static str,
    pub operation: &'static str,
    pub fields: Option<&'static str>,
    pub subpath: &'static [&'static str],
    pub sublists: &'static [&'static str],
    pub id_key: Option<&'static str>,
    pub extract: Extract,
    pub lines: LineMode,
}

impl QueryKind {
    pub fn is_lines(&self) -> bool {
        self.lines != LineMode::NotLines
    }
}

const fn kind(name: &'static str, operation: &'static str, fields: &'static str) -> QueryKind {
    QueryKind {
        name,
        operation,
        fields: Some(fields),
        subpath: &[],
        sublists: &[],
        id_key: None,
        extract: Extract::Path,
        lines: LineMode::NotLines,
    }
}

const fn events(name: &'static str, operation: &'static str) -> QueryKind {
    QueryKind {
        subpath: &["events"],
        sublists: &["participants", "scores"],
        id_key: Some("event id"),
        ..kind(name, operation, "event")
    }
}

const fn lines(name: &'static str, operation: &'static str) -> QueryKind {
    QueryKind {
        fields: None,
        lines: LineMode::Lines,
        ..kind(name, operation, "")
    }
}

pub const EVENTS_BY_DATE: QueryKind = events("events_by_date", "eventsByDateNew");
pub const EVENTS_BY_DATE_RANGE: QueryKind = events("events_by_date_range", "eventsV2");
pub const EVENTS_BY_EVENT_GROUP: QueryKind = events("events_by_event_group", "eventsByEventGroupV2");
pub const EVENTS_BY_EVENT_IDS: QueryKind = events("events_by_event_ids", "eventsV2");
pub const EVENTS_BY_MATCHUP: QueryKind = events("events_by_matchup", "lastMatchupsByParticipants");
pub const EVENTS_BY_PARTICIPANTS_RECENT: QueryKind = QueryKind {
    subpath: &[],
    sublists: &["participants"],
    extract: Extract::FlattenEvents,
    ..events("events_by_participants_recent", "eventsInfoByParticipant")
};
pub const EVENT_GROUPS_BY_LEAGUE: QueryKind = QueryKind {
    id_key: Some("event group id"),
    ..kind("event_groups_by_league", "eventGroupsByLeague", "event_group")
};
pub const EVENT_MARKETS: QueryKind = QueryKind {
    subpath: &["mtids"],
    ..kind("event_markets", "eventMarkets", "market_types")
};
pub const LEAGUE_HIERARCHY: QueryKind = QueryKind {
    id_key: Some("team id"),
    ..kind("league_hierarchy", "leagueHierarchy", "league_hierarchy")
};
pub const LEAGUE_MARKETS: QueryKind = QueryKind {
    id_key: Some("market id"),
    ..kind("league_markets", "leagueMarkets", "league_market")
};
pub const LEAGUES_BY_IDS: QueryKind = QueryKind {
    id_key: Some("league id"),
    ..kind("leagues_by_ids", "leagues", "leagues")
};
pub const MARKETS_BY_IDS: QueryKind = QueryKind {
    id_key: Some("market id"),
    ..kind("markets_by_ids", "marketTypesById", "markets_by_id")
};
pub const SEARCH_EVENTS: QueryKind = QueryKind {
    id_key: Some("event id"),
    sublists: &["participants"],
    ..kind("search_events", "searchEvent", "search_event")
};
pub const SEARCH_LEAGUES: QueryKind = QueryKind {
    subpath: &["searchLeague"],
    id_key: Some("league id"),
    ..kind("search_leagues", "multipleSearch", "search_league")
};
pub const SEARCH_SPORTS: QueryKind = QueryKind {
    subpath: &["searchSport"],
    id_key: Some("sport id"),
    ..kind("search_sports", "multipleSearch", "search_sport")
};
pub const SPORTSBOOKS: QueryKind = QueryKind {
    id_key: Some("sportsbook id"),
    ..kind("sportsbooks", "sportsbooks", "sportsbooks")
};
pub const TEAM: QueryKind = QueryKind {
    id_key: Some("team id"),
    ..kind("team", "team", "team")
};
pub const BEST_LINES: QueryKind = lines("best_lines", "bestLines");
pub const CURRENT_LINES: QueryKind = lines("current_lines", "currentLines");
pub const OPENING_LINES: QueryKind = lines("opening_lines", "openingLines");
pub const LINE_HISTORY: QueryKind = QueryKind {
    fields: Some("line_history"),
    extract: Extract::FirstLineOfEach,
    ..lines("line_history", "lineHistory")
};
pub const CONSENSUS: QueryKind = QueryKind {
    fields: Some("consensus"),
    lines: LineMode::Consensus,
    ..lines("consensus", "consensus")
};
pub const CONSENSUS_HISTORY: QueryKind = QueryKind {
    fields: Some("consensus_history"),
    ..lines("consensus_history", "consensusHistory")
};

/// A descriptor plus the argument template key and values to fill it with.
#[derive(Debug, Clone)]
pub struct Request {
    pub kind: &'static QueryKind,
    pub args_template: &'static str,
    pub args: Args,
}

impl Request {
    fn new(kind: &'static QueryKind, args_template: &'static str) -> Self {
        Self {
            kind,
            args_template,
            args: Args::new(),
        }
    }

    fn arg(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.args.insert(name.to_string(), value.into());
        self
    }
}

fn search(term: &str) -> ArgValue {
    ArgValue::List(vec![ArgValue::from(term)])
}

/// Events on the day containing `date`.
pub fn events_by_date<Tz: TimeZone>(league_ids: &[i64], date: &DateTime<Tz>) -> Request {
    Request::new(&EVENTS_BY_DATE, "date")
        .arg("lids", league_ids)
        .arg("timestamp", datetime_to_millis(date))
}

pub fn events_by_date_range<Tz: TimeZone>(
    league_ids: &[i64],
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
) -> Request {
    Request::new(&EVENTS_BY_DATE_RANGE, "date_range")
        .arg("lids", league_ids)
        .arg("start", datetime_to_millis(start))
        .arg("end", datetime_to_millis(end))
}

/// Event group ids repeat across seasons, so the season is required.
pub fn events_by_event_group(league_id: i64, event_group_id: i64, season_id: i64, market_id: i64) -> Request {
    Request::new(&EVENTS_BY_EVENT_GROUP, "event_group")
        .arg("lid", league_id)
        .arg("seid", season_id)
        .arg("egid", event_group_id)
        .arg("mtid", market_id)
}

pub fn events_by_event_ids(event_ids: &[i64]) -> Request {
    Request::new(&EVENTS_BY_EVENT_IDS, "event_ids").arg("eids", event_ids)
}

/// Last `count` head-to-head events between two participants.
pub fn events_by_matchup(participant_id1: i64, participant_id2: i64, count: i64) -> Request {
    Request::new(&EVENTS_BY_MATCHUP, "matchup")
        .arg("partid1", participant_id1)
        .arg("partid2", participant_id2)
        .arg("limit", count)
}

/// The service returns only the few most recent events per participant.
pub fn events_by_participants_recent(participant_ids: &[i64]) -> Request {
    Request::new(&EVENTS_BY_PARTICIPANTS_RECENT, "participants").arg("partids", participant_ids)
}

pub fn event_groups_by_league(league_id: i64) -> Request {
    Request::new(&EVENT_GROUPS_BY_LEAGUE, "league_id").arg("lid", league_id)
}

pub fn event_markets(event_id: i64) -> Request {
    Request::new(&EVENT_MARKETS, "event_id").arg("eid", event_id)
}

pub fn league_hierarchy(league_id: i64) -> Request {
    Request::new(&LEAGUE_HIERARCHY, "league_ids").arg("lids", vec![league_id])
}

pub fn league_markets(league_id: i64) -> Request {
    Request::new(&LEAGUE_MARKETS, "league_ids").arg("lids", vec![league_id])
}

pub fn leagues_by_ids(league_ids: &[i64]) -> Request {
    Request::new(&LEAGUES_BY_IDS, "league_ids").arg("lids", league_ids)
}

pub fn markets_by_ids(market_ids: &[i64], sport_id: i64) -> Request {
    Request::new(&MARKETS_BY_IDS, "market_ids")
        .arg("mtids", market_ids)
        .arg("spids", vec![sport_id])
}

pub fn search_events(term: &str) -> Request {
    Request::new(&SEARCH_EVENTS, "search").arg("search_term", search(term))
}

pub fn search_leagues(term: &str) -> Request {
    Request::new(&SEARCH_LEAGUES, "search").arg("search_term", search(term))
}

pub fn search_sports(term: &str) -> Request {
    Request::new(&SEARCH_SPORTS, "search").arg("search_term", search(term))
}

pub fn sportsbooks(sportsbook_ids: &[i64]) -> Request {
    Request::new(&SPORTSBOOKS, "sportsbooks").arg("sbids", sportsbook_ids)
}

pub fn team(team_id: i64) -> Request {
    Request::new(&TEAM, "team_id").arg("tmid", team_id)
}

pub fn best_lines(event_ids: &[i64], market_ids: Option<&[i64]>) -> Request {
    match market_ids {
        Some(market_ids) => Request::new(&BEST_LINES, "lines")
            .arg("eids", event_ids)
            .arg("mtids", market_ids),
        None => Request::new(&BEST_LINES, "event_ids").arg("eids", event_ids),
    }
}

pub fn current_lines(event_ids: &[i64], market_ids: &[i64], sportsbook_ids: Option<&[i64]>) -> Request {
    let request = Request::new(&CURRENT_LINES, "lines")
        .arg("eids", event_ids)
        .arg("mtids", market_ids);
    match sportsbook_ids {
        Some(ids) => Request {
            args_template: "lines_multi_book",
            ..request
        }
        .arg("paids", ids),
        None => request,
    }
}

pub fn opening_lines(event_ids: &[i64], market_ids: &[i64], sportsbook_id: Option<i64>) -> Request {
    let request = Request::new(&OPENING_LINES, "lines")
        .arg("eids", event_ids)
        .arg("mtids", market_ids);
    match sportsbook_id {
        Some(id) => Request {
            args_template: "lines_one_book",
            ..request
        }
        .arg("paid", id),
        None => request,
    }
}

/// The service requires participant ids even though one is enough.
pub fn line_history(event_id: i64, market_id: i64, sportsbook_id: i64, participant_ids: &[i64]) -> Request {
    Request::new(&LINE_HISTORY, "line_history")
        .arg("eid", event_id)
        .arg("mtid", market_id)
        .arg("paid", sportsbook_id)
        .arg("partids", participant_ids)
}

pub fn consensus(event_ids: &[i64], market_ids: &[i64]) -> Request {
    Request::new(&CONSENSUS, "lines")
        .arg("eids", event_ids)
        .arg("mtids", market_ids)
}

pub fn consensus_history(event_id: i64, market_ids: &[i64]) -> Request {
    Request::new(&CONSENSUS_HISTORY, "consensus_history")
        .arg("eid", event_id)
        .arg("mtids", market_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_event_descriptors() {
        assert_eq!(EVENTS_BY_DATE_RANGE.operation, "eventsV2");
        assert_eq!(EVENTS_BY_DATE_RANGE.subpath, &["events"]);
        assert_eq!(EVENTS_BY_DATE_RANGE.id_key, Some("event id"));
        assert_eq!(EVENTS_BY_PARTICIPANTS_RECENT.extract, Extract::FlattenEvents);
        assert!(EVENTS_BY_PARTICIPANTS_RECENT.subpath.is_empty());
    }

    #[test]
    fn test_lines_descriptors() {
        assert!(BEST_LINES.fields.is_none());
        assert_eq!(BEST_LINES.lines, LineMode::Lines);
        assert_eq!(BEST_LINES.id_key, None);
        assert_eq!(LINE_HISTORY.extract, Extract::FirstLineOfEach);
        assert_eq!(CONSENSUS.lines, LineMode::Consensus);
        assert_eq!(CONSENSUS_HISTORY.fields, Some("consensus_history"));
        assert!(!TEAM.is_lines());
    }

    #[test]
    fn test_alternate_argument_templates() {
        assert_eq!(best_lines(&[1], None).args_template, "event_ids");
        assert_eq!(best_lines(&[1], Some(&[83][..])).args_template, "lines");
        let books = current_lines(&[1], &[83], Some(&[20, 9][..]));
        assert_eq!(books.args_template, "lines_multi_book");
        assert_eq!(books.args["paids"].render(), "[20, 9]");
        assert_eq!(opening_lines(&[1], &[83], Some(20)).args_template, "lines_one_book");
        assert_eq!(opening_lines(&[1], &[83], None).args_template, "lines");
    }

    #[test]
    fn test_date_args_are_epoch_millis() {
        let start = Utc.with_ymd_and_hms(2020, 9, 13, 12, 26, 40).unwrap();
        let request = events_by_date_range(&[16], &start, &start);
        assert_eq!(request.args["start"], ArgValue::Int(1_600_000_000_000));
        assert_eq!(request.args["lids"].render(), "[16]");
    }

    #[test]
    fn test_search_term_is_quoted_list() {
        assert_eq!(search_leagues("nfl").args["search_term"].render(), "[\"nfl\"]");
    }
}
