pub mod kinds;

pub use kinds::{Extract, LineMode, QueryKind, Request};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::engine::enricher::Enricher;
use crate::engine::resolver::dedup_ordered;
use crate::engine::table::Table;
use crate::engine::translate::strip_line_noise;
use crate::error::{Result, SbrError};
use crate::graphql::request::{build_query_string, substitute};
use crate::graphql::{HttpTransport, Transport};
use anyhow::Context;
use chrono::{DateTime, TimeZone};
use serde_json::Value;
use std::sync::{Arc, Mutex, OnceLock};

/// Entry point: resolves templates, runs queries and hands back [`Query`]s.
#[derive(Clone)]
pub struct SbrClient {
    transport: Arc<dyn Transport>,
    catalog: Arc<Catalog>,
}

impl SbrClient {
    pub fn new(transport: Arc<dyn Transport>, catalog: Arc<Catalog>) -> Self {
        Self { transport, catalog }
    }

    /// HTTP transport and on-disk catalog as described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = HttpTransport::from_config(config).context("failed to set up HTTP transport")?;
        let catalog = Catalog::from_dir(&config.catalog.dir)
            .with_context(|| format!("failed to load catalog from {}", config.catalog.dir.display()))?;
        Ok(Self::new(Arc::new(transport), Arc::new(catalog)))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn render(&self, request: &Request) -> Result<String> {
        let template = self.catalog.args_template(request.args_template)?;
        let args = substitute(template, &request.args)?;
        let fields = match request.kind.fields {
            Some(key) => Some(self.catalog.fields_template(key)?),
            None => None,
        };
        Ok(build_query_string(request.kind.operation, &args, fields))
    }

    /// Run `request` once and wrap the response.
    pub async fn query(&self, request: Request) -> Result<Query> {
        let text = self.render(&request)?;
        let operation = request.kind.operation;
        tracing::debug!(operation, query_len = text.len(), "executing query");
        let raw = self.transport.execute(&text).await.map_err(|e| {
            tracing::warn!(operation, error = %e, "query failed");
            e
        })?;
        Ok(Query::new(request.kind, self.catalog.clone(), raw))
    }

    /// Events in `league_id` between `start` and `end` involving any of
    /// `participant_ids`. Two round-trips: the league's events over the range,
    /// then full records for the matching event ids.
    pub async fn events_by_participants<Tz: TimeZone>(
        &self,
        participant_ids: &[i64],
        league_id: i64,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<Query> {
        let in_range = self
            .query(kinds::events_by_date_range(&[league_id], start, end))
            .await?;
        let event_ids: Vec<i64> = in_range
            .list()
            .iter()
            .filter(|event| involves_any(event, participant_ids))
            .filter_map(|event| event.get("event id").and_then(Value::as_i64))
            .collect();
        tracing::debug!(
            league_id,
            candidates = in_range.list().len(),
            matched = event_ids.len(),
            "filtered events by participant"
        );
        self.query(kinds::events_by_event_ids(&dedup_ordered(event_ids)))
            .await
    }
}

fn involves_any(event: &Value, participant_ids: &[i64]) -> bool {
    event
        .get("participants")
        .and_then(Value::as_array)
        .map(|ps| {
            ps.iter().any(|p| {
                p.get("participant id")
                    .and_then(Value::as_i64)
                    .is_some_and(|id| participant_ids.contains(&id))
            })
        })
        .unwrap_or(false)
}

struct EnrichedCache {
    events: Vec<Value>,
    records: Arc<Vec<Value>>,
}

/// One executed query. The response is fixed at construction; every accessor
/// derives from it.
pub struct Query {
    kind: &'static QueryKind,
    catalog: Arc<Catalog>,
    raw: Value,
    records: OnceLock<Vec<Value>>,
    enriched: Mutex<Option<EnrichedCache>>,
}

impl Query {
    pub fn new(kind: &'static QueryKind, catalog: Arc<Catalog>, raw: Value) -> Self {
        Self {
            kind,
            catalog,
            raw,
            records: OnceLock::new(),
            enriched: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> &'static QueryKind {
        self.kind
    }

    /// Response `data` exactly as the service returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Normalized records. Always a list, even when the service answered with
    /// a single object.
    pub fn list(&self) -> &[Value] {
        self.records.get_or_init(|| {
            let extracted = extract(self.kind, &self.raw);
            let translations = self.catalog.translations();
            extracted
                .iter()
                .map(|record| match self.kind.lines {
                    LineMode::Lines => translations.normalize(&strip_line_noise(record)),
                    LineMode::Consensus | LineMode::NotLines => translations.normalize(record),
                })
                .collect()
        })
    }

    /// Distinct values of this query's identifying field, in response order.
    pub fn ids(&self) -> Result<Vec<i64>> {
        let id_key = self.kind.id_key.ok_or(SbrError::Capability {
            query: self.kind.name,
            accessor: "ids",
        })?;
        Ok(dedup_ordered(
            self.list()
                .iter()
                .filter_map(|record| record.get(id_key).and_then(Value::as_i64)),
        ))
    }

    pub fn table(&self) -> Table {
        Table::from_records(self.list(), self.kind.sublists)
    }

    /// Line records with event, market, sportsbook and participant names, plus
    /// bet results for completed events. Computed once per companion events
    /// query and reused.
    pub fn list_with_events(&self, events: &Query) -> Result<Arc<Vec<Value>>> {
        if !self.kind.is_lines() {
            return Err(SbrError::Capability {
                query: self.kind.name,
                accessor: "list_with_events",
            });
        }
        let mut cache = self.enriched.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.as_ref() {
            if cached.events.as_slice() == events.list() {
                return Ok(cached.records.clone());
            }
        }
        let enricher = Enricher::new(&self.catalog, events.list())?;
        let records = Arc::new(enricher.enrich(self.list()));
        *cache = Some(EnrichedCache {
            events: events.list().to_vec(),
            records: records.clone(),
        });
        Ok(records)
    }

    pub fn table_with_events(&self, events: &Query) -> Result<Table> {
        let records = self.list_with_events(events)?;
        Ok(Table::from_records(&records, self.kind.sublists))
    }
}

fn extract(kind: &QueryKind, raw: &Value) -> Vec<Value> {
    let root = raw.get(kind.operation).unwrap_or(&Value::Null);
    match kind.extract {
        Extract::Path => {
            let mut node = vec![root.clone()];
            for key in kind.subpath {
                node = node
                    .iter()
                    .flat_map(|v| match v {
                        Value::Array(items) => items.iter().filter_map(|i| i.get(*key).cloned()).collect(),
                        other => other.get(*key).cloned().into_iter().collect::<Vec<_>>(),
                    })
                    .collect();
            }
            node.into_iter().flat_map(into_records).collect()
        }
        Extract::FirstLineOfEach => elements(root)
            .iter()
            .filter_map(|el| el.get("lines").and_then(|l| l.get(0)).cloned())
            .collect(),
        Extract::FlattenEvents => elements(root)
            .iter()
            .flat_map(|el| el.get("events").map(elements).unwrap_or_default())
            .collect(),
    }
}

fn elements(value: &Value) -> Vec<Value> {
    value.as_array().cloned().unwrap_or_default()
}

fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}
