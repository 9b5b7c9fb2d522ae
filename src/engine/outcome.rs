use super::index::BetKind;

/// Reserved participant ids the service uses for the two sides of a totals market.
pub const OVER_PARTICIPANT_ID: i64 = 15143;
pub const UNDER_PARTICIPANT_ID: i64 = 15144;

/// Flat stake that profit is quoted against.
pub const STAKE: f64 = 100.0;

pub fn is_total_side(participant_id: i64) -> bool {
    participant_id == OVER_PARTICIPANT_ID || participant_id == UNDER_PARTICIPANT_ID
}

/// Points one participant scored in one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodScore {
    pub participant_id: i64,
    pub period: i64,
    pub points: f64,
}

/// Periods a market is settled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodRange {
    All,
    /// Half-open: `start..end`.
    Span { start: i64, end: i64 },
}

impl PeriodRange {
    /// `[a, b]` is `a..b`, `[a]` is period `a` alone, nothing means every period.
    pub fn from_config(periods: Option<&[i64]>) -> Self {
        match periods {
            Some([single]) => PeriodRange::Span {
                start: *single,
                end: single + 1,
            },
            Some([first, .., last]) => PeriodRange::Span {
                start: *first,
                end: *last,
            },
            _ => PeriodRange::All,
        }
    }

    pub fn contains(&self, period: i64) -> bool {
        match self {
            PeriodRange::All => true,
            PeriodRange::Span { start, end } => (*start..*end).contains(&period),
        }
    }
}

/// Points for the line's side and for the other side over the settled periods.
/// Totals markets put the combined score in `points` and leave `opponent` at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tally {
    pub points: f64,
    pub opponent: f64,
}

pub fn tally_points(scores: &[PeriodScore], participant_id: i64, range: PeriodRange) -> Tally {
    let in_range = scores.iter().filter(|s| range.contains(s.period));
    if is_total_side(participant_id) {
        return Tally {
            points: in_range.map(|s| s.points).sum(),
            opponent: 0.0,
        };
    }
    let mut tally = Tally {
        points: 0.0,
        opponent: 0.0,
    };
    for s in in_range {
        if s.participant_id == participant_id {
            tally.points += s.points;
        } else {
            tally.opponent += s.points;
        }
    }
    tally
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetOutcome {
    Win,
    Loss,
}

impl BetOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            BetOutcome::Win => "W",
            BetOutcome::Loss => "L",
        }
    }
}

/// Settle a line. Pushes count as losses.
pub fn evaluate(kind: &BetKind, participant_id: i64, tally: Tally, line_value: f64) -> BetOutcome {
    let won = match kind {
        BetKind::Total => {
            (participant_id == OVER_PARTICIPANT_ID && tally.points > line_value)
                || (participant_id == UNDER_PARTICIPANT_ID && tally.points < line_value)
        }
        _ => tally.points + line_value > tally.opponent,
    };
    if won {
        BetOutcome::Win
    } else {
        BetOutcome::Loss
    }
}

/// Profit on a flat stake, rounded to cents.
pub fn profit(outcome: BetOutcome, decimal_odds: f64) -> f64 {
    match outcome {
        BetOutcome::Win => ((decimal_odds - 1.0) * STAKE * 100.0).round() / 100.0,
        BetOutcome::Loss => -STAKE,
    }
}

pub fn american_to_decimal(american: f64) -> Option<f64> {
    if american > 0.0 {
        Some(1.0 + american / 100.0)
    } else if american < 0.0 {
        Some(1.0 + 100.0 / american.abs())
    } else {
        None
    }
}

/// Settled bet: outcome, profit and the points the line's side scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub outcome: BetOutcome,
    pub profit: f64,
    pub points: f64,
}

pub fn settle(
    kind: &BetKind,
    participant_id: i64,
    scores: &[PeriodScore],
    range: PeriodRange,
    line_value: f64,
    decimal_odds: f64,
) -> Settlement {
    let tally = tally_points(scores, participant_id, range);
    let outcome = evaluate(kind, participant_id, tally, line_value);
    Settlement {
        outcome,
        profit: profit(outcome, decimal_odds),
        points: tally.points,
    }
}
