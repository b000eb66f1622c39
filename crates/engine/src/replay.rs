//! Deterministic, tick-counted replay
//!
//! Replays a recorded tick sequence through the normal ingestion path and
//! evaluates each symbol every `eval_every` of its own ticks instead of on a
//! wall-clock interval. Evaluation goes through the same routine a running
//! trader uses, so replay and live cadence differ only in their trigger.
//!
//! Replay evaluators are separate from any trader started on the wrapped
//! engine. Running both for the same symbol at once is not coordinated.

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::trader::Trader;
use kestrel_core::{Symbol, TickRecord};
use std::borrow::Borrow;
use std::collections::HashMap;

/// Outcome of one replay run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Ticks ingested
    pub ticks: usize,
    /// Evaluations per symbol
    pub evaluations: HashMap<Symbol, usize>,
    /// Evaluations that dispatched an order
    pub orders: usize,
}

impl ReplayReport {
    /// Evaluations across all symbols
    pub fn total_evaluations(&self) -> usize {
        self.evaluations.values().sum()
    }
}

/// Engine wrapper that drives evaluation from tick counts
pub struct ReplayEngine<O> {
    engine: Engine<O>,
}

impl<O: Send + 'static> ReplayEngine<O> {
    pub fn new(engine: Engine<O>) -> Self {
        Self { engine }
    }

    /// The wrapped engine
    pub fn engine(&self) -> &Engine<O> {
        &self.engine
    }

    /// Unwrap the engine
    pub fn into_inner(self) -> Engine<O> {
        self.engine
    }

    /// Ingest `records` in order, evaluating each symbol after every
    /// `eval_every` of its ticks
    ///
    /// The first `skip` ticks of each symbol are ingested without counting,
    /// and the tick that ends the skipped prefix never evaluates: with
    /// `skip = 1` and `eval_every = 3` evaluations land on ticks 4, 7, 10.
    /// Evaluators and counters only live for this call. Stops at the first
    /// invalid record; ticks before it stay ingested.
    pub fn replay<I>(&self, records: I, eval_every: usize, skip: usize) -> EngineResult<ReplayReport>
    where
        I: IntoIterator,
        I::Item: Borrow<TickRecord>,
    {
        if eval_every == 0 {
            return Err(EngineError::InvalidArgument(
                "eval_every must be at least 1".to_string(),
            ));
        }

        let eval_every = eval_every as i64;
        let skip = skip as i64;
        let mut counters: HashMap<Symbol, i64> = HashMap::new();
        let mut evaluators: HashMap<Symbol, Trader<O>> = HashMap::new();
        let mut report = ReplayReport::default();

        for record in records {
            let record: &TickRecord = record.borrow();
            self.engine.tick(record)?;
            report.ticks += 1;

            let counter = counters.entry(record.symbol.clone()).or_insert(-skip);
            *counter += 1;
            // Zero is the end of the skipped prefix, not a full count
            if *counter <= 0 || *counter % eval_every != 0 {
                continue;
            }
            *counter = 0;

            let evaluator = evaluators
                .entry(record.symbol.clone())
                .or_insert_with(|| self.engine.build_trader(&record.symbol));

            if evaluator.force_evaluate() {
                report.orders += 1;
            }
            *report.evaluations.entry(record.symbol.clone()).or_insert(0) += 1;
        }

        log::info!(
            "Replayed {} ticks: {} evaluations, {} orders",
            report.ticks,
            report.total_evaluations(),
            report.orders
        );
        Ok(report)
    }

    /// Replay newline-delimited JSON tick payloads
    ///
    /// Every line is parsed before any tick is ingested, so a malformed line
    /// leaves storage untouched. Blank lines are ignored.
    pub fn replay_json_lines(
        &self,
        lines: &str,
        eval_every: usize,
        skip: usize,
    ) -> EngineResult<ReplayReport> {
        let records = lines
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(TickRecord::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        self.replay(&records, eval_every, skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::{TimeZone, Utc};
    use kestrel_clock::ManualClock;
    use kestrel_core::{Price, Timestamp, ValidationError};
    use kestrel_storage::Storage;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn t(secs: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    fn replay_engine() -> ReplayEngine<Price> {
        let factory = |symbol: &str, storage: Arc<Storage>| {
            Trader::new(
                symbol,
                storage,
                |series: &[(Timestamp, Price)]| series.last().map(|(_, p)| *p),
                Arc::new(|_: Price| {}),
            )
        };
        let engine =
            Engine::with_clock(EngineConfig::default(), ManualClock::new(Some(t(0))), factory)
                .unwrap();
        ReplayEngine::new(engine)
    }

    #[test]
    fn test_zero_eval_every_rejected() {
        let replay = replay_engine();
        let result = replay.replay(Vec::<TickRecord>::new(), 0, 0);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_counts_are_per_symbol() {
        let replay = replay_engine();
        let records: Vec<_> = (0..6)
            .map(|i| {
                let symbol = if i % 2 == 0 { "A" } else { "B" };
                TickRecord::new(symbol, dec!(1), t(i))
            })
            .collect();

        let report = replay.replay(&records, 3, 0).unwrap();

        assert_eq!(report.ticks, 6);
        assert_eq!(report.evaluations.get("A"), Some(&1));
        assert_eq!(report.evaluations.get("B"), Some(&1));
        assert_eq!(report.orders, 2);
    }

    #[test]
    fn test_skipped_prefix_does_not_evaluate() {
        let replay = replay_engine();
        let records: Vec<_> = (1..=4).map(|i| TickRecord::new("A", dec!(1), t(i))).collect();

        // Ticks 1..=3 cannot evaluate; tick 4 completes the first full count
        let report = replay.replay(&records[..3], 3, 1).unwrap();
        assert_eq!(report.total_evaluations(), 0);

        let report = replay.replay(&records, 3, 1).unwrap();
        assert_eq!(report.evaluations.get("A"), Some(&1));
    }

    #[test]
    fn test_invalid_record_stops_replay() {
        let replay = replay_engine();
        let records = vec![
            TickRecord::new("A", dec!(1), t(0)),
            TickRecord::new("A", dec!(-1), t(1)),
            TickRecord::new("A", dec!(2), t(2)),
        ];

        let result = replay.replay(&records, 1, 0);

        assert!(matches!(
            result,
            Err(EngineError::Validation(ValidationError::NegativePrice(_)))
        ));
        assert_eq!(replay.engine().storage().with_partition("A", |s| s.len()), 1);
    }

    #[test]
    fn test_json_lines_parsed_before_ingest() {
        let replay = replay_engine();
        let lines = "{\"symbol\": \"A\", \"price\": 1}\nnot json\n";

        let result = replay.replay_json_lines(lines, 1, 0);

        assert!(matches!(
            result,
            Err(EngineError::Validation(ValidationError::Malformed(_)))
        ));
        assert!(replay.engine().storage().is_empty());
    }

    #[test]
    fn test_json_lines_replay() {
        let replay = replay_engine();
        let lines = r#"
            {"symbol": "A", "price": 1, "timestamp": "2024-01-01T00:00:01Z"}

            {"symbol": "A", "price": 2, "timestamp": "2024-01-01T00:00:02Z"}
        "#;

        let report = replay.replay_json_lines(lines, 2, 0).unwrap();

        assert_eq!(report.ticks, 2);
        assert_eq!(report.total_evaluations(), 1);
        assert_eq!(replay.into_inner().storage().with_partition("A", |s| s.len()), 2);
    }
}
