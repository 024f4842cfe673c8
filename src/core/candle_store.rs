use std::cmp::Ordering;

use tracing::{debug, trace, warn};

use crate::core::Candle;
use crate::error::{ChartError, ChartResult};

/// Where an incoming candle lands relative to the current tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Store is empty.
    First,
    /// Falls inside the tail's interval: in-place update of the open bar.
    TailUpdate,
    /// At or after the next interval boundary.
    NewBar,
    /// Older than the tail; earlier bars are immutable.
    Stale,
    Invalid,
}

/// Result of [`CandleStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpsertOutcome {
    Rejected,
    Appended { index: usize },
    TailUpdated { index: usize, previous: Candle },
    /// A bar with the same key already existed and was overwritten.
    Replaced { index: usize },
    /// Incoming flat placeholder ignored in favour of a real bar.
    Ignored,
    Stale,
}

impl UpsertOutcome {
    /// `true` when the stored series changed.
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(
            self,
            Self::Appended { .. } | Self::TailUpdated { .. } | Self::Replaced { .. }
        )
    }
}

/// Ordered bar series with unique `open_time` keys.
///
/// Only the last element is mutated in place; history grows by prepend and
/// the whole series is replaced atomically on reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleStore {
    candles: Vec<Candle>,
    interval_ms: i64,
}

impl CandleStore {
    pub fn new(interval_ms: i64) -> ChartResult<Self> {
        Ok(Self {
            candles: Vec::new(),
            interval_ms: validate_interval(interval_ms)?,
        })
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[must_use]
    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    #[must_use]
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn validate(candle: &Candle) -> ChartResult<()> {
        candle.validate()
    }

    #[must_use]
    pub fn classify(&self, candle: &Candle) -> Placement {
        if !candle.is_valid() {
            return Placement::Invalid;
        }
        let Some(last) = self.candles.last() else {
            return Placement::First;
        };
        let t = candle.open_time;
        if t < last.open_time {
            Placement::Stale
        } else if t < last.open_time.saturating_add(self.interval_ms) {
            Placement::TailUpdate
        } else {
            Placement::NewBar
        }
    }

    /// Streaming insert. Invalid candles are dropped and reported as
    /// [`UpsertOutcome::Rejected`].
    pub fn upsert(&mut self, candle: Candle) -> UpsertOutcome {
        match self.classify(&candle) {
            Placement::Invalid => {
                trace!(open_time = candle.open_time, "dropped invalid candle");
                UpsertOutcome::Rejected
            }
            Placement::Stale => {
                trace!(open_time = candle.open_time, "dropped stale candle");
                UpsertOutcome::Stale
            }
            Placement::First => {
                self.candles.push(candle);
                debug!(open_time = candle.open_time, "first candle");
                UpsertOutcome::Appended { index: 0 }
            }
            Placement::TailUpdate => {
                let index = self.candles.len() - 1;
                let previous = self.candles[index];
                self.candles[index] = Candle {
                    open_time: previous.open_time,
                    ..candle
                };
                trace!(index, close = candle.close, "tail update");
                UpsertOutcome::TailUpdated { index, previous }
            }
            Placement::NewBar => self.insert_new_bar(candle),
        }
    }

    fn insert_new_bar(&mut self, candle: Candle) -> UpsertOutcome {
        match self
            .candles
            .binary_search_by(|probe| probe.open_time.cmp(&candle.open_time))
        {
            Ok(index) => {
                let existing = self.candles[index];
                if existing.is_flat() || !candle.is_flat() {
                    self.candles[index] = candle;
                    debug!(index, open_time = candle.open_time, "replaced bar");
                    UpsertOutcome::Replaced { index }
                } else {
                    trace!(
                        open_time = candle.open_time,
                        "ignored placeholder over real bar"
                    );
                    UpsertOutcome::Ignored
                }
            }
            Err(_) => {
                self.candles.push(candle);
                self.candles.sort_by_key(|c| c.open_time);
                let index = self
                    .candles
                    .partition_point(|c| c.open_time < candle.open_time);
                debug!(
                    index,
                    open_time = candle.open_time,
                    count = self.candles.len(),
                    "appended bar"
                );
                UpsertOutcome::Appended { index }
            }
        }
    }

    /// Overwrites the last bar while keeping its key. Used by the tail
    /// animator to publish interpolated values.
    pub fn replace_tail(&mut self, candle: Candle) -> ChartResult<()> {
        let Some(last) = self.candles.last_mut() else {
            return Err(ChartError::InvalidData(
                "cannot replace tail of an empty series".to_owned(),
            ));
        };
        *last = Candle {
            open_time: last.open_time,
            ..candle
        };
        Ok(())
    }

    /// Merges older history. Only valid candles strictly earlier than the
    /// current first bar are kept. Returns the number inserted.
    pub fn prepend(&mut self, candles: Vec<Candle>) -> usize {
        let original_len = candles.len();
        let earliest = self.candles.first().map(|c| c.open_time);
        let mut older: Vec<Candle> = candles
            .into_iter()
            .filter(|c| c.is_valid() && earliest.is_none_or(|first| c.open_time < first))
            .collect();
        older.sort_by_key(|c| c.open_time);
        older.dedup_by(|next, kept| {
            if next.open_time == kept.open_time {
                *kept = *next;
                true
            } else {
                false
            }
        });

        let inserted = older.len();
        if inserted == 0 {
            trace!(original_len, "prepend inserted nothing");
            return 0;
        }
        older.append(&mut self.candles);
        self.candles = older;
        self.candles.sort_by_key(|c| c.open_time);
        debug!(
            original_len,
            inserted,
            count = self.candles.len(),
            "prepended history"
        );
        inserted
    }

    /// Atomically replaces the series with a canonicalized copy.
    pub fn reset(&mut self, candles: Vec<Candle>) {
        self.candles = canonicalize_candles(candles);
        debug!(count = self.candles.len(), "candle store reset");
    }

    pub fn set_interval(&mut self, interval_ms: i64) -> ChartResult<()> {
        self.interval_ms = validate_interval(interval_ms)?;
        Ok(())
    }

    /// `true` when keys are strictly ascending.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.candles
            .windows(2)
            .all(|pair| pair[0].open_time < pair[1].open_time)
    }
}

fn validate_interval(interval_ms: i64) -> ChartResult<i64> {
    if interval_ms <= 0 {
        return Err(ChartError::InvalidData(
            "timeframe interval must be > 0".to_owned(),
        ));
    }
    Ok(interval_ms)
}

/// Validates, sorts and dedups keeping the last occurrence of each key.
pub fn canonicalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    let original_len = candles.len();
    candles.retain(Candle::is_valid);
    // stable: later duplicates stay after earlier ones
    candles.sort_by_key(|c| c.open_time);

    let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
    let mut duplicate_count = 0_usize;
    for candle in candles {
        if let Some(last) = deduped.last_mut() {
            if candle.open_time.cmp(&last.open_time) == Ordering::Equal {
                *last = candle;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(candle);
    }

    let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
    if filtered_count > 0 || duplicate_count > 0 {
        warn!(
            filtered_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized candles on reset"
        );
    }
    deduped
}
