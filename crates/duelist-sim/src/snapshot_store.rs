//! Time-indexed kinematic history per tracked entity.
//!
//! Each identity keeps a bounded history (oldest evicted first). Lookups by
//! tick either return the exact record, extrapolate from the newest earlier
//! record, or report nothing. The store also tracks which entities are
//! believed alive.

use std::collections::{HashMap, VecDeque};

use duelist_core::enums::Liveness;
use duelist_core::error::{AgentError, AgentResult};
use duelist_core::snapshot::Snapshot;

/// Bounded per-entity snapshot histories plus a liveness map.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    capacity: usize,
    self_name: Option<String>,
    histories: HashMap<String, VecDeque<Snapshot>>,
    liveness: HashMap<String, Liveness>,
}

impl SnapshotStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            self_name: None,
            histories: HashMap::new(),
            liveness: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Name under which our own snapshots are recorded.
    pub fn set_self_name(&mut self, name: impl Into<String>) {
        self.self_name = Some(name.into());
    }

    pub fn self_name(&self) -> Option<&str> {
        self.self_name.as_deref()
    }

    /// Append a snapshot to its identity's history. A record for the same
    /// tick replaces the newest one; older ticks are rejected.
    pub fn record(&mut self, snapshot: Snapshot) -> AgentResult<()> {
        if !snapshot.is_finite() {
            return Err(AgentError::InvalidObservation {
                name: snapshot.name,
                reason: "non-finite field",
            });
        }
        let history = self.histories.entry(snapshot.name.clone()).or_default();
        match history.back().map(|last| last.tick) {
            Some(last) if last > snapshot.tick => {
                return Err(AgentError::InvalidObservation {
                    name: snapshot.name,
                    reason: "tick older than latest record",
                });
            }
            Some(last) if last == snapshot.tick => {
                history.pop_back();
            }
            _ => {}
        }
        if history.len() >= self.capacity {
            history.pop_front();
        }
        self.liveness
            .entry(snapshot.name.clone())
            .and_modify(|l| {
                if *l == Liveness::Unknown {
                    *l = Liveness::Alive;
                }
            })
            .or_insert(Liveness::Alive);
        history.push_back(snapshot);
        Ok(())
    }

    pub fn latest(&self, name: &str) -> Option<&Snapshot> {
        self.histories.get(name)?.back()
    }

    pub fn earliest(&self, name: &str) -> Option<&Snapshot> {
        self.histories.get(name)?.front()
    }

    /// Newest snapshot strictly before `tick`.
    pub fn previous(&self, name: &str, tick: u64) -> Option<&Snapshot> {
        self.histories
            .get(name)?
            .iter()
            .rev()
            .find(|s| s.tick < tick)
    }

    /// Snapshot at exactly `tick`, or extrapolated forward from the newest
    /// earlier record when `allow_extrapolate` is set. Gaps wider than
    /// `MAX_EXTRAPOLATION_TICKS` are not extrapolated.
    pub fn at(&self, name: &str, tick: u64, allow_extrapolate: bool) -> Option<Snapshot> {
        let history = self.histories.get(name)?;
        let idx = history.iter().rposition(|s| s.tick <= tick)?;
        let found = &history[idx];
        if found.tick == tick {
            return Some(found.clone());
        }
        if !allow_extrapolate {
            return None;
        }
        let before = idx.checked_sub(1).map(|i| &history[i]);
        found.extrapolate_to(before, tick)
    }

    /// History of one identity, oldest first.
    pub fn history(&self, name: &str) -> impl Iterator<Item = &Snapshot> {
        self.histories.get(name).into_iter().flatten()
    }

    pub fn liveness(&self, name: &str) -> Liveness {
        self.liveness.get(name).copied().unwrap_or_default()
    }

    /// Mark an identity dead. Its history is kept.
    pub fn mark_dead(&mut self, name: &str) {
        self.liveness.insert(name.to_string(), Liveness::Dead);
    }

    /// Every identity ever recorded, sorted for deterministic iteration.
    pub fn known(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.liveness.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Alive identities other than ourselves, sorted.
    pub fn alive_opponents(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .liveness
            .iter()
            .filter(|(name, l)| **l == Liveness::Alive && Some(name.as_str()) != self.self_name())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn opponent_count(&self) -> usize {
        self.alive_opponents().len()
    }

    /// Start a new round: ticks restart, so histories are cleared, but every
    /// known identity is kept and marked alive.
    pub fn begin_round(&mut self) {
        for history in self.histories.values_mut() {
            history.clear();
        }
        for liveness in self.liveness.values_mut() {
            *liveness = Liveness::Alive;
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(duelist_core::constants::DEFAULT_HISTORY_CAPACITY)
    }
}
