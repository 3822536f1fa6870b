//! Scope-keyed query cache with an optimistic overlay.
//!
//! Every cached scope holds the last snapshot confirmed by the store. Local
//! availability edits are not written into snapshots; they sit in a pending
//! log and [`ScheduleCache::view`] replays them over the snapshot. Confirming
//! an edit drops it from the log and marks the affected scopes stale so the
//! next read refetches. Rolling back drops it from the log, which restores
//! the pre-edit view without any snapshot copy.
//!
//! Fetches are last-write-wins: a fetch result is installed only if no newer
//! fetch for the same scope has already landed. A fetch that started before
//! the latest invalidation of its scope is installed stale, so the next read
//! refetches.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityOp;
use crate::grid::DaySnapshot;
use crate::types::Day;
use crate::week::{week_start, DAYS_PER_WEEK};

/// The date range a cached query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "date", rename_all = "snake_case")]
pub enum CacheScope {
    /// Availability and bookings of one date.
    Day(Day),
    /// Availability of the Monday-based week starting at the given date.
    Week(Day),
}

impl CacheScope {
    /// Week scope for the week containing `date`.
    pub fn week_of(date: Day) -> Self {
        CacheScope::Week(week_start(date))
    }

    /// First and last date of the scope, inclusive.
    pub fn range(self) -> (Day, Day) {
        match self {
            CacheScope::Day(d) => (d, d),
            CacheScope::Week(monday) => (monday, monday + Duration::days(DAYS_PER_WEEK as i64 - 1)),
        }
    }

    pub fn covers(self, date: Day) -> bool {
        let (from, to) = self.range();
        from <= date && date <= to
    }
}

/// Handle for an in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub scope: CacheScope,
    generation: u64,
}

/// Handle for a pending optimistic edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpTicket(u64);

#[derive(Debug)]
struct Entry {
    snapshot: DaySnapshot,
    generation: u64,
    stale: bool,
}

#[derive(Debug, Default)]
pub struct ScheduleCache {
    entries: HashMap<CacheScope, Entry>,
    /// Newest ticket handed out per scope whose result has not landed yet.
    in_flight: HashMap<CacheScope, u64>,
    /// Generation of the latest invalidation touching each scope.
    invalidated_at: HashMap<CacheScope, u64>,
    pending: Vec<(OpTicket, AvailabilityOp)>,
    next_generation: u64,
    next_op: u64,
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmed snapshot of `scope` with pending edits replayed on top, or
    /// `None` if nothing has been installed yet.
    pub fn view(&self, scope: CacheScope) -> Option<DaySnapshot> {
        let entry = self.entries.get(&scope)?;
        let mut snapshot = entry.snapshot.clone();
        for (_, op) in &self.pending {
            if scope.covers(op.day()) {
                op.apply(&mut snapshot.availability);
            }
        }
        Some(snapshot)
    }

    /// Cached and not invalidated since it was installed.
    pub fn is_fresh(&self, scope: CacheScope) -> bool {
        self.entries.get(&scope).is_some_and(|e| !e.stale)
    }

    pub fn begin_fetch(&mut self, scope: CacheScope) -> FetchTicket {
        let generation = self.bump();
        self.in_flight.insert(scope, generation);
        FetchTicket { scope, generation }
    }

    /// Install a fetch result. Returns `false` when a newer fetch for the
    /// same scope already landed; the result is discarded in that case.
    ///
    /// A result whose fetch began before the scope was last invalidated is
    /// kept but stays stale.
    pub fn install(&mut self, ticket: FetchTicket, snapshot: DaySnapshot) -> bool {
        let scope = ticket.scope;
        if let Some(existing) = self.entries.get(&scope) {
            if existing.generation > ticket.generation {
                return false;
            }
        }
        if self.in_flight.get(&scope) == Some(&ticket.generation) {
            self.in_flight.remove(&scope);
        }
        let stale = self
            .invalidated_at
            .get(&scope)
            .is_some_and(|at| *at > ticket.generation);
        self.entries.insert(
            scope,
            Entry {
                snapshot,
                generation: ticket.generation,
                stale,
            },
        );
        true
    }

    /// Record a local edit that the store has not confirmed yet.
    pub fn apply_optimistic(&mut self, op: AvailabilityOp) -> OpTicket {
        self.next_op += 1;
        let ticket = OpTicket(self.next_op);
        self.pending.push((ticket, op));
        ticket
    }

    /// The store accepted the edit. The next read of any covering scope
    /// refetches so the snapshot catches up with the log.
    pub fn confirm(&mut self, ticket: OpTicket) {
        if let Some(op) = self.take_pending(ticket) {
            self.invalidate(op.day());
        }
    }

    /// The store rejected the edit; the view goes back to what it was.
    pub fn rollback(&mut self, ticket: OpTicket) {
        self.take_pending(ticket);
    }

    /// Mark every cached or in-flight scope covering `date` stale. Returns
    /// those scopes.
    pub fn invalidate(&mut self, date: Day) -> Vec<CacheScope> {
        let touched: Vec<CacheScope> = self
            .known_scopes()
            .into_iter()
            .filter(|scope| scope.covers(date))
            .collect();
        self.mark_stale(&touched);
        touched
    }

    pub fn invalidate_all(&mut self) {
        let scopes = self.known_scopes();
        self.mark_stale(&scopes);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn known_scopes(&self) -> Vec<CacheScope> {
        let mut scopes: Vec<CacheScope> = self.entries.keys().copied().collect();
        scopes.extend(
            self.in_flight
                .keys()
                .filter(|s| !self.entries.contains_key(s))
                .copied(),
        );
        scopes
    }

    fn mark_stale(&mut self, scopes: &[CacheScope]) {
        let generation = self.bump();
        for scope in scopes {
            if let Some(entry) = self.entries.get_mut(scope) {
                entry.stale = true;
            }
            self.invalidated_at.insert(*scope, generation);
        }
    }

    fn take_pending(&mut self, ticket: OpTicket) -> Option<AvailabilityOp> {
        let pos = self.pending.iter().position(|(t, _)| *t == ticket)?;
        Some(self.pending.remove(pos).1)
    }
}
