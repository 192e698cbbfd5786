//! Backlog (C8) — the pool of Service Orders waiting to be dispatched, split
//! into technical and commercial sets keyed by `numos`.
//!
//! A Service Order lives in exactly one of the two sets at a time; it never
//! appears in both, and it is never duplicated within one. `carry_forward`
//! is a deliberate no-op: an OS that was not removed on a given day is
//! already present for the next one, simply by virtue of not having been
//! taken out.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::types::{Numos, ServiceOrder, ServiceOrderType};

#[derive(Debug, Clone, Default)]
pub struct Backlog {
    technical: HashMap<Numos, ServiceOrder>,
    commercial: HashMap<Numos, ServiceOrder>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an OS into its type's set. Replaces any existing entry with the
    /// same `numos` rather than duplicating it.
    pub fn insert(&mut self, os: ServiceOrder) {
        match os.order_type {
            ServiceOrderType::Technical => {
                self.technical.insert(os.numos, os);
            }
            ServiceOrderType::Commercial => {
                self.commercial.insert(os.numos, os);
            }
        }
    }

    pub fn insert_all(&mut self, orders: impl IntoIterator<Item = ServiceOrder>) {
        for os in orders {
            self.insert(os);
        }
    }

    pub fn len(&self) -> usize {
        self.technical.len() + self.commercial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technical.is_empty() && self.commercial.is_empty()
    }

    /// Orders from either set whose `requested_at` is no later than
    /// `shift_start`, technical first, each set ordered by ascending `numos`
    /// for a deterministic scan order independent of HashMap iteration.
    pub fn eligible(&self, shift_start: NaiveDateTime) -> Vec<&ServiceOrder> {
        let mut technical: Vec<&ServiceOrder> = self
            .technical
            .values()
            .filter(|os| os.eligible_for(shift_start))
            .collect();
        technical.sort_by_key(|os| os.numos);

        let mut commercial: Vec<&ServiceOrder> = self
            .commercial
            .values()
            .filter(|os| os.eligible_for(shift_start))
            .collect();
        commercial.sort_by_key(|os| os.numos);

        technical.into_iter().chain(commercial).collect()
    }

    /// Remove a batch of dispatched orders from the backlog. Silently
    /// ignores ids not present (already removed by a concurrent round).
    pub fn remove(&mut self, ids: &[Numos]) {
        for id in ids {
            self.technical.remove(id);
            self.commercial.remove(id);
        }
    }

    pub fn contains(&self, numos: Numos) -> bool {
        self.technical.contains_key(&numos) || self.commercial.contains_key(&numos)
    }

    /// No-op: an OS not removed today is already present for tomorrow. Kept
    /// as an explicit call site so day-boundary bookkeeping reads the same
    /// whether or not anything carries forward.
    pub fn carry_forward(&mut self) {}

    /// Split the current contents into (requested on `day`, requested
    /// before `day`) counts, for the §7 end-of-day "new vs. backlog" summary.
    pub fn pending_breakdown(&self, day: chrono::NaiveDate) -> (usize, usize) {
        let mut new_count = 0;
        let mut carried_count = 0;
        for os in self.technical.values().chain(self.commercial.values()) {
            if os.requested_at.date() >= day {
                new_count += 1;
            } else {
                carried_count += 1;
            }
        }
        (new_count, carried_count)
    }
}
