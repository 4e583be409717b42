// src/store/coordinator.rs
//! Lifecycle bookkeeping shared by every async operation on a slice.
//!
//! A dispatch hands out a [`Ticket`]; settling consumes it, so each dispatch
//! reaches exactly one terminal phase. Sequenced kinds overwrite a whole field,
//! and a settle older than the last applied one of its kind is discarded. A
//! version list is also discarded when a later version mutation has landed.

use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::GatewayResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Fetch and refresh of contracts, drawdowns and repayments.
    PortfolioData,
    Metrics,
    Cashflow,
    Contract,
    VersionList,
    VersionMutation,
    Comparison,
    Templates,
    Report,
    Download,
    Export,
    Import,
}

impl OpKind {
    /// Kinds whose fold replaces a field wholesale.
    pub fn is_sequenced(self) -> bool {
        matches!(
            self,
            OpKind::PortfolioData
                | OpKind::Metrics
                | OpKind::Cashflow
                | OpKind::VersionList
                | OpKind::Comparison
                | OpKind::Templates
        )
    }

    /// Kind whose applied result makes an older fold of this kind obsolete.
    /// A version list fetched before an activation or delete would undo it.
    pub fn superseded_by(self) -> Option<OpKind> {
        match self {
            OpKind::VersionList => Some(OpKind::VersionMutation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpPhase {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// How a dispatch ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Fulfilled,
    Rejected,
    /// A newer dispatch touching the same data had already been applied.
    Discarded,
}

#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be settled"]
pub struct Ticket {
    kind: OpKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct Coordinator {
    stale_guard: bool,
    next_seq: u64,
    in_flight: u32,
    issued: HashMap<OpKind, u64>,
    applied: HashMap<OpKind, u64>,
    phases: HashMap<OpKind, OpPhase>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Coordinator::new(true)
    }
}

impl Coordinator {
    pub fn new(stale_guard: bool) -> Self {
        Coordinator {
            stale_guard,
            next_seq: 0,
            in_flight: 0,
            issued: HashMap::new(),
            applied: HashMap::new(),
            phases: HashMap::new(),
        }
    }

    pub fn begin(&mut self, kind: OpKind) -> Ticket {
        self.next_seq += 1;
        self.in_flight += 1;
        self.issued.insert(kind, self.next_seq);
        self.phases.insert(kind, OpPhase::Pending);
        Ticket {
            kind,
            seq: self.next_seq,
        }
    }

    /// Records the end of a dispatch. Returns `false` when its fold must be dropped.
    pub fn settle(&mut self, ticket: Ticket, fulfilled: bool) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        // Only the latest dispatch of a kind decides its visible phase.
        if self.issued.get(&ticket.kind) == Some(&ticket.seq) {
            let phase = if fulfilled {
                OpPhase::Fulfilled
            } else {
                OpPhase::Rejected
            };
            self.phases.insert(ticket.kind, phase);
        }

        if !self.stale_guard {
            return true;
        }
        if self.is_stale(&ticket) {
            return false;
        }
        // Mutations only count once they have changed the slice.
        if ticket.kind.is_sequenced() || fulfilled {
            let last = self.applied.entry(ticket.kind).or_insert(0);
            *last = (*last).max(ticket.seq);
        }
        true
    }

    /// A sequenced fold is stale when a later dispatch of its kind, or of a
    /// kind that supersedes it, has already been applied.
    fn is_stale(&self, ticket: &Ticket) -> bool {
        if !ticket.kind.is_sequenced() {
            return false;
        }
        let applied_after = |kind: OpKind| {
            self.applied
                .get(&kind)
                .map_or(false, |&last| ticket.seq < last)
        };
        applied_after(ticket.kind) || ticket.kind.superseded_by().map_or(false, applied_after)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    pub fn phase(&self, kind: OpKind) -> OpPhase {
        self.phases.get(&kind).copied().unwrap_or_default()
    }
}

/// A slice that exposes `loading`/`error` and owns a [`Coordinator`].
pub trait AsyncSlice {
    const NAME: &'static str;

    fn coordinator(&mut self) -> &mut Coordinator;
    fn set_loading(&mut self, loading: bool);
    fn set_error(&mut self, error: Option<String>);

    /// Pending transition: `loading` on, previous error cleared.
    fn begin(&mut self, kind: OpKind) -> Ticket {
        let ticket = self.coordinator().begin(kind);
        debug!("{}: dispatch {:?} #{}", Self::NAME, kind, ticket.seq);
        self.set_loading(true);
        self.set_error(None);
        ticket
    }

    /// Terminal transition. On success `apply` folds the value in; on failure
    /// only `error` changes, cached data stays.
    fn settle<T>(
        &mut self,
        ticket: Ticket,
        outcome: GatewayResult<T>,
        apply: impl FnOnce(&mut Self, T),
    ) -> Settled
    where
        Self: Sized,
    {
        let kind = ticket.kind;
        let seq = ticket.seq;
        let fresh = self.coordinator().settle(ticket, outcome.is_ok());
        let loading = self.coordinator().is_loading();
        self.set_loading(loading);

        if !fresh {
            debug!("{}: dropped stale {:?} #{}", Self::NAME, kind, seq);
            return Settled::Discarded;
        }

        match outcome {
            Ok(value) => {
                info!("{}: {:?} #{} fulfilled", Self::NAME, kind, seq);
                apply(self, value);
                Settled::Fulfilled
            }
            Err(err) => {
                error!("{}: {:?} #{} rejected: {}", Self::NAME, kind, seq, err);
                self.set_error(Some(err.to_string()));
                Settled::Rejected
            }
        }
    }
}
