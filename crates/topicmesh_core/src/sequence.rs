//! Stale-response guard for query-driven lookups.
//!
//! Every query issued gets a monotonically increasing ticket. A response is
//! applied only when its ticket is the latest issued and its query still
//! equals the live input; anything else is discarded.

/// Identifies one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    query: String,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for `query`, superseding every earlier ticket.
    pub fn issue(&mut self, query: impl Into<String>) -> RequestTicket {
        self.latest += 1;
        RequestTicket {
            seq: self.latest,
            query: query.into(),
        }
    }

    /// Whether no newer ticket has been issued since `ticket`.
    pub fn is_latest(&self, ticket: &RequestTicket) -> bool {
        ticket.seq == self.latest
    }

    /// Whether a response for `ticket` may be applied against the live input.
    pub fn is_current(&self, ticket: &RequestTicket, current_input: &str) -> bool {
        self.is_latest(ticket) && ticket.query.trim() == current_input.trim()
    }
}
