use crate::classify::{EnrichedMatch, Outcome, Venue};

pub const ALL_LABEL: &str = "All";

/// Select-one filter: either everything or a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: Copy + PartialEq> Choice<T> {
    pub fn accepts(&self, value: T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => *wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    /// Next option in `[All, options...]`, wrapping around.
    pub fn cycle(self, options: &[T]) -> Self {
        match self {
            Choice::All => options.first().map(|v| Choice::Only(*v)).unwrap_or(Choice::All),
            Choice::Only(current) => {
                let pos = options.iter().position(|v| *v == current);
                match pos.and_then(|p| options.get(p + 1)) {
                    Some(next) => Choice::Only(*next),
                    None => Choice::All,
                }
            }
        }
    }
}

pub type VenueFilter = Choice<Venue>;
pub type OutcomeFilter = Choice<Outcome>;

pub fn venue_filter_label(filter: VenueFilter) -> &'static str {
    match filter {
        Choice::All => ALL_LABEL,
        Choice::Only(v) => v.label(),
    }
}

pub fn outcome_filter_label(filter: OutcomeFilter) -> &'static str {
    match filter {
        Choice::All => ALL_LABEL,
        Choice::Only(o) => o.label(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchFilter {
    pub venue: VenueFilter,
    pub outcome: OutcomeFilter,
}

impl MatchFilter {
    pub fn matches(&self, m: &EnrichedMatch) -> bool {
        self.venue.accepts(m.venue) && self.outcome.accepts(m.outcome)
    }

    pub fn apply<'a>(&self, matches: &'a [EnrichedMatch]) -> Vec<&'a EnrichedMatch> {
        matches.iter().filter(|m| self.matches(m)).collect()
    }
}

/// Venues present in the data, in first-seen order.
pub fn venue_options(matches: &[EnrichedMatch]) -> Vec<Venue> {
    let mut out = Vec::new();
    for m in matches {
        if !out.contains(&m.venue) {
            out.push(m.venue);
        }
    }
    out
}

/// Outcomes present in the data, in first-seen order.
pub fn outcome_options(matches: &[EnrichedMatch]) -> Vec<Outcome> {
    let mut out = Vec::new();
    for m in matches {
        if !out.contains(&m.outcome) {
            out.push(m.outcome);
        }
    }
    out
}
