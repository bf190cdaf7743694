use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::NormalizedMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Display order.
    pub const ALL: [Outcome; 3] = [Outcome::Win, Outcome::Draw, Outcome::Loss];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Draw => "Draw",
            Outcome::Loss => "Loss",
        }
    }

    pub fn points(self) -> usize {
        match self {
            Outcome::Win => 3,
            Outcome::Draw => 1,
            Outcome::Loss => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub const ALL: [Venue; 2] = [Venue::Home, Venue::Away];

    pub fn label(self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Outcome::ALL
            .into_iter()
            .find(|o| o.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown outcome {s:?}"))
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Venue::ALL
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown venue {s:?}"))
    }
}

/// A normalized match plus its result from the team of interest's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMatch {
    pub base: NormalizedMatch,
    pub outcome: Outcome,
    pub venue: Venue,
}

impl EnrichedMatch {
    /// (goals for, goals against) from the team of interest's side.
    pub fn goals_for_against(&self) -> (i64, i64) {
        let home = self.base.home_goals.unwrap_or_default();
        let away = self.base.away_goals.unwrap_or_default();
        match self.venue {
            Venue::Home => (home, away),
            Venue::Away => (away, home),
        }
    }
}

/// Pure classification of one match. The team must appear on one side and
/// both goal counts must be known.
pub fn classify(
    match_id: i64,
    home_team: &str,
    away_team: &str,
    home_goals: Option<i64>,
    away_goals: Option<i64>,
    team: &str,
) -> Result<(Outcome, Venue)> {
    let venue = if home_team == team {
        Venue::Home
    } else if away_team == team {
        Venue::Away
    } else {
        return Err(PipelineError::UnknownTeam {
            match_id,
            team: team.to_string(),
        });
    };

    let (Some(home), Some(away)) = (home_goals, away_goals) else {
        return Err(PipelineError::IncompleteMatch { match_id });
    };

    let (ours, theirs) = match venue {
        Venue::Home => (home, away),
        Venue::Away => (away, home),
    };
    let outcome = match ours.cmp(&theirs) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Less => Outcome::Loss,
        std::cmp::Ordering::Equal => Outcome::Draw,
    };
    Ok((outcome, venue))
}

pub fn enrich_match(m: &NormalizedMatch, team: &str) -> Result<EnrichedMatch> {
    let (outcome, venue) = classify(
        m.match_id,
        &m.home_team,
        &m.away_team,
        m.home_goals,
        m.away_goals,
        team,
    )?;
    Ok(EnrichedMatch {
        base: m.clone(),
        outcome,
        venue,
    })
}

/// Enriches the whole table, aborting on the first unclassifiable match.
pub fn enrich(matches: &[NormalizedMatch], team: &str) -> Result<Vec<EnrichedMatch>> {
    matches.iter().map(|m| enrich_match(m, team)).collect()
}
