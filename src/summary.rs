use serde::Serialize;

use crate::classify::{EnrichedMatch, Outcome, Venue};
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl OutcomeCounts {
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
    }

    pub fn get(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Win => self.wins,
            Outcome::Draw => self.draws,
            Outcome::Loss => self.losses,
        }
    }

    pub fn total(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    pub fn points(&self) -> usize {
        Outcome::ALL
            .into_iter()
            .map(|o| self.get(o) * o.points())
            .sum()
    }

    /// Points earned over points available, in percent. `None` when empty.
    pub fn performance_pct(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.points() as f64 / (total * 3) as f64 * 100.0)
    }

    /// `(label, count)` pairs in display order.
    pub fn labeled(&self) -> Vec<(&'static str, usize)> {
        Outcome::ALL
            .into_iter()
            .map(|o| (o.label(), self.get(o)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub total: usize,
    pub overall: OutcomeCounts,
    pub home: OutcomeCounts,
    pub away: OutcomeCounts,
    pub performance_pct: f64,
    pub goals_for: i64,
    pub goals_against: i64,
}

impl SeasonSummary {
    pub fn wins(&self) -> usize {
        self.overall.wins
    }

    pub fn draws(&self) -> usize {
        self.overall.draws
    }

    pub fn losses(&self) -> usize {
        self.overall.losses
    }

    pub fn by_venue(&self, venue: Venue) -> &OutcomeCounts {
        match venue {
            Venue::Home => &self.home,
            Venue::Away => &self.away,
        }
    }
}

/// Tallies outcomes overall and per venue. Empty input is an error rather
/// than a zero-division.
pub fn summarize<'a>(
    matches: impl IntoIterator<Item = &'a EnrichedMatch>,
) -> Result<SeasonSummary> {
    let mut total = 0usize;
    let mut overall = OutcomeCounts::default();
    let mut home = OutcomeCounts::default();
    let mut away = OutcomeCounts::default();
    let mut goals_for = 0i64;
    let mut goals_against = 0i64;

    for m in matches {
        total += 1;
        overall.add(m.outcome);
        match m.venue {
            Venue::Home => home.add(m.outcome),
            Venue::Away => away.add(m.outcome),
        }
        let (gf, ga) = m.goals_for_against();
        goals_for += gf;
        goals_against += ga;
    }

    if total == 0 {
        return Err(PipelineError::EmptyInput);
    }

    let performance_pct = overall
        .performance_pct()
        .ok_or(PipelineError::EmptyInput)?
        .clamp(0.0, 100.0);

    Ok(SeasonSummary {
        total,
        overall,
        home,
        away,
        performance_pct,
        goals_for,
        goals_against,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NormalizedMatch;

    fn enriched(id: i64, outcome: Outcome, venue: Venue) -> EnrichedMatch {
        let (home_goals, away_goals) = match (outcome, venue) {
            (Outcome::Win, Venue::Home) | (Outcome::Loss, Venue::Away) => (2, 0),
            (Outcome::Loss, Venue::Home) | (Outcome::Win, Venue::Away) => (0, 1),
            (Outcome::Draw, _) => (1, 1),
        };
        EnrichedMatch {
            base: NormalizedMatch {
                match_id: id,
                match_date: "2023-05-01 20:00:00".to_string(),
                competition: "Serie A".to_string(),
                round: format!("Regular Season - {id}"),
                home_team: "H".to_string(),
                away_team: "A".to_string(),
                home_goals: Some(home_goals),
                away_goals: Some(away_goals),
                fulltime_home: Some(home_goals),
                fulltime_away: Some(away_goals),
            },
            outcome,
            venue,
        }
    }

    #[test]
    fn five_three_two_is_sixty_percent() {
        let mut matches = Vec::new();
        for i in 0..5 {
            matches.push(enriched(i, Outcome::Win, Venue::Home));
        }
        for i in 5..8 {
            matches.push(enriched(i, Outcome::Draw, Venue::Away));
        }
        for i in 8..10 {
            matches.push(enriched(i, Outcome::Loss, Venue::Away));
        }
        let s = summarize(&matches).unwrap();
        assert_eq!(s.total, 10);
        assert_eq!((s.wins(), s.draws(), s.losses()), (5, 3, 2));
        assert!((s.performance_pct - 60.0).abs() < 1e-9);
        assert_eq!(s.home.wins, 5);
        assert_eq!(s.away.draws, 3);
        assert_eq!(s.away.losses, 2);
        assert_eq!(s.home.total() + s.away.total(), s.total);
        assert_eq!(s.goals_for, 10 + 3);
        assert_eq!(s.goals_against, 3 + 2 * 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(summarize(&Vec::<EnrichedMatch>::new()), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn counts_always_add_up_and_stay_in_range() {
        let outcomes = [Outcome::Win, Outcome::Draw, Outcome::Loss];
        let venues = [Venue::Home, Venue::Away];
        for n in 1..20usize {
            let matches: Vec<_> = (0..n)
                .map(|i| enriched(i as i64, outcomes[i * 7 % 3], venues[i % 2]))
                .collect();
            let s = summarize(&matches).unwrap();
            assert_eq!(s.wins() + s.draws() + s.losses(), n);
            assert!((0.0..=100.0).contains(&s.performance_pct));
        }
    }

    #[test]
    fn all_losses_and_all_wins_hit_the_bounds() {
        let losses = vec![enriched(1, Outcome::Loss, Venue::Home)];
        assert_eq!(summarize(&losses).unwrap().performance_pct, 0.0);
        let wins = vec![enriched(1, Outcome::Win, Venue::Away)];
        assert_eq!(summarize(&wins).unwrap().performance_pct, 100.0);
    }

    #[test]
    fn labeled_counts_use_display_order() {
        let mut c = OutcomeCounts::default();
        c.add(Outcome::Loss);
        c.add(Outcome::Win);
        assert_eq!(c.labeled(), vec![("Win", 1), ("Draw", 0), ("Loss", 1)]);
    }
}
