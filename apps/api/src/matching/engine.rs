//! Matching Engine: decides which startups qualify for each investor.
//!
//! Pure and deterministic: no I/O, no clock. Every run is a full
//! investors × startups recomputation.
//!
//! Per investor:
//! 1. No industry and no stage preferences → `clear`, nothing is scored.
//! 2. `industry_match`: a preferred industry is a case-insensitive substring of the
//!    startup's industry, or the other way round. Blank strings never match.
//! 3. `stage_match`: the startup's funding stage equals a preferred stage exactly.
//! 4. `match_score` = 50 per matched dimension.
//! 5. Both dimensions set → both must match. One dimension set → that one must match.
//! 6. Stable sort by score, highest first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::investor::{Investor, StoredRecommendation};
use crate::models::startup::Startup;

/// Points awarded for each matched dimension.
pub const DIMENSION_WEIGHT: u32 = 50;

/// A startup that qualified for an investor, with the startup fields denormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub startup_id: String,
    pub name: String,
    pub industry: String,
    pub funding_stage: String,
    pub description: String,
    pub location: String,
    pub website: String,
    pub funding_amount: Option<f64>,
    pub match_score: u32,
    pub industry_match: bool,
    pub stage_match: bool,
}

impl Match {
    fn new(startup: &Startup, industry_match: bool, stage_match: bool) -> Self {
        let match_score = DIMENSION_WEIGHT * u32::from(industry_match)
            + DIMENSION_WEIGHT * u32::from(stage_match);
        Match {
            startup_id: startup.startup_id.clone(),
            name: startup.name.clone(),
            industry: startup.industry.clone(),
            funding_stage: startup.funding_stage.clone(),
            description: startup.description.clone(),
            location: startup.location.clone(),
            website: startup.website.clone(),
            funding_amount: startup.funding_amount,
            match_score,
            industry_match,
            stage_match,
        }
    }
}

impl From<&Match> for StoredRecommendation {
    fn from(m: &Match) -> Self {
        StoredRecommendation {
            startup_id: m.startup_id.clone(),
            name: m.name.clone(),
            industry: m.industry.clone(),
            funding_stage: m.funding_stage.clone(),
            match_score: m.match_score,
        }
    }
}

/// Engine result for one investor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchOutcome {
    /// Ranked matches. Always empty when `clear` is set.
    pub matches: Vec<Match>,
    /// The investor has no preferences; stored recommendations must be emptied.
    pub clear: bool,
}

impl MatchOutcome {
    fn cleared() -> Self {
        MatchOutcome {
            matches: vec![],
            clear: true,
        }
    }
}

/// Computes the outcome for every investor, keyed by `investor_id`.
pub fn compute_matches(
    investors: &[Investor],
    startups: &[Startup],
) -> BTreeMap<String, MatchOutcome> {
    investors
        .iter()
        .map(|investor| {
            (
                investor.investor_id.clone(),
                match_investor(investor, startups),
            )
        })
        .collect()
}

/// Computes the ranked matches of a single investor.
pub fn match_investor(investor: &Investor, startups: &[Startup]) -> MatchOutcome {
    let industries: Vec<String> = investor
        .preferred_industries
        .iter()
        .filter(|i| !i.trim().is_empty())
        .map(|i| i.to_lowercase())
        .collect();
    let stages: Vec<&str> = investor
        .preferred_funding_stages
        .iter()
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .collect();

    if industries.is_empty() && stages.is_empty() {
        return MatchOutcome::cleared();
    }

    let mut matches: Vec<Match> = startups
        .iter()
        .filter_map(|startup| {
            let industry_match = industry_matches(&industries, &startup.industry);
            let stage_match = stage_matches(&stages, &startup.funding_stage);

            let include = match (industries.is_empty(), stages.is_empty()) {
                (false, false) => industry_match && stage_match,
                (false, true) => industry_match,
                (true, false) => stage_match,
                (true, true) => false,
            };

            include.then(|| Match::new(startup, industry_match, stage_match))
        })
        .collect();

    // sort_by is stable: equal scores keep startup order
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    MatchOutcome {
        matches,
        clear: false,
    }
}

/// Symmetric, case-insensitive substring test. `preferred` must already be lowercased.
fn industry_matches(preferred: &[String], startup_industry: &str) -> bool {
    if startup_industry.trim().is_empty() {
        return false;
    }
    let industry = startup_industry.to_lowercase();
    preferred
        .iter()
        .any(|pref| industry.contains(pref.as_str()) || pref.contains(industry.as_str()))
}

fn stage_matches(preferred: &[&str], startup_stage: &str) -> bool {
    !startup_stage.is_empty() && preferred.contains(&startup_stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{investor, startup};

    fn fintech_startups() -> Vec<Startup> {
        vec![
            startup("s1", "Fintech Solutions", "seed"),
            startup("s2", "Fintech Solutions", "series-a"),
        ]
    }

    #[test]
    fn test_both_preferences_require_both_dimensions() {
        let inv = investor("inv-1", &["FinTech"], &["seed"]);
        let outcome = match_investor(&inv, &fintech_startups());

        assert!(!outcome.clear);
        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.startup_id, "s1");
        assert_eq!(m.match_score, 100);
        assert!(m.industry_match);
        assert!(m.stage_match);
    }

    #[test]
    fn test_stage_only_preferences() {
        let inv = investor("inv-1", &[], &["seed"]);
        let outcome = match_investor(&inv, &fintech_startups());

        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.startup_id, "s1");
        assert_eq!(m.match_score, 50);
        assert!(m.stage_match);
        assert!(!m.industry_match);
    }

    #[test]
    fn test_industry_only_never_returns_industry_mismatch() {
        let startups = vec![
            startup("s1", "Fintech Solutions", "seed"),
            startup("s2", "HealthTech", "seed"),
            startup("s3", "fintech", "series-b"),
        ];
        let inv = investor("inv-1", &["FinTech"], &[]);
        let outcome = match_investor(&inv, &startups);

        assert_eq!(outcome.matches.len(), 2);
        assert!(outcome.matches.iter().all(|m| m.industry_match));
        assert!(outcome.matches.iter().all(|m| m.match_score == 50));
    }

    #[test]
    fn test_no_preferences_clears() {
        let inv = investor("inv-1", &[], &[]);
        let outcome = match_investor(&inv, &fintech_startups());
        assert!(outcome.clear);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_blank_preferences_count_as_absent() {
        let inv = investor("inv-1", &["", "  "], &[""]);
        let outcome = match_investor(&inv, &fintech_startups());
        assert!(outcome.clear);
    }

    #[test]
    fn test_blank_industry_entry_does_not_match_everything() {
        let startups = vec![
            startup("s1", "Retail", "seed"),
            startup("s2", "AgriTech", "seed"),
        ];
        let inv = investor("inv-1", &["", "Biotech"], &[]);
        let outcome = match_investor(&inv, &startups);
        assert!(!outcome.clear);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_empty_startup_industry_never_matches() {
        let startups = vec![startup("s1", "", "seed")];
        let inv = investor("inv-1", &["FinTech"], &[]);
        assert!(match_investor(&inv, &startups).matches.is_empty());
    }

    #[test]
    fn test_industry_substring_is_symmetric() {
        // Preference contains the startup industry.
        let startups = vec![startup("s1", "AI", "seed")];
        let inv = investor("inv-1", &["Applied AI Platforms"], &[]);
        let outcome = match_investor(&inv, &startups);
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn test_stage_match_is_exact() {
        let startups = vec![
            startup("s1", "FinTech", "Seed"),
            startup("s2", "FinTech", "pre-seed"),
        ];
        let inv = investor("inv-1", &[], &["seed"]);
        assert!(match_investor(&inv, &startups).matches.is_empty());
    }

    #[test]
    fn test_preferences_with_no_qualifying_startups_is_not_a_clear() {
        let inv = investor("inv-1", &["Space"], &["series-c"]);
        let outcome = match_investor(&inv, &fintech_startups());
        assert!(!outcome.clear);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_sorted_descending_and_stable_on_ties() {
        let startups = vec![
            startup("a", "Retail", "seed"),
            startup("b", "FinTech", "seed"),
            startup("c", "Logistics", "seed"),
            startup("d", "FinTech Payments", "seed"),
            startup("e", "FinTech", "series-a"),
        ];
        // Only stage is required, industry adds points.
        let mut inv = investor("inv-1", &[], &["seed", "series-a"]);
        let outcome = match_investor(&inv, &startups);
        let order: Vec<&str> = outcome.matches.iter().map(|m| m.startup_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);

        inv.preferred_industries = vec!["fintech".to_string()];
        let outcome = match_investor(&inv, &startups);
        let order: Vec<&str> = outcome.matches.iter().map(|m| m.startup_id.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "e"]);
        assert!(outcome.matches.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[test]
    fn test_scores_are_multiples_of_weight() {
        let startups = vec![
            startup("a", "FinTech", "seed"),
            startup("b", "Retail", "seed"),
        ];
        let inv = investor("inv-1", &[], &["seed"]);
        for m in match_investor(&inv, &startups).matches {
            assert!([0, 50, 100].contains(&m.match_score));
        }
    }

    #[test]
    fn test_compute_matches_keys_every_investor() {
        let investors = vec![
            investor("inv-1", &["FinTech"], &["seed"]),
            investor("inv-2", &[], &[]),
            investor("inv-3", &["Space"], &[]),
        ];
        let results = compute_matches(&investors, &fintech_startups());

        assert_eq!(results.len(), 3);
        assert_eq!(results["inv-1"].matches.len(), 1);
        assert!(results["inv-2"].clear);
        assert!(!results["inv-3"].clear);
        assert!(results["inv-3"].matches.is_empty());
    }

    #[test]
    fn test_compute_matches_is_deterministic() {
        let investors = vec![investor("inv-1", &["tech"], &["seed", "series-a"])];
        let first = compute_matches(&investors, &fintech_startups());
        let second = compute_matches(&investors, &fintech_startups());
        assert_eq!(first, second);
    }

    #[test]
    fn test_stored_recommendation_projection() {
        let inv = investor("inv-1", &["FinTech"], &["seed"]);
        let m = &match_investor(&inv, &fintech_startups()).matches[0];
        let stored = StoredRecommendation::from(m);
        assert_eq!(stored.startup_id, "s1");
        assert_eq!(stored.funding_stage, "seed");
        assert_eq!(stored.match_score, 100);
    }
}
