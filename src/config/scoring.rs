//! Scoring configuration

use serde::Deserialize;

use crate::domain::succession::PartialScoringPolicy;

/// How rankings treat evaluators who have not scored every criterion.
///
/// `SUCCESSION__SCORING__PARTIAL_SCORING_POLICY=renormalize`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub partial_scoring_policy: PartialScoringPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_summing_scored_criteria() {
        assert_eq!(
            ScoringConfig::default().partial_scoring_policy,
            PartialScoringPolicy::SumScored
        );
    }

    #[test]
    fn reads_snake_case_policy() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"partial_scoring_policy":"exclude_incomplete"}"#).unwrap();
        assert_eq!(
            config.partial_scoring_policy,
            PartialScoringPolicy::ExcludeIncomplete
        );
    }
}
