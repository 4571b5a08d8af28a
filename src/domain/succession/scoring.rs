//! Weighted scoring of nominations.
//!
//! Per (nomination, evaluator):
//!
//! ```text
//! normalized(c) = raw / max_score * 100
//! weighted(c)   = normalized(c) * weight / 100
//! total         = sum of weighted(c) over the criteria the evaluator scored
//! ```
//!
//! The consensus score of a nomination is the arithmetic mean of its
//! evaluator totals. Contributions are always summed in criterion-id order,
//! so totals do not depend on the order rows come back from storage.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CriterionId, NominationId, UserId, ValidationError};

use super::{Criterion, EvaluationScore, Nomination, Weight};

/// How evaluators who skipped some criteria are treated.
///
/// The historical behavior is [`PartialScoringPolicy::SumScored`], which
/// under-scores incomplete evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartialScoringPolicy {
    /// Sum whatever was scored; missing criteria contribute 0.
    #[default]
    SumScored,
    /// Scale the total up as if the scored criteria carried all the weight.
    Renormalize,
    /// Leave incomplete evaluators out of the consensus.
    ExcludeIncomplete,
}

impl PartialScoringPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartialScoringPolicy::SumScored => "sum_scored",
            PartialScoringPolicy::Renormalize => "renormalize",
            PartialScoringPolicy::ExcludeIncomplete => "exclude_incomplete",
        }
    }
}

impl fmt::Display for PartialScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartialScoringPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum_scored" => Ok(PartialScoringPolicy::SumScored),
            "renormalize" => Ok(PartialScoringPolicy::Renormalize),
            "exclude_incomplete" => Ok(PartialScoringPolicy::ExcludeIncomplete),
            other => Err(ValidationError::invalid_format(
                "partial_scoring_policy",
                format!("unknown policy '{}'", other),
            )),
        }
    }
}

/// One criterion's share of an evaluator total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionContribution {
    pub criterion_id: CriterionId,
    pub raw_score: f64,
    pub max_score: u32,
    pub weight: Weight,
    pub normalized: f64,
    pub weighted: f64,
}

/// Weighted total of one evaluator for one nomination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorTotal {
    pub evaluator_id: UserId,
    /// Sorted by criterion id.
    pub contributions: Vec<CriterionContribution>,
    pub missing_criteria: Vec<CriterionId>,
    pub total: f64,
}

impl EvaluatorTotal {
    pub fn is_complete(&self) -> bool {
        self.missing_criteria.is_empty()
    }
}

/// Aggregated score of a nomination across all evaluators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominationScore {
    pub nomination_id: NominationId,
    pub policy: PartialScoringPolicy,
    /// Sorted by evaluator id.
    pub evaluators: Vec<EvaluatorTotal>,
    /// `None` until at least one evaluator counts towards the mean.
    pub consensus: Option<f64>,
}

/// Pure functions computing weighted scores from flat score rows.
pub struct WeightedScoreCalculator;

impl WeightedScoreCalculator {
    /// Raw score as a percentage of the criterion maximum.
    pub fn normalized(raw_score: f64, max_score: u32) -> f64 {
        raw_score * 100.0 / f64::from(max_score)
    }

    /// Normalized score scaled by the criterion weight.
    pub fn weighted(raw_score: f64, max_score: u32, weight: Weight) -> f64 {
        Self::normalized(raw_score, max_score) * weight.as_f64() / 100.0
    }

    pub fn contribution(criterion: &Criterion, raw_score: f64) -> CriterionContribution {
        let normalized = Self::normalized(raw_score, criterion.max_score);
        CriterionContribution {
            criterion_id: criterion.id,
            raw_score,
            max_score: criterion.max_score,
            weight: criterion.weight,
            normalized,
            weighted: normalized * criterion.weight.as_f64() / 100.0,
        }
    }

    /// Total of one evaluator's scores against a rubric.
    ///
    /// Scores for criteria outside `criteria` are ignored. If an evaluator
    /// somehow holds two rows for one criterion, the most recently updated
    /// one wins.
    pub fn evaluator_total(
        evaluator_id: &UserId,
        criteria: &[Criterion],
        scores: &[&EvaluationScore],
        policy: PartialScoringPolicy,
    ) -> EvaluatorTotal {
        let rubric: HashMap<CriterionId, &Criterion> =
            criteria.iter().map(|c| (c.id, c)).collect();

        let mut latest: BTreeMap<CriterionId, &EvaluationScore> = BTreeMap::new();
        for &score in scores.iter().filter(|s| rubric.contains_key(&s.criterion_id)) {
            latest
                .entry(score.criterion_id)
                .and_modify(|current| {
                    if (score.updated_at, score.id) > (current.updated_at, current.id) {
                        *current = score;
                    }
                })
                .or_insert(score);
        }

        let contributions: Vec<CriterionContribution> = latest
            .values()
            .filter_map(|s| rubric.get(&s.criterion_id).map(|c| Self::contribution(c, s.raw_score)))
            .collect();

        let mut missing_criteria: Vec<CriterionId> = criteria
            .iter()
            .map(|c| c.id)
            .filter(|id| !latest.contains_key(id))
            .collect();
        missing_criteria.sort();

        let sum: f64 = contributions.iter().map(|c| c.weighted).sum();
        let total = match policy {
            PartialScoringPolicy::Renormalize if !missing_criteria.is_empty() => {
                let scored_weight: f64 = contributions.iter().map(|c| c.weight.as_f64()).sum();
                let full_weight: f64 = criteria.iter().map(|c| c.weight.as_f64()).sum();
                if scored_weight > 0.0 {
                    sum * full_weight / scored_weight
                } else {
                    0.0
                }
            }
            _ => sum,
        };

        EvaluatorTotal {
            evaluator_id: evaluator_id.clone(),
            contributions,
            missing_criteria,
            total,
        }
    }

    /// Mean of the evaluator totals that count under `policy`.
    pub fn consensus(totals: &[EvaluatorTotal], policy: PartialScoringPolicy) -> Option<f64> {
        let counted: Vec<f64> = totals
            .iter()
            .filter(|t| policy != PartialScoringPolicy::ExcludeIncomplete || t.is_complete())
            .map(|t| t.total)
            .collect();

        if counted.is_empty() {
            None
        } else {
            Some(counted.iter().sum::<f64>() / counted.len() as f64)
        }
    }

    /// Scores one nomination from its flat score rows.
    pub fn score_nomination(
        nomination_id: NominationId,
        criteria: &[Criterion],
        scores: &[EvaluationScore],
        policy: PartialScoringPolicy,
    ) -> NominationScore {
        let mut by_evaluator: BTreeMap<&UserId, Vec<&EvaluationScore>> = BTreeMap::new();
        for score in scores.iter().filter(|s| s.nomination_id == nomination_id) {
            by_evaluator.entry(&score.evaluator_id).or_default().push(score);
        }

        let evaluators: Vec<EvaluatorTotal> = by_evaluator
            .into_iter()
            .map(|(evaluator, rows)| Self::evaluator_total(evaluator, criteria, &rows, policy))
            .filter(|t| !t.contributions.is_empty())
            .collect();
        let consensus = Self::consensus(&evaluators, policy);

        NominationScore {
            nomination_id,
            policy,
            evaluators,
            consensus,
        }
    }
}

/// A nomination's place in the approach order of its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNomination {
    /// 1-based.
    pub rank: usize,
    pub nomination: Nomination,
    pub consensus: Option<f64>,
    pub evaluator_count: usize,
}

/// Orders active nominations by consensus, highest first.
///
/// Unscored nominations come last; ties go to the earlier submission.
pub fn rank_nominations(scored: Vec<(Nomination, NominationScore)>) -> Vec<RankedNomination> {
    let mut active: Vec<(Nomination, NominationScore)> =
        scored.into_iter().filter(|(n, _)| n.is_active()).collect();

    active.sort_by(|(na, sa), (nb, sb)| {
        compare_consensus(sa.consensus, sb.consensus)
            .then_with(|| na.created_at.cmp(&nb.created_at))
            .then_with(|| na.id.cmp(&nb.id))
    });

    active
        .into_iter()
        .enumerate()
        .map(|(idx, (nomination, score))| RankedNomination {
            rank: idx + 1,
            evaluator_count: score.evaluators.len(),
            consensus: score.consensus,
            nomination,
        })
        .collect()
}

fn compare_consensus(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CycleId, PositionId, Timestamp};
    use proptest::prelude::*;

    fn chair_rubric() -> (PositionId, Criterion, Criterion) {
        let position = PositionId::new();
        let a = Criterion::new(position, "A", Weight::new(60).unwrap(), 10, 1).unwrap();
        let b = Criterion::new(position, "B", Weight::new(40).unwrap(), 5, 2).unwrap();
        (position, a, b)
    }

    fn evaluator(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn score(n: NominationId, e: &str, c: &Criterion, raw: f64) -> EvaluationScore {
        EvaluationScore::new(n, evaluator(e), c, raw).unwrap()
    }

    #[test]
    fn chair_scenario_totals_eighty() {
        let (_, a, b) = chair_rubric();
        let n = NominationId::new();
        let scores = vec![score(n, "e1", &a, 8.0), score(n, "e1", &b, 4.0)];

        let result = WeightedScoreCalculator::score_nomination(
            n,
            &[a.clone(), b.clone()],
            &scores,
            PartialScoringPolicy::SumScored,
        );

        let e1 = &result.evaluators[0];
        let weighted_a = e1.contributions.iter().find(|c| c.criterion_id == a.id).unwrap();
        let weighted_b = e1.contributions.iter().find(|c| c.criterion_id == b.id).unwrap();
        assert_eq!(weighted_a.weighted, 48.0);
        assert_eq!(weighted_b.weighted, 32.0);
        assert_eq!(e1.total, 80.0);
        assert!(e1.is_complete());
        assert_eq!(result.consensus, Some(80.0));
    }

    #[test]
    fn consensus_is_mean_of_evaluators() {
        let (_, a, b) = chair_rubric();
        let n = NominationId::new();
        let scores = vec![
            score(n, "e1", &a, 8.0),
            score(n, "e1", &b, 4.0),
            score(n, "e2", &a, 10.0),
            score(n, "e2", &b, 5.0),
        ];

        let result = WeightedScoreCalculator::score_nomination(
            n,
            &[a, b],
            &scores,
            PartialScoringPolicy::SumScored,
        );
        assert_eq!(result.evaluators.len(), 2);
        assert_eq!(result.consensus, Some(90.0));
    }

    #[test]
    fn no_scores_means_no_consensus() {
        let (_, a, b) = chair_rubric();
        let result = WeightedScoreCalculator::score_nomination(
            NominationId::new(),
            &[a, b],
            &[],
            PartialScoringPolicy::SumScored,
        );
        assert!(result.evaluators.is_empty());
        assert_eq!(result.consensus, None);
    }

    #[test]
    fn weights_need_not_sum_to_one_hundred() {
        let position = PositionId::new();
        let only = Criterion::new(position, "Only", Weight::new(30).unwrap(), 4, 1).unwrap();
        let n = NominationId::new();

        let result = WeightedScoreCalculator::score_nomination(
            n,
            &[only.clone()],
            &[score(n, "e1", &only, 4.0)],
            PartialScoringPolicy::SumScored,
        );
        assert_eq!(result.consensus, Some(30.0));
    }

    #[test]
    fn partial_evaluation_under_each_policy() {
        let (_, a, b) = chair_rubric();
        let n = NominationId::new();
        // e1 skipped B, e2 scored everything.
        let scores = vec![
            score(n, "e1", &a, 8.0),
            score(n, "e2", &a, 10.0),
            score(n, "e2", &b, 5.0),
        ];
        let rubric = [a.clone(), b.clone()];

        let summed = WeightedScoreCalculator::score_nomination(
            n,
            &rubric,
            &scores,
            PartialScoringPolicy::SumScored,
        );
        let e1 = &summed.evaluators[0];
        assert_eq!(e1.total, 48.0);
        assert_eq!(e1.missing_criteria, vec![b.id]);
        assert_eq!(summed.consensus, Some(74.0));

        let renormalized = WeightedScoreCalculator::score_nomination(
            n,
            &rubric,
            &scores,
            PartialScoringPolicy::Renormalize,
        );
        assert!((renormalized.evaluators[0].total - 80.0).abs() < 1e-9);
        assert!((renormalized.consensus.unwrap() - 90.0).abs() < 1e-9);

        let complete_only = WeightedScoreCalculator::score_nomination(
            n,
            &rubric,
            &scores,
            PartialScoringPolicy::ExcludeIncomplete,
        );
        assert_eq!(complete_only.evaluators.len(), 2);
        assert_eq!(complete_only.consensus, Some(100.0));
    }

    #[test]
    fn renormalize_with_zero_scored_weight_stays_zero() {
        let position = PositionId::new();
        let free = Criterion::new(position, "Free", Weight::new(0).unwrap(), 5, 1).unwrap();
        let paid = Criterion::new(position, "Paid", Weight::new(50).unwrap(), 5, 2).unwrap();
        let n = NominationId::new();

        let result = WeightedScoreCalculator::score_nomination(
            n,
            &[free.clone(), paid],
            &[score(n, "e1", &free, 5.0)],
            PartialScoringPolicy::Renormalize,
        );
        assert_eq!(result.consensus, Some(0.0));
    }

    #[test]
    fn scores_for_unknown_criteria_are_ignored() {
        let (_, a, b) = chair_rubric();
        let stray = Criterion::new(PositionId::new(), "Stray", Weight::new(90).unwrap(), 10, 1)
            .unwrap();
        let n = NominationId::new();

        let result = WeightedScoreCalculator::score_nomination(
            n,
            &[a.clone(), b],
            &[score(n, "e1", &a, 10.0), score(n, "e1", &stray, 10.0)],
            PartialScoringPolicy::SumScored,
        );
        assert_eq!(result.consensus, Some(60.0));
    }

    #[test]
    fn ranking_orders_by_consensus_then_submission() {
        let cycle = CycleId::new();
        let (position, a, _) = chair_rubric();
        let mk = |nominee: &str, offset: i64| {
            let (mut n, _) = Nomination::submit(
                cycle,
                position,
                evaluator(nominee),
                evaluator("nominator"),
                None,
            )
            .unwrap();
            n.created_at = Timestamp::now().plus_secs(offset);
            n
        };
        let early = mk("early", 0);
        let late = mk("late", 10);
        let best = mk("best", 20);
        let unscored = mk("unscored", -10);

        let score_of = |n: &Nomination, raw: Option<f64>| {
            let rows: Vec<EvaluationScore> =
                raw.map(|r| vec![score(n.id, "e1", &a, r)]).unwrap_or_default();
            WeightedScoreCalculator::score_nomination(
                n.id,
                &[a.clone()],
                &rows,
                PartialScoringPolicy::SumScored,
            )
        };

        let ranked = rank_nominations(vec![
            (unscored.clone(), score_of(&unscored, None)),
            (late.clone(), score_of(&late, Some(5.0))),
            (best.clone(), score_of(&best, Some(9.0))),
            (early.clone(), score_of(&early, Some(5.0))),
        ]);

        let order: Vec<NominationId> = ranked.iter().map(|r| r.nomination.id).collect();
        assert_eq!(order, vec![best.id, early.id, late.id, unscored.id]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].consensus, None);
    }

    #[test]
    fn policy_parses_config_values() {
        assert_eq!(
            "Renormalize".parse::<PartialScoringPolicy>().unwrap(),
            PartialScoringPolicy::Renormalize
        );
        assert!("average".parse::<PartialScoringPolicy>().is_err());
        assert_eq!(PartialScoringPolicy::default(), PartialScoringPolicy::SumScored);
    }

    proptest! {
        #[test]
        fn weighted_matches_formula(max in 1u32..1000, weight in 0u8..=100, frac in 0.0f64..=1.0) {
            let raw = frac * f64::from(max);
            let w = Weight::new(weight).unwrap();
            let expected = (raw / f64::from(max)) * 100.0 * f64::from(weight) / 100.0;
            let actual = WeightedScoreCalculator::weighted(raw, max, w);

            prop_assert!((actual - expected).abs() < 1e-9);
            prop_assert_eq!(actual, WeightedScoreCalculator::weighted(raw, max, w));
        }

        #[test]
        fn total_is_independent_of_row_order(
            raws in proptest::collection::vec((0u32..=10, 1u8..=100), 1..8),
            rotate in 0usize..8,
        ) {
            let position = PositionId::new();
            let n = NominationId::new();
            let criteria: Vec<Criterion> = raws
                .iter()
                .enumerate()
                .map(|(i, (_, w))| {
                    Criterion::new(position, format!("c{i}"), Weight::new(*w).unwrap(), 10, i as u32)
                        .unwrap()
                })
                .collect();
            let rows: Vec<EvaluationScore> = criteria
                .iter()
                .zip(raws.iter())
                .map(|(c, (raw, _))| score(n, "e1", c, f64::from(*raw)))
                .collect();

            let mut shuffled = rows.clone();
            shuffled.reverse();
            let len = shuffled.len();
            shuffled.rotate_left(rotate % len);

            let forward = WeightedScoreCalculator::score_nomination(
                n, &criteria, &rows, PartialScoringPolicy::SumScored);
            let permuted = WeightedScoreCalculator::score_nomination(
                n, &criteria, &shuffled, PartialScoringPolicy::SumScored);

            prop_assert_eq!(forward.consensus, permuted.consensus);
        }
    }
}
