//! The two-phase Scorer — the most opinionated component, and
//! the one place where the implementation must be bit-reproducible.

use chrono::{DateTime, Utc};

use agentmem_core::config::{DecayFunction, HybridStrategy, RecencyTimestampField, RetrievalConfig};
use agentmem_core::intent::Intent;
use agentmem_core::model::{Entry, EntryKind};

/// Everything the scorer needs about one candidate beyond the `Entry`
/// itself, assembled by the pipeline from the earlier stages' outputs.
#[derive(Debug, Clone, Default)]
pub struct ScoringSignals {
    pub entity_match_boost: f64,
    pub has_explicit_relation: bool,
    pub matching_tag_count: usize,
    /// Position of the entry's scope within the resolved chain, and the
    /// chain's length — `None` when the entry's scope is not in the chain
    /// or the chain has at most one member.
    pub scope_index: Option<(usize, usize)>,
    pub text_matched: bool,
    pub fts_score: Option<f64>,
    pub semantic_score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: Entry,
    pub score: f64,
    pub signals: ScoringSignals,
}

/// Phase 1 — Light Score: cheap linear combination applied to
/// the full candidate pool.
pub fn light_score(entry: &Entry, signals: &ScoringSignals, weights: &agentmem_core::config::ScorerWeights) -> f64 {
    let mut s = 0.0;
    s += signals.entity_match_boost;
    if signals.has_explicit_relation {
        s += weights.explicit_relation;
    }
    s += signals.matching_tag_count as f64 * weights.tag_match;
    if let Some((index, n)) = signals.scope_index {
        if n > 1 {
            s += ((n - index) as f64 / n as f64) * weights.scope_proximity;
        }
    }
    if signals.text_matched {
        s += weights.text_match;
        if let Some(fts) = signals.fts_score {
            s += fts * weights.text_match;
        }
    }
    if let Some(priority) = entry.priority {
        s += (priority as f64 / 100.0) * weights.priority_max;
    }
    if let Some(semantic) = signals.semantic_score {
        s += semantic * weights.semantic_max;
    }
    s
}

fn age_days(ts: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - ts).num_milliseconds() as f64 / agentmem_core::constants::MS_PER_DAY
}

/// Parses a request's `decay_function` string into the matching enum
/// variant, using the same spelling as its serialized form.
pub fn parse_decay_function(s: &str) -> Result<DecayFunction, String> {
    match s {
        "exponential" => Ok(DecayFunction::Exponential),
        "linear" => Ok(DecayFunction::Linear),
        "step" => Ok(DecayFunction::Step),
        other => Err(format!("unknown decay function: {other}")),
    }
}

/// Recency decay. `age_days` may be negative under clock skew;
/// the design explicitly allows the resulting `recency > 1` (edge case).
pub fn recency_score(age_days: f64, half_life_days: f64, function: DecayFunction) -> f64 {
    match function {
        DecayFunction::Exponential => (-std::f64::consts::LN_2 * age_days / half_life_days).exp(),
        DecayFunction::Linear => (1.0 - age_days / (2.0 * half_life_days)).max(0.0),
        DecayFunction::Step => {
            if age_days <= half_life_days {
                1.0
            } else {
                0.5
            }
        }
    }
}

/// Per-(intent, kind) multiplier applied to the pre-feedback score. A fixed
/// 6x4 table; unknown intent defaults to 1.0.
pub fn intent_type_weight(intent: Intent, kind: EntryKind) -> f64 {
    use EntryKind::*;
    use Intent::*;
    match (intent, kind) {
        (Lookup, Knowledge) => 1.2,
        (Lookup, Guideline) => 1.0,
        (Lookup, Tool) => 0.9,
        (Lookup, Experience) => 0.9,

        (HowTo, Tool) => 1.3,
        (HowTo, Guideline) => 1.1,
        (HowTo, Knowledge) => 0.9,
        (HowTo, Experience) => 1.0,

        (Debug, Experience) => 1.3,
        (Debug, Knowledge) => 1.1,
        (Debug, Guideline) => 1.0,
        (Debug, Tool) => 0.9,

        (Explore, Knowledge) => 1.2,
        (Explore, Experience) => 1.1,
        (Explore, Guideline) => 1.0,
        (Explore, Tool) => 0.9,

        (Compare, Knowledge) => 1.2,
        (Compare, Experience) => 1.1,
        (Compare, Guideline) => 1.0,
        (Compare, Tool) => 1.0,

        (Configure, Tool) => 1.3,
        (Configure, Guideline) => 1.1,
        (Configure, Knowledge) => 0.9,
        (Configure, Experience) => 0.9,

        (Unknown, _) => 1.0,
    }
}

/// Feedback multiplier: `m = 1 + min(positive*boost, boostMax) -
/// min(max(-net,0)*penalty, penaltyMax)`.
pub fn feedback_multiplier(positive: u32, net_score: i64, cfg: &agentmem_core::config::FeedbackConfig) -> f64 {
    if !cfg.enabled {
        return 1.0;
    }
    let boost = (positive as f64 * cfg.boost_per_positive).min(cfg.boost_max);
    let penalty = ((-net_score).max(0) as f64 * cfg.penalty_per_negative).min(cfg.penalty_max);
    1.0 + boost - penalty
}

/// Inputs Phase 2 needs beyond what Phase 1 already computed.
#[derive(Debug, Clone, Default)]
pub struct FullScoreContext {
    pub intent: Intent,
    pub hybrid_alpha: f64,
    pub positive_feedback: u32,
    pub net_feedback: i64,
}

/// Phase 2 — Full Score: recency, hybrid blending, intent
/// reweighting, and the feedback multiplier, applied on top of the Phase 1
/// light score.
pub fn full_score(
    entry: &Entry,
    signals: &ScoringSignals,
    light: f64,
    ctx: &FullScoreContext,
    now: DateTime<Utc>,
    config: &RetrievalConfig,
) -> f64 {
    let mut score = light;

    // Hybrid blending replaces the raw semantic contribution in `light`.
    let semantic_contribution = signals.semantic_score.unwrap_or(0.0) * config.scorer.semantic_max;
    let hybrid_contribution = match config.hybrid_strategy {
        HybridStrategy::FtsOnly => 0.0,
        HybridStrategy::SemanticOnly => semantic_contribution,
        HybridStrategy::Hybrid => match signals.semantic_score {
            None => 0.0,
            Some(semantic) => {
                let hybrid_boost = ctx.hybrid_alpha * semantic + (1.0 - ctx.hybrid_alpha) * signals.fts_score.unwrap_or(0.0);
                hybrid_boost * config.scorer.semantic_max
            }
        },
    };
    // Every strategy replaces the semantic contribution baked into `light`
    // with its own `hybrid_contribution` (0 for FtsOnly, the full semantic
    // term for SemanticOnly, the alpha blend for Hybrid) — not just Hybrid,
    // otherwise FtsOnly/SemanticOnly would silently keep the raw semantic
    // weight `light_score` already added.
    score = score - semantic_contribution + hybrid_contribution;

    if config.recency_weight != 0.0 {
        let ts = match config.recency_timestamp_field {
            RecencyTimestampField::CreatedAt => entry.created_at,
            RecencyTimestampField::UpdatedAt => entry.updated_at,
        };
        let recency = recency_score(age_days(ts, now), config.decay_half_life_days, config.decay_function);
        score += recency * config.recency_weight * config.scorer.recency_max;
    }

    score *= intent_type_weight(ctx.intent, entry.kind);
    score *= feedback_multiplier(ctx.positive_feedback, ctx.net_feedback, &config.feedback);

    score
}

/// Final deterministic ordering:
/// higher score, then higher priority, then more recent `updated_at`, then
/// lexicographic id.
pub fn sort_scored(entries: &mut [ScoredEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.entry.priority.unwrap_or(0).cmp(&a.entry.priority.unwrap_or(0)))
            .then_with(|| b.entry.updated_at.cmp(&a.entry.updated_at))
            .then_with(|| a.entry.id.cmp(&b.entry.id))
    });
}

/// Used by Phase 1 to sort/truncate the candidate pool before Phase 2 runs;
/// same tie-break rule applied to the light score alone.
pub fn sort_light(scored: &mut [(Entry, ScoringSignals, f64)]) {
    scored.sort_by(|(ea, _, sa), (eb, _, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| eb.priority.unwrap_or(0).cmp(&ea.priority.unwrap_or(0)))
            .then_with(|| eb.updated_at.cmp(&ea.updated_at))
            .then_with(|| ea.id.cmp(&eb.id))
    });
}
