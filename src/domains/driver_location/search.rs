use super::ports::{bounded, GeoIndex};
use super::types::{IndexHit, ProximityCandidate, SearchSpec};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of one expanding search, with enough bookkeeping for the caller to tell
/// "no drivers nearby" apart from "the index never answered".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub candidates: Vec<ProximityCandidate>,
    pub tiers_attempted: usize,
    pub tiers_failed: usize,
    pub deadline_reached: bool,
}

impl SearchOutcome {
    /// True when at least one tier was probed and every probe failed.
    pub fn index_unreachable(&self) -> bool {
        self.tiers_attempted > 0 && self.tiers_failed == self.tiers_attempted
    }
}

/// Walks the radius ladder, querying the index once per tier until enough drivers are found.
///
/// Drivers are kept in the order they were discovered: sorted by distance inside a tier,
/// tiers concatenated smallest radius first. A driver accepted at one radius is never
/// re-ranked against drivers found at a larger one.
pub struct ExpandingRadiusSearch {
    index: Arc<dyn GeoIndex>,
    call_timeout: Option<Duration>,
}

impl ExpandingRadiusSearch {
    pub fn new(index: Arc<dyn GeoIndex>) -> Self {
        Self {
            index,
            call_timeout: None,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub async fn run(&self, spec: &SearchSpec) -> SearchOutcome {
        self.run_until(spec, None).await
    }

    /// Same as [`run`](Self::run), abandoning the remaining tiers once `deadline` passes.
    pub async fn run_until(&self, spec: &SearchSpec, deadline: Option<Instant>) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();
        let limit = spec.overfetch_limit();

        for &radius_km in &spec.radii {
            if radius_km > spec.max_radius_km {
                break;
            }

            if outcome.candidates.len() >= spec.target_count {
                break;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    radius_km,
                    found = outcome.candidates.len(),
                    "Search deadline reached, abandoning remaining tiers"
                );
                outcome.deadline_reached = true;
                break;
            }

            outcome.tiers_attempted += 1;

            let query = self
                .index
                .radius_query(spec.center_lat, spec.center_lon, radius_km, limit);
            let hits = match bounded(self.call_timeout, query).await {
                Ok(hits) => hits,
                Err(e) => {
                    outcome.tiers_failed += 1;
                    warn!(radius_km, error = %e, "Radius query failed, treating tier as empty");
                    continue;
                }
            };

            let accepted = accept_tier(
                &mut outcome.candidates,
                &mut seen,
                hits,
                radius_km,
                spec.target_count,
            );

            debug!(
                radius_km,
                accepted,
                total = outcome.candidates.len(),
                "Search tier complete"
            );
        }

        outcome
    }
}

/// Appends the unseen, in-bound hits of one tier, stopping as soon as `target` is met.
fn accept_tier(
    results: &mut Vec<ProximityCandidate>,
    seen: &mut HashSet<String>,
    hits: Vec<IndexHit>,
    radius_km: f64,
    target: usize,
) -> usize {
    let mut accepted = 0;

    for hit in hits {
        if results.len() >= target {
            break;
        }

        if seen.contains(&hit.agent_id) {
            continue;
        }

        // Checked on the unrounded distance; NaN fails this too.
        let within_radius = hit.distance_km <= radius_km;
        if !within_radius {
            debug!(
                driver_id = %hit.agent_id,
                distance_km = hit.distance_km,
                radius_km,
                "Discarding hit reported outside its radius"
            );
            continue;
        }

        seen.insert(hit.agent_id.clone());
        results.push(hit.into());
        accepted += 1;
    }

    accepted
}
