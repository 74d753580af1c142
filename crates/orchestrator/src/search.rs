//! Search orchestration: provider call, parsing, relevance, one refine.

use chrono::NaiveDateTime;
use relevance::{QueryIntent, RelevanceEngine, ScoredCandidate, TopicProfile};
use tracing::{debug, info, warn};
use watch_core::{SearchDepth, SearchProvider, SearchRequest, TopicQuery};

use crate::parse::parse_response;

/// Largest number of results returned for one due-check.
pub const MAX_RESULTS: usize = 7;

/// Below this many relevant results, one refine query is issued.
pub const MIN_RELEVANT_RESULTS: usize = 3;

/// Most provider calls a single due-check may make (primary + refine).
pub const MAX_PROVIDER_CALLS: u32 = 2;

/// Tuning for [`SearchOrchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub max_results: usize,
    pub min_relevant: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            min_relevant: MIN_RELEVANT_RESULTS,
        }
    }
}

/// Result of one orchestrated search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Relevant results, best first, at most `max_results`.
    pub results: Vec<ScoredCandidate>,
    /// External calls actually made. The caller charges quota per call.
    pub provider_calls: u32,
    /// Whether the refine query was issued.
    pub refined: bool,
    /// Whether any provider call failed.
    pub provider_failed: bool,
    pub intent: QueryIntent,
}

impl SearchOutcome {
    fn empty(intent: QueryIntent) -> Self {
        Self {
            results: Vec::new(),
            provider_calls: 0,
            refined: false,
            provider_failed: false,
            intent,
        }
    }
}

/// Drives a [`SearchProvider`] and the relevance engine for one topic.
pub struct SearchOrchestrator<P> {
    provider: P,
    engine: RelevanceEngine,
    config: OrchestratorConfig,
}

impl<P: SearchProvider> SearchOrchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, RelevanceEngine::new(), OrchestratorConfig::default())
    }

    pub fn with_config(provider: P, engine: RelevanceEngine, config: OrchestratorConfig) -> Self {
        Self {
            provider,
            engine,
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Search for a topic, making at most `call_budget` provider calls
    /// (never more than [`MAX_PROVIDER_CALLS`]).
    ///
    /// Provider failures are not errors here: they yield fewer or no
    /// results and set `provider_failed`. A failed primary call is not
    /// followed by a refine call.
    pub async fn search(
        &self,
        topic: &TopicQuery,
        now: NaiveDateTime,
        call_budget: u32,
    ) -> SearchOutcome {
        let profile = self.engine.analyze(&topic.query);
        let mut outcome = SearchOutcome::empty(profile.intent);
        let budget = call_budget.min(MAX_PROVIDER_CALLS);

        if budget == 0 {
            debug!(topic_id = topic.topic_id, "No provider calls allowed, skipping search");
            return outcome;
        }

        let primary_query = profile.intent.expand_query(&topic.query);
        let primary = SearchRequest::new(primary_query.clone(), self.config.max_results);

        outcome.provider_calls += 1;
        match self.run_query(topic, &profile, &primary).await {
            Some(results) => outcome.results = results,
            None => {
                outcome.provider_failed = true;
                return outcome;
            }
        }

        if outcome.results.len() >= self.config.min_relevant || budget < 2 {
            outcome.results.truncate(self.config.max_results);
            return outcome;
        }

        let refine = SearchRequest::new(
            refine_query(&primary_query, now),
            self.config.max_results,
        )
        .with_depth(SearchDepth::Advanced);

        info!(
            topic_id = topic.topic_id,
            relevant = outcome.results.len(),
            "Too few relevant results, issuing refine query"
        );

        outcome.provider_calls += 1;
        outcome.refined = true;
        match self.run_query(topic, &profile, &refine).await {
            Some(extra) => merge_results(&mut outcome.results, extra, self.config.max_results),
            None => outcome.provider_failed = true,
        }

        outcome.results.truncate(self.config.max_results);
        outcome
    }

    /// One provider call, parsed and ranked. `None` on provider failure.
    async fn run_query(
        &self,
        topic: &TopicQuery,
        profile: &TopicProfile,
        request: &SearchRequest,
    ) -> Option<Vec<ScoredCandidate>> {
        info!(
            provider = self.provider.name(),
            topic_id = topic.topic_id,
            query = %request.query.chars().take(200).collect::<String>(),
            "Searching"
        );

        let body = match self.provider.search(request).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    topic_id = topic.topic_id,
                    "Search failed: {}",
                    e
                );
                return None;
            }
        };

        let parsed = parse_response(&body);
        let found = parsed.candidates.len();
        let ranked = self.engine.evaluate(profile, parsed.candidates);

        debug!(
            topic_id = topic.topic_id,
            source = ?parsed.source,
            found,
            relevant = ranked.len(),
            "Evaluated provider results"
        );

        Some(ranked)
    }
}

/// The refine query: the expanded query plus a recency qualifier.
pub fn refine_query(query: &str, now: NaiveDateTime) -> String {
    format!("{} {} latest", query, now.format("%B %Y"))
}

/// Append `extra` after `results`, skipping URLs already present, until
/// `cap` entries. Existing order is kept.
pub fn merge_results(results: &mut Vec<ScoredCandidate>, extra: Vec<ScoredCandidate>, cap: usize) {
    for candidate in extra {
        if results.len() >= cap {
            break;
        }
        if results
            .iter()
            .any(|r| r.candidate.url == candidate.candidate.url)
        {
            continue;
        }
        results.push(candidate);
    }
}
