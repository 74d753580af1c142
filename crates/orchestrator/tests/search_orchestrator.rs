//! Orchestrator behaviour against scripted providers.

use chrono::{NaiveDate, NaiveDateTime};
use mock_provider::{results_json, FailingProvider, ScriptedProvider};
use orchestrator::{parse_response, ParseSource, SearchOrchestrator, MAX_RESULTS};
use relevance::QueryIntent;
use watch_core::{ProviderError, SearchDepth, TopicQuery};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 14)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn quarterly_topic() -> TopicQuery {
    TopicQuery::new(1, 1001, "quarterly report release")
}

fn three_quarterly_hits() -> String {
    results_json(&[
        ("Acme quarterly report released", "https://ir.acme.example/q1", Some("Revenue up 4%")),
        ("Globex publishes quarterly report", "https://globex.example/q1", None),
        ("Initech report release date", "https://initech.example/news", Some("Q1 figures on May 20")),
    ])
}

#[tokio::test]
async fn test_enough_relevant_results_make_one_call() {
    let provider = ScriptedProvider::new();
    provider.push_body(three_quarterly_hits());
    let orchestrator = SearchOrchestrator::new(provider.clone());

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.provider_calls, 1);
    assert!(!outcome.refined);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_primary_query_carries_intent_modifiers() {
    let provider = ScriptedProvider::always(three_quarterly_hits());
    let orchestrator = SearchOrchestrator::new(provider.clone());

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;

    assert_eq!(outcome.intent, QueryIntent::NewsUpdate);
    let request = &provider.requests()[0];
    assert_eq!(
        request.query,
        "quarterly report release latest news announcement"
    );
    assert_eq!(request.max_results, MAX_RESULTS);
    assert_eq!(request.depth, SearchDepth::Basic);
}

#[tokio::test]
async fn test_refine_is_attempted_exactly_once() {
    let provider = ScriptedProvider::new();
    provider.push_body(results_json(&[(
        "Acme quarterly report released",
        "https://ir.acme.example/q1",
        None,
    )]));
    // Every later call also comes back thin.
    provider.set_default_body(results_json(&[(
        "Globex quarterly report",
        "https://globex.example/q1",
        None,
    )]));
    let orchestrator = SearchOrchestrator::new(provider.clone());

    let outcome = orchestrator.search(&quarterly_topic(), now(), 5).await;

    assert!(outcome.refined);
    assert_eq!(outcome.provider_calls, 2);
    assert_eq!(provider.call_count(), 2);
    assert_eq!(outcome.results.len(), 2);

    let refine = &provider.requests()[1];
    assert!(refine.query.ends_with("May 2025 latest"));
    assert_eq!(refine.depth, SearchDepth::Advanced);
}

#[tokio::test]
async fn test_refine_results_follow_primary_without_duplicates() {
    let provider = ScriptedProvider::new();
    provider.push_body(results_json(&[(
        "Acme quarterly report released",
        "https://ir.acme.example/q1",
        None,
    )]));
    provider.push_body(results_json(&[
        ("Acme quarterly report released today", "https://ir.acme.example/q1", None),
        ("Quarterly report release calendar", "https://calendar.example/q", Some("Quarterly report release dates for every listed company this season")),
    ]));
    let orchestrator = SearchOrchestrator::new(provider);

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;

    let urls: Vec<&str> = outcome
        .results
        .iter()
        .map(|r| r.candidate.url.as_str())
        .collect();
    assert_eq!(urls, vec!["https://ir.acme.example/q1", "https://calendar.example/q"]);
}

#[tokio::test]
async fn test_single_call_budget_skips_refine() {
    let provider = ScriptedProvider::always("[]");
    let orchestrator = SearchOrchestrator::new(provider.clone());

    let outcome = orchestrator.search(&quarterly_topic(), now(), 1).await;

    assert!(outcome.results.is_empty());
    assert!(!outcome.refined);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_zero_budget_makes_no_calls() {
    let provider = ScriptedProvider::always(three_quarterly_hits());
    let orchestrator = SearchOrchestrator::new(provider.clone());

    let outcome = orchestrator.search(&quarterly_topic(), now(), 0).await;

    assert_eq!(outcome.provider_calls, 0);
    assert_eq!(provider.call_count(), 0);
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn test_failed_primary_call_is_no_results_and_no_refine() {
    let provider = FailingProvider::new();
    let orchestrator = SearchOrchestrator::new(provider.clone());

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;

    assert!(outcome.results.is_empty());
    assert!(outcome.provider_failed);
    assert_eq!(outcome.provider_calls, 1);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_failed_refine_keeps_primary_results() {
    let provider = ScriptedProvider::new();
    provider.push_body(results_json(&[(
        "Acme quarterly report released",
        "https://ir.acme.example/q1",
        None,
    )]));
    provider.push_error(ProviderError::Api {
        status: 503,
        message: "overloaded".to_string(),
    });
    let orchestrator = SearchOrchestrator::new(provider);

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;

    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.provider_failed);
    assert_eq!(outcome.provider_calls, 2);
}

#[tokio::test]
async fn test_troubleshooting_drops_generic_tutorials() {
    let provider = ScriptedProvider::new();
    provider.push_body(results_json(&[
        ("Docker tutorial for beginners", "https://learn.example/1", Some("Learn docker build basics")),
        ("How to fix docker build error on arm", "https://stackoverflow.com/q/1", Some("Solution for exec format error on arm64")),
        ("Docker build course overview", "https://course.example/2", None),
        ("Introduction to docker build", "https://intro.example/3", None),
        ("Docker build fails with error on Apple Silicon arm", "https://github.com/docker/issues/2", None),
        ("Getting started with docker build", "https://start.example/4", None),
        ("Docker build tutorial", "https://tutorial.example/5", None),
    ]));
    provider.set_default_body("[]");
    let orchestrator = SearchOrchestrator::new(provider);

    let topic = TopicQuery::new(2, 1001, "docker build error on arm");
    let outcome = orchestrator.search(&topic, now(), 2).await;

    assert_eq!(outcome.intent, QueryIntent::Troubleshooting);
    let urls: Vec<&str> = outcome
        .results
        .iter()
        .map(|r| r.candidate.url.as_str())
        .collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&"https://stackoverflow.com/q/1"));
    assert!(urls.contains(&"https://github.com/docker/issues/2"));
}

#[tokio::test]
async fn test_markdown_fallback_goes_through_relevance() {
    let body = "I could not format JSON, but here are links:\n\
                [Acme quarterly report released](https://ir.acme.example/q1)\n\
                [Cat pictures](https://cats.example/)\n\
                [Globex quarterly report](https://globex.example/q1)\n\
                [Initech report release](https://initech.example/r)";
    let provider = ScriptedProvider::always(body);
    let orchestrator = SearchOrchestrator::new(provider);

    let parsed = parse_response(body);
    assert_eq!(parsed.source, ParseSource::Markdown);

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;
    assert_eq!(outcome.results.len(), 3);
    assert!(outcome
        .results
        .iter()
        .all(|r| r.candidate.url != "https://cats.example/"));
}

#[tokio::test]
async fn test_results_are_capped_at_seven() {
    let items: Vec<(String, String)> = (0..10)
        .map(|i| {
            (
                format!("Quarterly report release {}", i),
                format!("https://news{}.example/q", i),
            )
        })
        .collect();
    let refs: Vec<(&str, &str, Option<&str>)> = items
        .iter()
        .map(|(t, u)| (t.as_str(), u.as_str(), None))
        .collect();
    let provider = ScriptedProvider::always(results_json(&refs));
    let orchestrator = SearchOrchestrator::new(provider);

    let outcome = orchestrator.search(&quarterly_topic(), now(), 2).await;
    assert_eq!(outcome.results.len(), MAX_RESULTS);
}
