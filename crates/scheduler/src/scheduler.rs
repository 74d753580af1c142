//! Due-Check Scheduler.
//!
//! Each pass lists the topics that are due and checks them one at a time:
//! quota gate, search, dedup admit, notify, advance. A failure inside one
//! topic is logged and the topic is still advanced, so it cannot turn into a
//! retry storm or stall the topics after it.

use std::sync::Arc;

use chrono::NaiveDateTime;
use database::{found_result, topic, user, Database, WatchTopic};
use orchestrator::compose::{
    compose_first_check_empty, compose_limit_reached, compose_monitoring_ended, compose_results,
    compose_topic_registered,
};
use orchestrator::SearchOrchestrator;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use watch_core::{AdvancePlan, Candidate, CheckInterval, Clock, Notifier, SearchProvider};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::quota::QuotaTracker;

/// Which kind of due-check is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// A check from the periodic pass.
    Regular,
    /// The one-shot check shortly after registration.
    First,
}

/// What happened to one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The search ran. `admitted` results were new; `notified` is true when a
    /// message listing them went out.
    Checked {
        provider_calls: u32,
        admitted: usize,
        notified: bool,
    },
    /// The quota gate refused the attempt. Nothing was called, charged or
    /// advanced.
    QuotaExhausted { limit_notified: bool },
    /// The topic or its owner went inactive before the check started.
    Inactive,
    /// A step failed after the attempt started. The topic was still advanced.
    Failed(String),
}

/// Result of checking one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub topic_id: i64,
    pub outcome: CheckOutcome,
    /// The bookkeeping applied, or `None` when the topic was not advanced.
    pub advance: Option<AdvancePlan>,
}

/// Totals for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub due: usize,
    pub checked: usize,
    pub skipped_quota: usize,
    pub failed: usize,
    pub admitted: usize,
    pub notified: usize,
    pub reports: Vec<CheckReport>,
}

impl PassReport {
    fn record(&mut self, report: CheckReport) {
        match &report.outcome {
            CheckOutcome::Checked {
                admitted, notified, ..
            } => {
                self.checked += 1;
                self.admitted += admitted;
                if *notified {
                    self.notified += 1;
                }
            }
            CheckOutcome::QuotaExhausted { .. } => self.skipped_quota += 1,
            CheckOutcome::Inactive => {}
            CheckOutcome::Failed(_) => self.failed += 1,
        }
        self.reports.push(report);
    }
}

/// A registered topic and the handle of its pending first check.
#[derive(Debug)]
pub struct Registration {
    pub topic: WatchTopic,
    pub first_check: JoinHandle<Option<CheckReport>>,
}

/// Drives due-checks for every active topic.
pub struct DueCheckScheduler<P, N, C> {
    db: Database,
    orchestrator: Arc<SearchOrchestrator<P>>,
    notifier: Arc<N>,
    clock: Arc<C>,
    quota: QuotaTracker,
    config: SchedulerConfig,
}

impl<P, N, C> Clone for DueCheckScheduler<P, N, C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            orchestrator: Arc::clone(&self.orchestrator),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            quota: self.quota.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P, N, C> DueCheckScheduler<P, N, C>
where
    P: SearchProvider + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    pub fn new(
        db: Database,
        orchestrator: SearchOrchestrator<P>,
        notifier: N,
        clock: C,
        config: SchedulerConfig,
    ) -> Self {
        let quota = QuotaTracker::new(db.pool().clone(), config.monthly_limit);
        Self {
            db,
            orchestrator: Arc::new(orchestrator),
            notifier: Arc::new(notifier),
            clock: Arc::new(clock),
            quota,
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub(crate) fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Run passes forever, one per tick. A failed pass is logged and the
    /// next tick tries again.
    pub async fn run(&self) {
        let tick = self.config.tick.max(std::time::Duration::from_secs(1));
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!("Starting due-check loop (tick: {:?})", tick);
        loop {
            ticker.tick().await;
            match self.run_pass().await {
                Ok(pass) => info!(
                    due = pass.due,
                    checked = pass.checked,
                    skipped_quota = pass.skipped_quota,
                    failed = pass.failed,
                    admitted = pass.admitted,
                    "Due-check pass complete"
                ),
                Err(e) => error!("Due-check pass aborted: {}", e),
            }
        }
    }

    /// Check every due topic once, sequentially.
    ///
    /// Only a failure to list due topics aborts the pass.
    pub async fn run_pass(&self) -> Result<PassReport, SchedulerError> {
        let topics = topic::list_due_topics(self.db.pool(), self.now()).await?;
        let mut pass = PassReport {
            due: topics.len(),
            ..PassReport::default()
        };

        if topics.is_empty() {
            debug!("No topics due");
            return Ok(pass);
        }
        info!("Found {} due topics", topics.len());

        for (i, watch_topic) in topics.iter().enumerate() {
            if i > 0 && !self.config.topic_delay.is_zero() {
                tokio::time::sleep(self.config.topic_delay).await;
            }
            let report = self.check_topic(watch_topic, CheckMode::Regular).await;
            pass.record(report);
        }

        Ok(pass)
    }

    /// Check one topic and advance it unless the quota gate refused the
    /// attempt.
    pub async fn check_topic(&self, watch_topic: &WatchTopic, mode: CheckMode) -> CheckReport {
        let outcome = match self.attempt(watch_topic, mode).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(topic_id = watch_topic.id, "Error checking topic: {}", e);
                CheckOutcome::Failed(e.to_string())
            }
        };

        let advance = match outcome {
            CheckOutcome::QuotaExhausted { .. } | CheckOutcome::Inactive => None,
            _ => self.advance(watch_topic).await,
        };

        CheckReport {
            topic_id: watch_topic.id,
            outcome,
            advance,
        }
    }

    async fn attempt(
        &self,
        watch_topic: &WatchTopic,
        mode: CheckMode,
    ) -> Result<CheckOutcome, SchedulerError> {
        let now = self.now();
        let user_id = watch_topic.user_id;

        let remaining = self.quota.remaining(user_id, now).await?;
        if remaining <= 0 {
            info!(topic_id = watch_topic.id, user_id, "Monthly limit reached, skipping topic");
            let limit_notified = self.notify_limit(user_id, now).await;
            return Ok(CheckOutcome::QuotaExhausted { limit_notified });
        }

        let budget = u32::try_from(remaining).unwrap_or(u32::MAX);
        let outcome = self
            .orchestrator
            .search(&watch_topic.to_query(), now, budget)
            .await;

        if outcome.provider_calls > 0 {
            self.quota
                .charge(user_id, i64::from(outcome.provider_calls), now)
                .await?;
        }

        let cap = match mode {
            CheckMode::Regular => self.config.max_notified_results,
            CheckMode::First => usize::MAX,
        };

        let mut admitted: Vec<Candidate> = Vec::new();
        let mut admitted_ids = Vec::new();
        for scored in outcome.results.into_iter().take(cap) {
            let candidate = scored.candidate;
            let id = found_result::admit(
                self.db.pool(),
                watch_topic.id,
                &candidate.title,
                &candidate.url,
                candidate.summary.as_deref(),
                now,
            )
            .await?;
            match id {
                Some(id) => {
                    admitted_ids.push(id);
                    admitted.push(candidate);
                }
                None => debug!(topic_id = watch_topic.id, url = %candidate.url, "Already seen"),
            }
        }

        let notified = match compose_results(&watch_topic.query, &admitted) {
            Some(text) => {
                self.notifier.send_message(user_id, &text).await?;
                found_result::mark_sent(self.db.pool(), &admitted_ids).await?;
                info!(
                    topic_id = watch_topic.id,
                    "Sent {} new results",
                    admitted.len()
                );
                true
            }
            None => {
                if mode == CheckMode::First {
                    self.notifier
                        .send_message(user_id, &compose_first_check_empty(&watch_topic.query))
                        .await?;
                }
                false
            }
        };

        Ok(CheckOutcome::Checked {
            provider_calls: outcome.provider_calls,
            admitted: admitted.len(),
            notified,
        })
    }

    async fn advance(&self, watch_topic: &WatchTopic) -> Option<AdvancePlan> {
        let plan = match topic::advance_topic(self.db.pool(), watch_topic.id, self.now()).await {
            Ok(plan) => plan,
            Err(e) => {
                error!(topic_id = watch_topic.id, "Failed to advance topic: {}", e);
                return None;
            }
        };

        if plan.final_check {
            info!(topic_id = watch_topic.id, "Final check done, monitoring ended");
            let text = compose_monitoring_ended(&watch_topic.query);
            if let Err(e) = self.notifier.send_message(watch_topic.user_id, &text).await {
                warn!(topic_id = watch_topic.id, "Failed to send monitoring-ended message: {}", e);
            }
        }

        Some(plan)
    }

    /// Send the limit message if this is the first refusal of the period.
    async fn notify_limit(&self, user_id: i64, now: NaiveDateTime) -> bool {
        match self.quota.claim_limit_notification(user_id, now).await {
            Ok(true) => {
                let text = compose_limit_reached(self.quota.monthly_limit());
                match self.notifier.send_message(user_id, &text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(user_id, "Failed to send limit message: {}", e);
                        false
                    }
                }
            }
            Ok(false) => false,
            Err(e) => {
                warn!(user_id, "Failed to claim limit notification: {}", e);
                false
            }
        }
    }

    /// Register a new topic for a user and schedule its first check.
    ///
    /// Refused with [`SchedulerError::QuotaExceeded`] when the user has no
    /// searches left this period.
    pub async fn register_topic(
        &self,
        user_id: i64,
        username: Option<&str>,
        query: &str,
        interval: CheckInterval,
    ) -> Result<Registration, SchedulerError> {
        let now = self.now();
        user::ensure_user(self.db.pool(), user_id, username, now).await?;

        if self.quota.remaining(user_id, now).await? <= 0 {
            return Err(SchedulerError::QuotaExceeded {
                user_id,
                limit: self.quota.monthly_limit(),
            });
        }

        let watch_topic = topic::create_topic(self.db.pool(), user_id, query, interval, now).await?;
        info!(topic_id = watch_topic.id, user_id, "Registered topic ({})", interval.label());

        let text = compose_topic_registered(&watch_topic.query, interval);
        if let Err(e) = self.notifier.send_message(user_id, &text).await {
            warn!(topic_id = watch_topic.id, "Failed to send confirmation: {}", e);
        }

        let first_check = self.schedule_first_check(watch_topic.id);
        Ok(Registration {
            topic: watch_topic,
            first_check,
        })
    }

    /// Run the one-shot first check after the configured delay on a
    /// detached task.
    pub fn schedule_first_check(&self, topic_id: i64) -> JoinHandle<Option<CheckReport>> {
        let this = self.clone();
        let delay = self.config.first_check_delay;
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            this.run_first_check(topic_id).await
        })
    }

    async fn run_first_check(&self, topic_id: i64) -> Option<CheckReport> {
        let watch_topic = match topic::get_topic(self.db.pool(), topic_id).await {
            Ok(t) => t,
            Err(e) => {
                error!(topic_id, "Failed to load topic for first check: {}", e);
                return None;
            }
        };

        let owner_active = match user::get_user(self.db.pool(), watch_topic.user_id).await {
            Ok(u) => u.is_active,
            Err(e) => {
                error!(topic_id, "Failed to load topic owner: {}", e);
                return None;
            }
        };

        if !watch_topic.is_active || !owner_active {
            debug!(topic_id, "Topic inactive, skipping first check");
            return Some(CheckReport {
                topic_id,
                outcome: CheckOutcome::Inactive,
                advance: None,
            });
        }

        info!(topic_id, "Running first check");
        Some(self.check_topic(&watch_topic, CheckMode::First).await)
    }

    /// Replace the text of one of the user's topics.
    pub async fn update_topic_text(
        &self,
        user_id: i64,
        topic_id: i64,
        query: &str,
    ) -> Result<(), SchedulerError> {
        topic::update_topic_text(self.db.pool(), user_id, topic_id, query).await?;
        info!(topic_id, user_id, "Updated topic text");
        Ok(())
    }

    /// Change the interval of one of the user's topics.
    pub async fn update_topic_interval(
        &self,
        user_id: i64,
        topic_id: i64,
        interval: CheckInterval,
    ) -> Result<(), SchedulerError> {
        topic::update_topic_interval(self.db.pool(), user_id, topic_id, interval).await?;
        info!(topic_id, user_id, "Updated topic interval ({})", interval.label());
        Ok(())
    }

    /// Stop watching one of the user's topics.
    pub async fn deactivate_topic(&self, user_id: i64, topic_id: i64) -> Result<(), SchedulerError> {
        topic::deactivate_topic(self.db.pool(), user_id, topic_id).await?;
        info!(topic_id, user_id, "Deactivated topic");
        Ok(())
    }

    /// Pause or resume all of a user's topics.
    pub async fn set_user_active(&self, user_id: i64, active: bool) -> Result<(), SchedulerError> {
        user::set_user_active(self.db.pool(), user_id, active).await?;
        info!(user_id, active, "Changed user activity");
        Ok(())
    }

    /// The user's active topics.
    pub async fn list_user_topics(&self, user_id: i64) -> Result<Vec<WatchTopic>, SchedulerError> {
        Ok(topic::list_user_topics(self.db.pool(), user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use mock_provider::{results_json, FixedClock, RecordingNotifier, ScriptedProvider};
    use std::time::Duration;

    type TestScheduler = DueCheckScheduler<ScriptedProvider, RecordingNotifier, FixedClock>;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    async fn setup() -> (TestScheduler, ScriptedProvider, RecordingNotifier, FixedClock) {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let provider = ScriptedProvider::new();
        let notifier = RecordingNotifier::new();
        let clock = FixedClock::new(t0());
        let config = SchedulerConfig::builder()
            .topic_delay(Duration::ZERO)
            .first_check_delay(Duration::ZERO)
            .monthly_limit(10)
            .build();

        let scheduler = DueCheckScheduler::new(
            db,
            SearchOrchestrator::new(provider.clone()),
            notifier.clone(),
            clock.clone(),
            config,
        );
        (scheduler, provider, notifier, clock)
    }

    fn rust_results() -> String {
        results_json(&[
            ("Rust 1.80 released", "https://blog.rust-lang.org/1.80", Some("Rust release notes")),
            ("Rust 1.81 released", "https://blog.rust-lang.org/1.81", Some("Rust release notes")),
            ("Rust 1.82 released", "https://blog.rust-lang.org/1.82", Some("Rust release notes")),
        ])
    }

    #[tokio::test]
    async fn test_empty_pass() {
        let (scheduler, provider, _, _) = setup().await;
        let pass = scheduler.run_pass().await.unwrap();
        assert_eq!(pass, PassReport::default());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_check_admits_notifies_and_marks_sent() {
        let (scheduler, provider, notifier, _) = setup().await;
        provider.push_body(rust_results());
        let pool = scheduler.database().pool().clone();
        user::ensure_user(&pool, 1, None, t0()).await.unwrap();
        topic::create_topic(&pool, 1, "rust released", CheckInterval::Hours(24), t0())
            .await
            .unwrap();

        let pass = scheduler.run_pass().await.unwrap();
        assert_eq!(pass.due, 1);
        assert_eq!(pass.checked, 1);
        assert_eq!(pass.admitted, 3);
        assert_eq!(pass.notified, 1);

        let messages = notifier.messages_for(1);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("3 new results"));

        let stored = found_result::list_topic_results(&pool, pass.reports[0].topic_id)
            .await
            .unwrap();
        assert!(stored.iter().all(|r| r.is_sent));
        assert_eq!(scheduler.quota().remaining(1, t0()).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_topic_not_due_until_interval_elapsed() {
        let (scheduler, provider, _, clock) = setup().await;
        provider.set_default_body("[]");
        let pool = scheduler.database().pool().clone();
        user::ensure_user(&pool, 1, None, t0()).await.unwrap();
        topic::create_topic(&pool, 1, "rust released", CheckInterval::Hours(6), t0())
            .await
            .unwrap();

        assert_eq!(scheduler.run_pass().await.unwrap().due, 1);
        clock.advance(ChronoDuration::hours(5));
        assert_eq!(scheduler.run_pass().await.unwrap().due, 0);
        clock.advance(ChronoDuration::hours(1));
        assert_eq!(scheduler.run_pass().await.unwrap().due, 1);
    }

    #[tokio::test]
    async fn test_register_refused_at_zero_quota() {
        let (scheduler, _, notifier, _) = setup().await;
        user::ensure_user(scheduler.database().pool(), 1, None, t0())
            .await
            .unwrap();
        scheduler.quota().charge(1, 10, t0()).await.unwrap();

        let result = scheduler
            .register_topic(1, None, "rust released", CheckInterval::Hours(24))
            .await;
        assert!(matches!(
            result,
            Err(SchedulerError::QuotaExceeded { user_id: 1, limit: 10 })
        ));
        assert_eq!(notifier.count(), 0);
        assert!(scheduler.list_user_topics(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_check_skips_deactivated_topic() {
        let (scheduler, provider, _, _) = setup().await;
        let pool = scheduler.database().pool().clone();
        user::ensure_user(&pool, 1, None, t0()).await.unwrap();
        let created = topic::create_topic(&pool, 1, "rust released", CheckInterval::Hours(24), t0())
            .await
            .unwrap();
        scheduler.deactivate_topic(1, created.id).await.unwrap();

        let report = scheduler
            .schedule_first_check(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.outcome, CheckOutcome::Inactive);
        assert_eq!(report.advance, None);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_paused_user_topics_not_due() {
        let (scheduler, provider, _, _) = setup().await;
        let pool = scheduler.database().pool().clone();
        user::ensure_user(&pool, 1, None, t0()).await.unwrap();
        topic::create_topic(&pool, 1, "rust released", CheckInterval::Hours(24), t0())
            .await
            .unwrap();
        scheduler.set_user_active(1, false).await.unwrap();

        assert_eq!(scheduler.run_pass().await.unwrap().due, 0);
        assert_eq!(provider.call_count(), 0);
    }
}
