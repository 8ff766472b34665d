use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::domain::{HealthSample, LatencySample, ProbeResult, TargetId, Verdict};
use crate::ports::MetricStore;

use super::dispatch::{AlertDispatcher, DispatchReport};
use super::probe::HealthProbe;

/// Scheduler phase for the monitored target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    CheckInFlight,
}

/// What asked for a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Operator request; runs regardless of the refresh interval
    Manual,
    /// Timer tick; runs only once the refresh interval has elapsed
    Interval,
}

/// Discrete operator actions
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CheckNow,
    SendAlerts(Verdict),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub at: DateTime<Utc>,
    pub result: ProbeResult,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Completed(CheckReport),
    /// A check against this target is already running
    InFlight,
    /// The refresh interval has not elapsed yet
    NotDue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Check(CheckOutcome),
    Alerts(DispatchReport),
}

/// Everything a dashboard needs to render the current state
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub target: TargetId,
    pub phase: Phase,
    pub last_check: Option<DateTime<Utc>>,
    pub refresh_interval_secs: u64,
    pub alert_threshold_ms: u32,
    pub health_history: Vec<HealthSample>,
    pub latency_history: Vec<LatencySample>,
    pub uptime_percent: Option<f64>,
    pub average_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub last_result: Option<ProbeResult>,
    pub last_verdict: Option<Verdict>,
}

struct SchedulerState {
    phase: Phase,
    last_check: Option<DateTime<Utc>>,
}

impl SchedulerState {
    fn is_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match self.last_check {
            None => true,
            // A clock that moved backwards counts as due rather than stalling the schedule
            Some(last) => (now - last).to_std().map_or(true, |elapsed| elapsed >= interval),
        }
    }
}

/// Returns the phase to `Idle` when dropped, so a cancelled check cannot wedge the scheduler
struct InFlightGuard<'a> {
    scheduler: &'a StdMutex<SchedulerState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock_scheduler(self.scheduler).phase = Phase::Idle;
    }
}

fn lock_scheduler(scheduler: &StdMutex<SchedulerState>) -> MutexGuard<'_, SchedulerState> {
    scheduler.lock().unwrap_or_else(PoisonError::into_inner)
}

struct History {
    store: Box<dyn MetricStore>,
    last_result: Option<ProbeResult>,
    last_verdict: Option<Verdict>,
}

/// One monitoring session: owns the history and drives probe, record, evaluate
pub struct MonitoringSession {
    config: MonitorConfig,
    probe: HealthProbe,
    dispatcher: AlertDispatcher,
    scheduler: StdMutex<SchedulerState>,
    history: Mutex<History>,
}

impl MonitoringSession {
    pub fn new(
        config: MonitorConfig,
        probe: HealthProbe,
        dispatcher: AlertDispatcher,
        store: Box<dyn MetricStore>,
    ) -> Self {
        Self {
            config,
            probe,
            dispatcher,
            scheduler: StdMutex::new(SchedulerState {
                phase: Phase::Idle,
                last_check: None,
            }),
            history: Mutex::new(History {
                store,
                last_result: None,
                last_verdict: None,
            }),
        }
    }

    /// Handle an operator command at the current wall-clock time
    pub async fn handle(&self, command: Command) -> CommandOutcome {
        match command {
            Command::CheckNow => CommandOutcome::Check(self.run(Trigger::Manual, Utc::now()).await),
            Command::SendAlerts(verdict) => {
                CommandOutcome::Alerts(self.dispatcher.dispatch(&verdict, &self.config.target).await)
            }
        }
    }

    /// Run a check if the trigger allows it. Samples are recorded at `now`.
    /// Dropping the returned future mid-check records nothing and leaves the phase `Idle`.
    pub async fn run(&self, trigger: Trigger, now: DateTime<Utc>) -> CheckOutcome {
        let in_flight = {
            let mut scheduler = lock_scheduler(&self.scheduler);
            if scheduler.phase == Phase::CheckInFlight {
                debug!(collection = %self.config.target, ?trigger, "Check already in flight");
                return CheckOutcome::InFlight;
            }
            if trigger == Trigger::Interval && !scheduler.is_due(now, self.config.refresh_interval)
            {
                return CheckOutcome::NotDue;
            }
            scheduler.phase = Phase::CheckInFlight;
            InFlightGuard {
                scheduler: &self.scheduler,
            }
        };

        let result = self.probe.check(&self.config.target).await;
        let verdict = Verdict::evaluate(&result, self.config.threshold_ms());

        {
            let mut history = self.history.lock().await;
            history.store.record(&result, now);
            history.last_result = Some(result.clone());
            history.last_verdict = Some(verdict.clone());
        }

        lock_scheduler(&self.scheduler).last_check = Some(now);
        drop(in_flight);

        match &verdict {
            Verdict::Clear => info!(
                collection = %self.config.target,
                latency_ms = ?result.latency_ms,
                "API is healthy"
            ),
            Verdict::Failure { reason } => {
                warn!(collection = %self.config.target, %reason, "API is down")
            }
            Verdict::LatencyBreach {
                latency_ms,
                threshold_ms,
            } => warn!(
                collection = %self.config.target,
                latency_ms,
                threshold_ms,
                "Response time above threshold"
            ),
        }

        CheckOutcome::Completed(CheckReport {
            at: now,
            result,
            verdict,
        })
    }

    /// Shorthand for an interval-triggered run
    pub async fn tick(&self, now: DateTime<Utc>) -> CheckOutcome {
        self.run(Trigger::Interval, now).await
    }

    /// Verdict of the most recent check, if any
    pub async fn last_verdict(&self) -> Option<Verdict> {
        self.history.lock().await.last_verdict.clone()
    }

    /// Current state, with history pruned to the window ending at `now`.
    /// `history_limit` keeps only the newest entries of each list; statistics
    /// always cover the whole window.
    pub async fn snapshot(&self, now: DateTime<Utc>, history_limit: Option<usize>) -> Snapshot {
        let (phase, last_check) = {
            let scheduler = lock_scheduler(&self.scheduler);
            (scheduler.phase, scheduler.last_check)
        };

        let mut history = self.history.lock().await;
        history.store.prune(now);

        let mut health_history = history.store.health_samples();
        let mut latency_history = history.store.latency_samples();
        if let Some(limit) = history_limit {
            keep_newest(&mut health_history, limit);
            keep_newest(&mut latency_history, limit);
        }

        Snapshot {
            target: self.config.target.clone(),
            phase,
            last_check,
            refresh_interval_secs: self.config.refresh_interval.as_secs(),
            alert_threshold_ms: self.config.alert_threshold_ms,
            health_history,
            latency_history,
            uptime_percent: history.store.uptime_percent(),
            average_latency_ms: history.store.average_latency(),
            max_latency_ms: history.store.max_latency(),
            last_result: history.last_result.clone(),
            last_verdict: history.last_verdict.clone(),
        }
    }

    /// Spawn the timer loop that fires interval-triggered checks
    pub fn spawn_scheduler(self: Arc<Self>, poll: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            info!(
                collection = %self.config.target,
                interval_secs = self.config.refresh_interval.as_secs(),
                "Scheduler started"
            );

            loop {
                ticker.tick().await;
                self.tick(Utc::now()).await;
            }
        })
    }
}

fn keep_newest<T>(samples: &mut Vec<T>, limit: usize) {
    if samples.len() > limit {
        samples.drain(..samples.len() - limit);
    }
}
