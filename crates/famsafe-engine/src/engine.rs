//! Escalation engine
//!
//! One independent state machine per alert: `submit` spawns a tokio task
//! that drives the run through its policy's steps, dispatching
//! notifications through channel adapters and waiting out each step's
//! acknowledgment window. Runs for distinct alerts execute fully
//! concurrently; within a run the step sequence is strictly sequential.
//!
//! The wait between dispatch and the next-step decision is the only long
//! suspension and is cancellable by acknowledgment or operator override
//! without leaking timers (`tokio::select!` drops the sleep).

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::run::{AttemptRecord, RunHandle, RunRecord, RunState};
use crate::tracker::{AckStatus, AckTracker};
use chrono::Utc;
use dashmap::DashMap;
use famsafe_alert::{Alert, AlertId, ChannelKind, ContactId, RunId};
use famsafe_directory::{Contact, ContactDirectory};
use famsafe_notify::{
    dispatch_with_retry, ChannelRegistry, DeliveryResult, EmailChannel, SmsChannel, VoiceChannel,
};
use famsafe_policy::{EscalationPolicy, EscalationStep, PolicyStore};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

/// The escalation engine
///
/// Owns the live run registry and the archive of finished runs; consults
/// the contact directory and policy store through per-step snapshots.
pub struct EscalationEngine {
    config: Arc<EngineConfig>,
    directory: Arc<ContactDirectory>,
    policies: Arc<PolicyStore>,
    channels: Arc<ChannelRegistry>,
    tracker: Arc<AckTracker>,
    runs: Arc<DashMap<RunId, RunHandle>>,
    by_alert: Arc<DashMap<AlertId, RunId>>,
    archive: Arc<DashMap<RunId, RunRecord>>,
}

impl EscalationEngine {
    /// Create an engine over existing collaborators
    #[must_use]
    pub fn new(
        config: EngineConfig,
        directory: Arc<ContactDirectory>,
        policies: Arc<PolicyStore>,
        channels: Arc<ChannelRegistry>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            directory,
            policies,
            channels,
            tracker: Arc::new(AckTracker::new()),
            runs: Arc::new(DashMap::new()),
            by_alert: Arc::new(DashMap::new()),
            archive: Arc::new(DashMap::new()),
        }
    }

    /// Engine with an empty directory, the default policy matrix, and
    /// dev-mode (logging) adapters for all built-in channels
    #[must_use]
    pub fn with_defaults() -> Self {
        let channels = ChannelRegistry::new()
            .with_adapter(Arc::new(EmailChannel::new()))
            .with_adapter(Arc::new(SmsChannel::new()))
            .with_adapter(Arc::new(VoiceChannel::new()));
        Self::new(
            EngineConfig::default(),
            Arc::new(ContactDirectory::new()),
            Arc::new(PolicyStore::with_defaults()),
            Arc::new(channels),
        )
    }

    /// Submit an alert for escalation
    ///
    /// Resolves the policy for the alert's severity (falling back to the
    /// always-critical policy on a miss), creates a run at step 0, and
    /// spawns its state machine. Duplicate submissions of the same origin
    /// event are the caller's concern; every call creates a new run.
    pub fn submit(&self, alert: Alert) -> RunId {
        let run_id = RunId::new();
        let alert_id = alert.id;
        let (policy, used_fallback) = self.policies.get_or_fallback(alert.severity);
        let ack_rx = self.tracker.register(alert_id);
        let (state_tx, state_rx) = watch::channel(RunState::Pending);
        let escalate = Arc::new(Notify::new());

        tracing::info!(
            run_id = %run_id,
            alert_id = %alert_id,
            severity = %alert.severity,
            alert_type = %alert.alert_type,
            used_fallback,
            "alert submitted, escalation run created"
        );

        let ctx = RunContext {
            run_id,
            alert,
            policy,
            used_fallback,
            config: self.config.clone(),
            directory: self.directory.clone(),
            channels: self.channels.clone(),
            tracker: self.tracker.clone(),
            state_tx,
            escalate: escalate.clone(),
            ack_rx,
            runs: self.runs.clone(),
            by_alert: self.by_alert.clone(),
            archive: self.archive.clone(),
        };
        // Register the handle before the task starts so a fast-terminating
        // run finds its own entries to clean up.
        self.by_alert.insert(alert_id, run_id);
        self.runs.insert(
            run_id,
            RunHandle {
                alert_id,
                state_rx,
                escalate,
            },
        );
        tokio::spawn(drive_run(ctx));
        run_id
    }

    /// Record a contact's acknowledgment of an alert
    ///
    /// Cancels the run's pending wait timer; no step beyond the one
    /// reached dispatches afterwards.
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` (wrapped) if the alert has no live run
    pub fn acknowledge(
        &self,
        alert_id: AlertId,
        contact_id: ContactId,
    ) -> Result<AckStatus, EngineError> {
        Ok(self.tracker.acknowledge(alert_id, contact_id, Utc::now())?)
    }

    /// Record a contact's resolution of an alert
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` (wrapped) if the alert has no live run
    pub fn resolve(
        &self,
        alert_id: AlertId,
        contact_id: ContactId,
    ) -> Result<AckStatus, EngineError> {
        Ok(self.tracker.resolve(alert_id, contact_id, Utc::now())?)
    }

    /// Acknowledgment status of a live alert
    ///
    /// # Errors
    /// `TrackerError::UnknownAlert` (wrapped) for archived/unknown alerts
    pub fn ack_status(&self, alert_id: AlertId) -> Result<AckStatus, EngineError> {
        Ok(self.tracker.status_of(alert_id)?)
    }

    /// Operator override: advance a waiting run immediately, bypassing the
    /// remainder of its acknowledgment window
    ///
    /// # Errors
    /// `EngineError::RunNotFound` if the run is not live
    pub fn escalate_now(&self, run_id: RunId) -> Result<(), EngineError> {
        let handle = self.runs.get(&run_id).ok_or(EngineError::RunNotFound(run_id))?;
        tracing::info!(run_id = %run_id, alert_id = %handle.alert_id, "manual escalation requested");
        handle.escalate.notify_one();
        Ok(())
    }

    /// Current state of a run, live or archived
    #[must_use]
    pub fn run_status(&self, run_id: RunId) -> Option<RunState> {
        if let Some(handle) = self.runs.get(&run_id) {
            return Some(*handle.state_rx.borrow());
        }
        self.archive.get(&run_id).map(|record| record.state)
    }

    /// Live run id for an alert, if its run has not terminated
    #[must_use]
    pub fn run_for_alert(&self, alert_id: AlertId) -> Option<RunId> {
        self.by_alert.get(&alert_id).map(|entry| *entry)
    }

    /// Archived record of a finished run
    #[must_use]
    pub fn archived(&self, run_id: RunId) -> Option<RunRecord> {
        self.archive.get(&run_id).map(|record| record.clone())
    }

    /// Wait until a run terminates and return its archived record
    ///
    /// Returns `None` for unknown run ids.
    pub async fn wait_terminal(&self, run_id: RunId) -> Option<RunRecord> {
        let state_rx = match self.runs.get(&run_id) {
            Some(handle) => Some(handle.state_rx.clone()),
            None => None,
        };
        if let Some(mut rx) = state_rx {
            // The archive entry is written before the terminal state is
            // published, so it is present once this resolves.
            let _ = rx.wait_for(|state| state.is_terminal()).await;
        }
        self.archived(run_id)
    }

    /// Number of live runs
    #[must_use]
    pub fn live_runs(&self) -> usize {
        self.runs.len()
    }

    /// The engine's acknowledgment tracker
    #[must_use]
    pub fn tracker(&self) -> &AckTracker {
        &self.tracker
    }

    /// The engine's configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl std::fmt::Debug for EscalationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationEngine")
            .field("live_runs", &self.runs.len())
            .field("archived_runs", &self.archive.len())
            .finish()
    }
}

/// Everything one run's task needs
struct RunContext {
    run_id: RunId,
    alert: Alert,
    policy: Arc<EscalationPolicy>,
    used_fallback: bool,
    config: Arc<EngineConfig>,
    directory: Arc<ContactDirectory>,
    channels: Arc<ChannelRegistry>,
    tracker: Arc<AckTracker>,
    state_tx: watch::Sender<RunState>,
    escalate: Arc<Notify>,
    ack_rx: watch::Receiver<AckStatus>,
    runs: Arc<DashMap<RunId, RunHandle>>,
    by_alert: Arc<DashMap<AlertId, RunId>>,
    archive: Arc<DashMap<RunId, RunRecord>>,
}

impl RunContext {
    fn set_state(&self, state: RunState) {
        tracing::info!(
            run_id = %self.run_id,
            alert_id = %self.alert.id,
            state = %state,
            "run state transition"
        );
        let _ = self.state_tx.send(state);
    }

    fn ack_now(&self) -> AckStatus {
        *self.ack_rx.borrow()
    }
}

/// Drive one escalation run to termination
async fn drive_run(mut ctx: RunContext) {
    let created_at = Utc::now();
    let mut notified: HashSet<ContactId> = HashSet::new();
    let mut attempts: Vec<AttemptRecord> = Vec::new();
    let mut step_reached: Option<usize> = None;
    let policy = Arc::clone(&ctx.policy);
    let step_count = policy.step_count();

    let final_state = 'steps: loop {
        for (index, step) in policy.steps.iter().enumerate() {
            // A response may have arrived while the previous step was
            // dispatching; never start a new step after one did.
            if ctx.ack_now().is_terminal() {
                break 'steps terminal_for(ctx.ack_now());
            }

            ctx.set_state(RunState::Notifying(index));
            step_reached = Some(index);

            let step_attempts = dispatch_step(&ctx, index, step, &mut notified).await;
            attempts.extend(step_attempts);

            if ctx.ack_now().is_terminal() {
                // Current-step attempts were allowed to complete; their
                // outcomes are recorded but no longer drive decisions.
                break 'steps terminal_for(ctx.ack_now());
            }

            ctx.set_state(RunState::WaitingAck(index));
            let wait_outcome = wait_for_ack(&mut ctx, step.wait).await;
            match wait_outcome {
                WaitOutcome::Acknowledged(status) => break 'steps terminal_for(status),
                WaitOutcome::Elapsed => {}
                WaitOutcome::ManualAdvance => {
                    tracing::info!(
                        run_id = %ctx.run_id,
                        alert_id = %ctx.alert.id,
                        step = index,
                        "wait bypassed by operator override"
                    );
                }
            }

            if index + 1 < step_count {
                ctx.set_state(RunState::Escalating(index + 1));
            }
        }

        // Every step elapsed without acknowledgment.
        let catch_all = dispatch_catch_all(&ctx, step_count, &notified).await;
        attempts.extend(catch_all);
        break RunState::Exhausted;
    };

    if final_state == RunState::Exhausted {
        let delivered_any = attempts.iter().any(|a| a.outcome.is_delivered());
        tracing::warn!(
            run_id = %ctx.run_id,
            alert_id = %ctx.alert.id,
            steps = step_count,
            delivered_any,
            "escalation exhausted without acknowledgment"
        );
    }

    // Archive before publishing the terminal state so that observers who
    // see the terminal state always find the record.
    let ack_audit = ctx.tracker.archive(ctx.alert.id).map(|(_, audit)| audit).unwrap_or_default();
    let record = RunRecord {
        run_id: ctx.run_id,
        alert: ctx.alert.clone(),
        state: final_state,
        step_reached,
        attempts,
        ack_audit,
        used_fallback_policy: ctx.used_fallback,
        created_at,
        terminated_at: Utc::now(),
    };
    ctx.archive.insert(ctx.run_id, record);
    ctx.by_alert.remove(&ctx.alert.id);
    ctx.runs.remove(&ctx.run_id);
    ctx.set_state(final_state);
}

fn terminal_for(status: AckStatus) -> RunState {
    match status {
        AckStatus::Resolved => RunState::Resolved,
        // Pending cannot reach here; Acknowledged is the safe mapping.
        _ => RunState::Acknowledged,
    }
}

enum WaitOutcome {
    Elapsed,
    Acknowledged(AckStatus),
    ManualAdvance,
}

/// Wait out an acknowledgment window; cancellable by response or override
async fn wait_for_ack(ctx: &mut RunContext, wait: std::time::Duration) -> WaitOutcome {
    tokio::select! {
        changed = ctx.ack_rx.wait_for(|status| status.is_terminal()) => {
            match changed {
                Ok(status) => WaitOutcome::Acknowledged(*status),
                // Tracker entry dropped; treat as an elapsed wait.
                Err(_) => WaitOutcome::Elapsed,
            }
        }
        () = ctx.escalate.notified() => WaitOutcome::ManualAdvance,
        () = tokio::time::sleep(wait) => WaitOutcome::Elapsed,
    }
}

/// Dispatch all (contact, channel) pairs for one step concurrently
async fn dispatch_step(
    ctx: &RunContext,
    step_index: usize,
    step: &EscalationStep,
    notified: &mut HashSet<ContactId>,
) -> Vec<AttemptRecord> {
    // Snapshot the directory at step start; edits take effect next step.
    let contacts = ctx
        .directory
        .list_for(ctx.alert.alert_type, step.tier.min_tier());
    let targets: Vec<Contact> = contacts
        .into_iter()
        .filter(|c| step.renotify || !notified.contains(&c.id))
        .collect();

    if targets.is_empty() {
        tracing::warn!(
            run_id = %ctx.run_id,
            alert_id = %ctx.alert.id,
            step = step_index,
            "no matching contacts for step"
        );
        return Vec::new();
    }

    let records = dispatch_pairs(ctx, step_index, &targets, &step.channels).await;
    notified.extend(targets.iter().map(|c| c.id));
    records
}

/// Final catch-all dispatch once escalation is exhausted
///
/// Notifies the configured emergency tier regardless of per-contact alert
/// type enablement; recorded one step past the policy's last step.
async fn dispatch_catch_all(
    ctx: &RunContext,
    step_count: usize,
    notified: &HashSet<ContactId>,
) -> Vec<AttemptRecord> {
    let targets = ctx.directory.list_tier(ctx.config.catch_all_tier);
    if targets.is_empty() {
        tracing::warn!(
            run_id = %ctx.run_id,
            alert_id = %ctx.alert.id,
            "exhausted with no catch-all contacts configured"
        );
        return Vec::new();
    }
    tracing::info!(
        run_id = %ctx.run_id,
        alert_id = %ctx.alert.id,
        contacts = targets.len(),
        already_notified = notified.len(),
        "dispatching unescalatable-alert catch-all"
    );
    dispatch_pairs(ctx, step_count, &targets, &ctx.config.catch_all_channels).await
}

/// Concurrently dispatch every allowed (contact, channel) pair exactly once
async fn dispatch_pairs(
    ctx: &RunContext,
    step_index: usize,
    targets: &[Contact],
    channels: &[ChannelKind],
) -> Vec<AttemptRecord> {
    // Idempotence within the step: one attempt per (contact, channel).
    let mut seen: HashSet<(ContactId, ChannelKind)> = HashSet::new();
    let mut pending = Vec::new();

    for contact in targets {
        for &kind in channels {
            if !seen.insert((contact.id, kind)) {
                continue;
            }
            let Some(adapter) = ctx.channels.get(kind) else {
                tracing::warn!(
                    run_id = %ctx.run_id,
                    alert_id = %ctx.alert.id,
                    step = step_index,
                    channel = %kind,
                    "no adapter registered for channel"
                );
                pending.push(DispatchJob::Unroutable(contact.id, kind));
                continue;
            };
            pending.push(DispatchJob::Send {
                contact: contact.clone(),
                kind,
                adapter,
            });
        }
    }

    let config = &ctx.config;
    let alert = &ctx.alert;
    let futures = pending.into_iter().map(|job| async move {
        match job {
            DispatchJob::Unroutable(contact_id, kind) => AttemptRecord {
                step: step_index,
                contact_id,
                channel: kind,
                outcome: DeliveryResult::Rejected("no adapter registered".to_string()),
                tries: 0,
            },
            DispatchJob::Send {
                contact,
                kind,
                adapter,
            } => {
                let policy = config.retry_for(kind);
                let (outcome, tries) =
                    dispatch_with_retry(adapter.as_ref(), &contact, alert, &policy).await;
                AttemptRecord {
                    step: step_index,
                    contact_id: contact.id,
                    channel: kind,
                    outcome,
                    tries,
                }
            }
        }
    });

    let records: Vec<AttemptRecord> = join_all(futures).await;
    for record in &records {
        tracing::info!(
            run_id = %ctx.run_id,
            alert_id = %ctx.alert.id,
            step = record.step,
            contact_id = %record.contact_id,
            channel = %record.channel,
            outcome = record.outcome.as_str(),
            tries = record.tries,
            "dispatch attempt resolved"
        );
    }
    records
}

enum DispatchJob {
    Send {
        contact: Contact,
        kind: ChannelKind,
        adapter: Arc<dyn famsafe_notify::ChannelAdapter>,
    },
    Unroutable(ContactId, ChannelKind),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use famsafe_alert::{AlertType, Severity};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn submit_creates_live_run() {
        let engine = EscalationEngine::with_defaults();
        let alert = Alert::new(Severity::Low, AlertType::Wellness, "Check-in");
        let alert_id = alert.id;

        let run_id = engine.submit(alert);
        assert_eq!(engine.run_for_alert(alert_id), Some(run_id));
        assert!(engine.run_status(run_id).is_some());
        assert_eq!(engine.ack_status(alert_id).unwrap(), AckStatus::Pending);
    }

    #[tokio::test]
    async fn acknowledge_unknown_alert_is_an_error() {
        let engine = EscalationEngine::with_defaults();
        let result = engine.acknowledge(AlertId::new(), ContactId::new());
        assert!(matches!(
            result,
            Err(EngineError::Tracker(TrackerError::UnknownAlert(_)))
        ));
    }

    #[tokio::test]
    async fn escalate_now_unknown_run_is_an_error() {
        let engine = EscalationEngine::with_defaults();
        assert!(matches!(
            engine.escalate_now(RunId::new()),
            Err(EngineError::RunNotFound(_))
        ));
    }

    #[test]
    fn terminal_mapping() {
        assert_eq!(terminal_for(AckStatus::Resolved), RunState::Resolved);
        assert_eq!(terminal_for(AckStatus::Acknowledged), RunState::Acknowledged);
    }
}
