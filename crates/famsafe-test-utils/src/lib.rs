//! Testing utilities for the FamilySafe escalation workspace
//!
//! Shared fixtures: a recording/scriptable mock channel adapter, contact
//! builders matching the platform's demo care network, and the stock
//! critical escalation policy used across engine tests.

#![allow(missing_docs)]

use famsafe_alert::{Alert, AlertId, AlertType, ChannelEndpoint, ChannelKind, ContactId, Severity, Tier};
use famsafe_directory::{Contact, ContactDirectory};
use famsafe_notify::{ChannelAdapter, ChannelRegistry, DeliveryResult};
use famsafe_policy::{EscalationPolicy, EscalationStep, TierFilter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One observed delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAttempt {
    pub alert_id: AlertId,
    pub contact_id: ContactId,
    pub channel: ChannelKind,
}

/// Mock channel adapter that records every attempt and optionally replays
/// a scripted outcome sequence (defaulting to `Delivered` once the script
/// is exhausted).
pub struct MockChannel {
    kind: ChannelKind,
    script: Mutex<VecDeque<DeliveryResult>>,
    attempts: Mutex<Vec<RecordedAttempt>>,
}

impl MockChannel {
    pub fn new(kind: ChannelKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script: Mutex::new(VecDeque::new()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    pub fn scripted(kind: ChannelKind, outcomes: impl IntoIterator<Item = DeliveryResult>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script: Mutex::new(outcomes.into_iter().collect()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    /// All attempts seen so far
    pub fn attempts(&self) -> Vec<RecordedAttempt> {
        self.attempts.lock().clone()
    }

    /// Attempt count
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }

    /// Contacts that received at least one attempt
    pub fn notified_contacts(&self) -> Vec<ContactId> {
        let mut ids: Vec<ContactId> = Vec::new();
        for attempt in self.attempts.lock().iter() {
            if !ids.contains(&attempt.contact_id) {
                ids.push(attempt.contact_id);
            }
        }
        ids
    }
}

#[async_trait::async_trait]
impl ChannelAdapter for MockChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn attempt(&self, contact: &Contact, alert: &Alert) -> DeliveryResult {
        self.attempts.lock().push(RecordedAttempt {
            alert_id: alert.id,
            contact_id: contact.id,
            channel: self.kind,
        });
        self.script
            .lock()
            .pop_front()
            .unwrap_or(DeliveryResult::Delivered)
    }
}

/// Registry with a recording mock for each built-in channel kind
pub fn mock_registry() -> (Arc<ChannelRegistry>, Arc<MockChannel>, Arc<MockChannel>, Arc<MockChannel>) {
    let email = MockChannel::new(ChannelKind::Email);
    let sms = MockChannel::new(ChannelKind::Sms);
    let voice = MockChannel::new(ChannelKind::VoiceCall);
    let registry = Arc::new(
        ChannelRegistry::new()
            .with_adapter(email.clone())
            .with_adapter(sms.clone())
            .with_adapter(voice.clone()),
    );
    (registry, email, sms, voice)
}

/// Demo care network from the platform: primary caregiver, doctor,
/// neighbor, emergency services.
pub fn demo_directory() -> (ContactDirectory, Vec<ContactId>) {
    let dir = ContactDirectory::new();
    let ids = vec![
        dir.add(
            Contact::new("Sarah Johnson", Tier::High)
                .with_role("Primary Caregiver")
                .with_relationship("Daughter")
                .with_alert_types([
                    AlertType::Fall,
                    AlertType::Inactivity,
                    AlertType::Wellness,
                    AlertType::MedicationMissed,
                ])
                .with_channel(ChannelEndpoint::email("sarah.j@email.com"))
                .with_channel(ChannelEndpoint::sms("+1 (555) 123-4567"))
                .with_channel(ChannelEndpoint::voice("+1 (555) 123-4567")),
        ),
        dir.add(
            Contact::new("Dr. Michael Chen", Tier::High)
                .with_role("Healthcare Provider")
                .with_relationship("Doctor")
                .with_alert_types([AlertType::Fall, AlertType::Health])
                .with_channel(ChannelEndpoint::email("m.chen@hospital.com"))
                .with_channel(ChannelEndpoint::sms("+1 (555) 987-6543"))
                .with_channel(ChannelEndpoint::voice("+1 (555) 987-6543")),
        ),
        dir.add(
            Contact::new("Robert Smith", Tier::Medium)
                .with_role("Emergency Contact")
                .with_relationship("Neighbor")
                .with_alert_type(AlertType::Fall)
                .with_channel(ChannelEndpoint::sms("+1 (555) 246-8135"))
                .with_channel(ChannelEndpoint::voice("+1 (555) 246-8135")),
        ),
        dir.add(
            Contact::new("Emergency Services", Tier::Critical)
                .with_role("Emergency Services")
                .with_relationship("Official")
                .with_alert_type(AlertType::Fall)
                .with_channel(ChannelEndpoint::voice("911"))
                .with_channel(ChannelEndpoint::sms("911")),
        ),
    ];
    (dir, ids)
}

/// Two-step critical policy: email+SMS to high tiers, then voice to all
pub fn critical_policy(first_wait: Duration, second_wait: Duration) -> EscalationPolicy {
    EscalationPolicy::new(Severity::Critical)
        .with_step(
            EscalationStep::new(TierFilter::AtLeast(Tier::High), first_wait)
                .with_channel(ChannelKind::Email)
                .with_channel(ChannelKind::Sms),
        )
        .with_step(
            EscalationStep::new(TierFilter::All, second_wait).with_channel(ChannelKind::VoiceCall),
        )
}

/// A fall alert matching the demo data
pub fn fall_alert() -> Alert {
    Alert::new(Severity::Critical, AlertType::Fall, "Fall Detected")
        .with_description("Sudden impact detected in living room")
        .with_location("Living Room")
        .with_confidence(96)
}
