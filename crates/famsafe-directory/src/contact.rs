//! Contact records and patches

use famsafe_alert::{AlertType, ChannelEndpoint, ContactId, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a contact currently receives notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Active,
    Disabled,
}

/// A caregiver/contact record
///
/// Owned by the [`ContactDirectory`](crate::ContactDirectory); the engine
/// references contacts through step snapshots and never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier
    pub id: ContactId,
    /// Display name
    pub name: String,
    /// Role, e.g. "Primary Caregiver", "Healthcare Provider"
    pub role: String,
    /// Relationship to the monitored person, e.g. "Daughter"
    pub relationship: String,
    /// Priority tier (independent of alert severity)
    pub tier: Tier,
    /// Alert types this contact should receive
    pub alert_types: BTreeSet<AlertType>,
    /// Reachable channels, in preference order
    pub channels: Vec<ChannelEndpoint>,
    /// Active/disabled status
    pub status: ContactStatus,
}

impl Contact {
    /// Create a new active contact with a fresh id
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: ContactId::new(),
            name: name.into(),
            role: String::new(),
            relationship: String::new(),
            tier,
            alert_types: BTreeSet::new(),
            channels: Vec::new(),
            status: ContactStatus::Active,
        }
    }

    /// With role
    #[inline]
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// With relationship
    #[inline]
    #[must_use]
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }

    /// Enable an alert type for this contact
    #[inline]
    #[must_use]
    pub fn with_alert_type(mut self, alert_type: AlertType) -> Self {
        self.alert_types.insert(alert_type);
        self
    }

    /// Enable several alert types at once
    #[inline]
    #[must_use]
    pub fn with_alert_types(mut self, types: impl IntoIterator<Item = AlertType>) -> Self {
        self.alert_types.extend(types);
        self
    }

    /// Add a reachable channel endpoint
    #[inline]
    #[must_use]
    pub fn with_channel(mut self, endpoint: ChannelEndpoint) -> Self {
        self.channels.push(endpoint);
        self
    }

    /// Mark disabled
    #[inline]
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.status = ContactStatus::Disabled;
        self
    }

    /// Whether the contact is active and enabled for the given alert type
    #[inline]
    #[must_use]
    pub fn receives(&self, alert_type: AlertType) -> bool {
        self.status == ContactStatus::Active && self.alert_types.contains(&alert_type)
    }

    /// Endpoint for a channel kind, if the contact has one
    #[inline]
    #[must_use]
    pub fn endpoint(&self, kind: famsafe_alert::ChannelKind) -> Option<&ChannelEndpoint> {
        self.channels.iter().find(|ep| ep.kind == kind)
    }
}

/// Partial update applied through [`ContactDirectory::update`]
///
/// [`ContactDirectory::update`]: crate::ContactDirectory::update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    /// New display name
    pub name: Option<String>,
    /// New role
    pub role: Option<String>,
    /// New relationship
    pub relationship: Option<String>,
    /// New priority tier
    pub tier: Option<Tier>,
    /// Replacement set of enabled alert types
    pub alert_types: Option<BTreeSet<AlertType>>,
    /// Replacement channel list
    pub channels: Option<Vec<ChannelEndpoint>>,
    /// New status
    pub status: Option<ContactStatus>,
}

impl ContactPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch the tier
    #[inline]
    #[must_use]
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Patch the status
    #[inline]
    #[must_use]
    pub fn status(mut self, status: ContactStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Patch the display name
    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Apply this patch to a contact
    pub(crate) fn apply(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(role) = self.role {
            contact.role = role;
        }
        if let Some(relationship) = self.relationship {
            contact.relationship = relationship;
        }
        if let Some(tier) = self.tier {
            contact.tier = tier;
        }
        if let Some(alert_types) = self.alert_types {
            contact.alert_types = alert_types;
        }
        if let Some(channels) = self.channels {
            contact.channels = channels;
        }
        if let Some(status) = self.status {
            contact.status = status;
        }
    }
}
