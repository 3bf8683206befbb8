//! The contact directory
//!
//! Insertion order is preserved so that tier ties break toward the
//! earlier-registered contact, which is the reporting order callers see.

use crate::contact::{Contact, ContactPatch, ContactStatus};
use crate::error::DirectoryError;
use famsafe_alert::{AlertType, ContactId, Tier};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Caregiver/contact directory
///
/// Read-mostly: escalation runs take snapshots through [`list_for`] /
/// [`list_tier`] at the start of each step; administrative mutation never
/// blocks an in-flight run.
///
/// [`list_for`]: ContactDirectory::list_for
/// [`list_tier`]: ContactDirectory::list_tier
#[derive(Debug, Default)]
pub struct ContactDirectory {
    contacts: RwLock<IndexMap<ContactId, Contact>>,
}

impl ContactDirectory {
    /// Create empty directory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contact, returning its id
    pub fn add(&self, contact: Contact) -> ContactId {
        let id = contact.id;
        self.contacts.write().insert(id, contact);
        tracing::debug!(contact_id = %id, "contact added");
        id
    }

    /// Apply a partial update to an existing contact
    ///
    /// # Errors
    /// `DirectoryError::NotFound` if the id is unknown
    pub fn update(&self, id: ContactId, patch: ContactPatch) -> Result<(), DirectoryError> {
        let mut contacts = self.contacts.write();
        let contact = contacts.get_mut(&id).ok_or(DirectoryError::NotFound(id))?;
        patch.apply(contact);
        tracing::debug!(contact_id = %id, "contact updated");
        Ok(())
    }

    /// Remove a contact
    ///
    /// Already-issued notifications are not retroactively cancelled; the
    /// contact simply stops appearing in future step snapshots.
    ///
    /// # Errors
    /// `DirectoryError::NotFound` if the id is unknown
    pub fn remove(&self, id: ContactId) -> Result<Contact, DirectoryError> {
        let removed = self
            .contacts
            .write()
            .shift_remove(&id)
            .ok_or(DirectoryError::NotFound(id))?;
        tracing::debug!(contact_id = %id, "contact removed");
        Ok(removed)
    }

    /// Look up a contact by id
    #[must_use]
    pub fn get(&self, id: ContactId) -> Option<Contact> {
        self.contacts.read().get(&id).cloned()
    }

    /// Active contacts enabled for `alert_type` at or above `min_tier`,
    /// ordered by descending tier then insertion order.
    #[must_use]
    pub fn list_for(&self, alert_type: AlertType, min_tier: Tier) -> Vec<Contact> {
        let contacts = self.contacts.read();
        let mut matching: Vec<Contact> = contacts
            .values()
            .filter(|c| c.receives(alert_type) && c.tier.meets(min_tier))
            .cloned()
            .collect();
        // Stable sort keeps insertion order within a tier.
        matching.sort_by_key(|c| std::cmp::Reverse(c.tier.rank()));
        matching
    }

    /// Active contacts at or above `min_tier` regardless of enabled alert
    /// types, ordered like [`list_for`](Self::list_for).
    ///
    /// Used for the catch-all dispatch when escalation is exhausted.
    #[must_use]
    pub fn list_tier(&self, min_tier: Tier) -> Vec<Contact> {
        let contacts = self.contacts.read();
        let mut matching: Vec<Contact> = contacts
            .values()
            .filter(|c| c.status == ContactStatus::Active && c.tier.meets(min_tier))
            .cloned()
            .collect();
        matching.sort_by_key(|c| std::cmp::Reverse(c.tier.rank()));
        matching
    }

    /// All contacts in insertion order (dashboard listing)
    #[must_use]
    pub fn all(&self) -> Vec<Contact> {
        self.contacts.read().values().cloned().collect()
    }

    /// Number of contacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.read().len()
    }

    /// Whether the directory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famsafe_alert::ChannelEndpoint;
    use pretty_assertions::assert_eq;

    fn fixture() -> (ContactDirectory, ContactId, ContactId, ContactId) {
        let dir = ContactDirectory::new();
        let primary = dir.add(
            Contact::new("Sarah Johnson", Tier::High)
                .with_role("Primary Caregiver")
                .with_alert_types([AlertType::Fall, AlertType::Wellness])
                .with_channel(ChannelEndpoint::sms("+1 (555) 123-4567")),
        );
        let doctor = dir.add(
            Contact::new("Dr. Michael Chen", Tier::High)
                .with_role("Healthcare Provider")
                .with_alert_types([AlertType::Fall, AlertType::Health]),
        );
        let emergency = dir.add(
            Contact::new("Emergency Services", Tier::Critical)
                .with_role("Emergency Services")
                .with_alert_type(AlertType::Fall)
                .with_channel(ChannelEndpoint::voice("911")),
        );
        (dir, primary, doctor, emergency)
    }

    #[test]
    fn list_for_orders_by_tier_then_insertion() {
        let (dir, primary, doctor, emergency) = fixture();

        let ids: Vec<ContactId> = dir
            .list_for(AlertType::Fall, Tier::Low)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![emergency, primary, doctor]);
    }

    #[test]
    fn list_for_filters_alert_type_and_tier() {
        let (dir, primary, _, _) = fixture();

        let wellness = dir.list_for(AlertType::Wellness, Tier::Low);
        assert_eq!(wellness.len(), 1);
        assert_eq!(wellness[0].id, primary);

        let critical_only = dir.list_for(AlertType::Fall, Tier::Critical);
        assert_eq!(critical_only.len(), 1);
        assert_eq!(critical_only[0].name, "Emergency Services");
    }

    #[test]
    fn list_for_skips_disabled_contacts() {
        let (dir, primary, _, _) = fixture();
        dir.update(primary, ContactPatch::new().status(ContactStatus::Disabled))
            .unwrap();

        let names: Vec<String> = dir
            .list_for(AlertType::Fall, Tier::Low)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert!(!names.contains(&"Sarah Johnson".to_string()));
    }

    #[test]
    fn list_tier_ignores_alert_types() {
        let (dir, _, _, emergency) = fixture();
        // Emergency Services is only enabled for falls, but list_tier still
        // returns it for the exhaustion catch-all.
        let contacts = dir.list_tier(Tier::Critical);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, emergency);
    }

    #[test]
    fn update_unknown_contact_fails() {
        let dir = ContactDirectory::new();
        let err = dir.update(ContactId::new(), ContactPatch::new()).unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[test]
    fn remove_returns_contact() {
        let (dir, primary, _, _) = fixture();
        let removed = dir.remove(primary).unwrap();
        assert_eq!(removed.name, "Sarah Johnson");
        assert!(dir.get(primary).is_none());
        assert!(matches!(
            dir.remove(primary),
            Err(DirectoryError::NotFound(_))
        ));
    }
}
