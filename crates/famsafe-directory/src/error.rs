//! Error types for the contact directory

use famsafe_alert::ContactId;

/// Contact directory errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Update/remove targeted an unknown contact
    #[error("contact not found: {0}")]
    NotFound(ContactId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let id = ContactId::new();
        let err = DirectoryError::NotFound(id);
        assert!(err.to_string().contains("contact not found"));
        assert!(err.to_string().contains(&id.to_string()));
    }
}
