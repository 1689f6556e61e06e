use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The fields of the site's contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Sender's name.
    pub name: String,

    /// Sender's reply address.
    pub email: String,

    /// Free-form message body.
    pub message: String,
}

impl ContactSubmission {
    /// Create a submission, trimming surrounding whitespace from every field.
    pub fn new(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
        message: impl AsRef<str>,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            email: email.as_ref().trim().to_string(),
            message: message.as_ref().trim().to_string(),
        }
    }

    /// Check that every field is filled in and the email looks like one.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(
                    "field is required",
                    Some(field.to_string()),
                ));
            }
        }
        if !looks_like_email(&self.email) {
            return Err(Error::validation(
                "not a valid email address",
                Some("email".to_string()),
            ));
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_fields() {
        let submission = ContactSubmission::new("  Ada ", "ada@example.org\n", " hi ");
        assert_eq!(submission.name, "Ada");
        assert_eq!(submission.email, "ada@example.org");
        assert_eq!(submission.message, "hi");
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn missing_field_is_named() {
        let submission = ContactSubmission::new("Ada", "ada@example.org", "   ");
        match submission.validate() {
            Err(Error::Validation { param, .. }) => assert_eq!(param.as_deref(), Some("message")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_emails() {
        for email in ["ada", "@example.org", "ada@", "a@b@c", "ada@.org", "a da@x.org"] {
            let submission = ContactSubmission::new("Ada", email, "hello");
            assert!(submission.validate().is_err(), "{email} should be rejected");
        }
    }
}
