use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ContactId, ContactName, EmailAddress, OrganizationId, PhoneNumber};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub organization_id: OrganizationId,
    pub name: ContactName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Trims optional free text and drops it when nothing is left.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewContact {
    pub organization_id: OrganizationId,
    pub name: ContactName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl NewContact {
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: ContactName,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        company: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            organization_id,
            name,
            email,
            phone,
            company: normalize_optional(company),
            notes: normalize_optional(notes),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateContact {
    pub name: ContactName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl UpdateContact {
    #[must_use]
    pub fn new(
        name: ContactName,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        company: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            name,
            email,
            phone,
            company: normalize_optional(company),
            notes: normalize_optional(notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contact_drops_blank_optional_text() {
        let contact = NewContact::new(
            OrganizationId::new(1).unwrap(),
            ContactName::new("Alice").unwrap(),
            None,
            None,
            Some("   ".to_string()),
            Some(" VIP ".to_string()),
        );

        assert_eq!(contact.company, None);
        assert_eq!(contact.notes.as_deref(), Some("VIP"));
    }
}
