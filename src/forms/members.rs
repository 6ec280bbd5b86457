use serde::Deserialize;

use crate::domain::member::MemberRole;
use crate::domain::types::{EmailAddress, PersonName};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize)]
pub struct AddMemberForm {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
}

pub struct AddMemberPayload {
    pub email: EmailAddress,
    pub name: Option<PersonName>,
    pub role: MemberRole,
}

impl TryFrom<AddMemberForm> for AddMemberPayload {
    type Error = FormError;

    fn try_from(form: AddMemberForm) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?;
        let name = non_blank(form.name)
            .map(PersonName::new)
            .transpose()
            .map_err(|_| FormError::InvalidName)?;
        let role = form
            .role
            .parse::<MemberRole>()
            .map_err(|err| FormError::field("role", err))?;
        Ok(Self { email, name, role })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleForm {
    pub role: String,
}

impl TryFrom<ChangeRoleForm> for MemberRole {
    type Error = FormError;

    fn try_from(form: ChangeRoleForm) -> Result<Self, Self::Error> {
        form.role
            .parse::<MemberRole>()
            .map_err(|err| FormError::field("role", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_member_form_parses_role_and_email() {
        let payload = AddMemberPayload::try_from(AddMemberForm {
            email: " New@Example.com ".to_string(),
            name: Some("".to_string()),
            role: "Admin".to_string(),
        })
        .unwrap();

        assert_eq!(payload.email.as_str(), "new@example.com");
        assert!(payload.name.is_none());
        assert_eq!(payload.role, MemberRole::Admin);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = MemberRole::try_from(ChangeRoleForm {
            role: "root".to_string(),
        });
        assert!(matches!(result, Err(FormError::InvalidField { field: "role", .. })));
    }
}
