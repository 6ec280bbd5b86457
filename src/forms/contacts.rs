//! Contact forms and the CSV import parser.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use crate::domain::contact::{NewContact, UpdateContact};
use crate::domain::types::{ContactName, EmailAddress, OrganizationId, PhoneNumber};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct ContactPayload {
    pub name: ContactName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<ContactForm> for ContactPayload {
    type Error = FormError;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        let name = ContactName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let email = non_blank(form.email)
            .map(EmailAddress::new)
            .transpose()
            .map_err(|_| FormError::InvalidEmail)?;
        let phone = non_blank(form.phone)
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|_| FormError::InvalidPhoneNumber)?;
        Ok(Self {
            name,
            email,
            phone,
            company: form.company,
            notes: form.notes.map(|notes| ammonia::clean(&notes)),
        })
    }
}

impl ContactPayload {
    pub fn into_new(self, organization_id: OrganizationId) -> NewContact {
        NewContact::new(
            organization_id,
            self.name,
            self.email,
            self.phone,
            self.company,
            self.notes,
        )
    }

    pub fn into_update(self) -> UpdateContact {
        UpdateContact::new(self.name, self.email, self.phone, self.company, self.notes)
    }
}

#[derive(MultipartForm)]
pub struct UploadContactsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadContactsForm {
    pub fn parse(&self, organization_id: OrganizationId) -> Result<Vec<NewContact>, FormError> {
        let file = self
            .csv
            .file
            .reopen()
            .map_err(|err| FormError::Upload(err.to_string()))?;
        parse_contacts_csv(file, organization_id)
    }
}

/// Column positions of the recognised headers.
struct Columns {
    name: usize,
    email: Option<usize>,
    phone: Option<usize>,
    company: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, FormError> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(wanted))
        };
        let name = find("name").ok_or(FormError::Csv {
            row: 1,
            message: "missing `name` column".to_string(),
        })?;
        Ok(Self {
            name,
            email: find("email"),
            phone: find("phone"),
            company: find("company"),
            notes: find("notes"),
        })
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    non_blank(index.and_then(|i| record.get(i)).map(str::to_string))
}

/// Parses `name,email,phone,company,notes` rows; unknown columns are ignored.
///
/// The first invalid row aborts the import with its line number.
pub fn parse_contacts_csv<R: Read>(
    reader: R,
    organization_id: OrganizationId,
) -> Result<Vec<NewContact>, FormError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|err| FormError::Csv {
            row: 1,
            message: err.to_string(),
        })?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut contacts = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| FormError::Csv {
            row: err.position().map_or(0, |p| p.line() as usize),
            message: err.to_string(),
        })?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row = record.position().map_or(0, |p| p.line() as usize);

        let form = ContactForm {
            name: record.get(columns.name).unwrap_or_default().to_string(),
            email: cell(&record, columns.email),
            phone: cell(&record, columns.phone),
            company: cell(&record, columns.company),
            notes: cell(&record, columns.notes),
        };
        let payload = ContactPayload::try_from(form).map_err(|err| FormError::Csv {
            row,
            message: err.to_string(),
        })?;
        contacts.push(payload.into_new(organization_id));
    }

    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> OrganizationId {
        OrganizationId::new(1).unwrap()
    }

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let data = "Name,Email,Phone,Company,Notes,Source\n\
                    Alice,ALICE@example.com,+14155552671,Acme,VIP,fair\n\
                    \n\
                    Bob,,,,,\n";

        let contacts = parse_contacts_csv(data.as_bytes(), org()).unwrap();

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].email.as_ref().unwrap().as_str(), "alice@example.com");
        assert_eq!(contacts[0].phone.as_ref().unwrap().as_str(), "+14155552671");
        assert_eq!(contacts[0].company.as_deref(), Some("Acme"));
        assert_eq!(contacts[1].name.as_str(), "Bob");
        assert!(contacts[1].email.is_none());
    }

    #[test]
    fn reports_the_offending_row() {
        let data = "name,email\nAlice,alice@example.com\nBob,not-an-email\n";

        let err = parse_contacts_csv(data.as_bytes(), org()).unwrap_err();

        assert!(matches!(err, FormError::Csv { row: 3, .. }));
    }

    #[test]
    fn requires_a_name_column() {
        let err = parse_contacts_csv("email\nx@example.com\n".as_bytes(), org()).unwrap_err();
        assert!(matches!(err, FormError::Csv { row: 1, .. }));
    }

    #[test]
    fn contact_form_sanitizes_notes() {
        let payload = ContactPayload::try_from(ContactForm {
            name: "Alice".to_string(),
            email: Some(" ".to_string()),
            phone: None,
            company: None,
            notes: Some("<b>hot</b><script>x</script>".to_string()),
        })
        .unwrap();
        assert!(payload.email.is_none());
        assert_eq!(payload.notes.as_deref(), Some("<b>hot</b>"));
    }
}
