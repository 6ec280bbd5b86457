//! Organization settings and logo upload forms.

use std::path::PathBuf;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::organization::{NewOrganization, UpdateOrganization};
use crate::domain::types::{HexColor, OrganizationName};
use crate::forms::{FormError, non_blank};

pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Shared by the create and update endpoints, HTML and JSON alike.
#[derive(Debug, Deserialize, Validate)]
pub struct OrganizationForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub primary_color: Option<String>,
}

pub struct OrganizationPayload {
    pub name: OrganizationName,
    pub primary_color: Option<HexColor>,
}

impl TryFrom<OrganizationForm> for OrganizationPayload {
    type Error = FormError;

    fn try_from(form: OrganizationForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let name = OrganizationName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let primary_color = non_blank(form.primary_color)
            .map(HexColor::new)
            .transpose()
            .map_err(|_| FormError::InvalidColor)?;
        Ok(Self {
            name,
            primary_color,
        })
    }
}

impl OrganizationPayload {
    pub fn into_new(self) -> NewOrganization {
        NewOrganization::new(self.name, self.primary_color)
    }

    pub fn into_update(self) -> UpdateOrganization {
        UpdateOrganization {
            name: self.name,
            primary_color: self.primary_color,
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadLogoForm {
    #[multipart(limit = "2MiB")]
    pub logo: TempFile,
}

/// Accepted logo image and the extension it is stored under.
#[derive(Debug)]
pub struct LogoPayload {
    pub source: PathBuf,
    pub extension: &'static str,
}

/// File extension for a supported logo content type.
pub fn logo_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

impl LogoPayload {
    pub fn new(
        source: PathBuf,
        content_type: Option<&str>,
        size: usize,
    ) -> Result<Self, FormError> {
        if size == 0 {
            return Err(FormError::Upload("the file is empty".to_string()));
        }
        if size > MAX_LOGO_BYTES {
            return Err(FormError::Upload("the logo must not exceed 2 MiB".to_string()));
        }
        let extension = content_type.and_then(logo_extension).ok_or_else(|| {
            FormError::Upload("only PNG, JPEG and WebP images are accepted".to_string())
        })?;
        Ok(Self { source, extension })
    }
}

impl TryFrom<&UploadLogoForm> for LogoPayload {
    type Error = FormError;

    fn try_from(form: &UploadLogoForm) -> Result<Self, Self::Error> {
        LogoPayload::new(
            form.logo.file.path().to_path_buf(),
            form.logo.content_type.as_ref().map(|mime| mime.essence_str()),
            form.logo.size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_form_normalizes_values() {
        let payload = OrganizationPayload::try_from(OrganizationForm {
            name: " Acme ".to_string(),
            primary_color: Some("#AABBCC".to_string()),
        })
        .unwrap();
        assert_eq!(payload.name.as_str(), "Acme");
        assert_eq!(payload.primary_color.unwrap().as_str(), "#aabbcc");

        let blank_color = OrganizationPayload::try_from(OrganizationForm {
            name: "Acme".to_string(),
            primary_color: Some("  ".to_string()),
        })
        .unwrap();
        assert!(blank_color.primary_color.is_none());
    }

    #[test]
    fn organization_form_rejects_bad_color() {
        let result = OrganizationPayload::try_from(OrganizationForm {
            name: "Acme".to_string(),
            primary_color: Some("red".to_string()),
        });
        assert!(matches!(result, Err(FormError::InvalidColor)));
    }

    #[test]
    fn logo_checks_type_and_size() {
        let path = PathBuf::from("/tmp/logo");
        assert_eq!(
            LogoPayload::new(path.clone(), Some("image/webp"), 10)
                .unwrap()
                .extension,
            "webp"
        );
        assert!(LogoPayload::new(path.clone(), Some("image/gif"), 10).is_err());
        assert!(LogoPayload::new(path.clone(), Some("image/svg+xml"), 10).is_err());
        assert!(LogoPayload::new(path.clone(), None, 10).is_err());
        assert!(LogoPayload::new(path.clone(), Some("image/png"), 0).is_err());
        assert!(LogoPayload::new(path, Some("image/png"), MAX_LOGO_BYTES + 1).is_err());
    }
}
