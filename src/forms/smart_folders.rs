use serde::Deserialize;

use crate::domain::smart_folder::FolderRules;
use crate::domain::types::FolderName;
use crate::forms::FormError;

/// Folder definition; `rules` is the JSON rule object itself.
#[derive(Debug, Deserialize)]
pub struct SmartFolderForm {
    pub name: String,
    pub rules: serde_json::Value,
}

pub struct SmartFolderPayload {
    pub name: FolderName,
    pub rules: FolderRules,
}

impl TryFrom<SmartFolderForm> for SmartFolderPayload {
    type Error = FormError;

    fn try_from(form: SmartFolderForm) -> Result<Self, Self::Error> {
        let name = FolderName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let rules: FolderRules = serde_json::from_value(form.rules)
            .map_err(|err| FormError::field("rules", err))?;
        rules
            .validate()
            .map_err(|err| FormError::field("rules", err))?;
        Ok(Self { name, rules })
    }
}
