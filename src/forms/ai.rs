use serde::Deserialize;

use crate::domain::ai::NewAiMemory;
use crate::domain::types::{OrganizationId, SanitizedText, UserId};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize)]
pub struct MemoryForm {
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl MemoryForm {
    pub fn into_domain(
        self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<NewAiMemory, FormError> {
        Ok(NewAiMemory {
            organization_id,
            user_id,
            content: SanitizedText::new(self.content)
                .map_err(|err| FormError::field("content", err))?,
            source: non_blank(self.source),
        })
    }
}
