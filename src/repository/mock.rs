//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::ai::{AiActivity, AiMemory, NewAiActivity, NewAiMemory};
use crate::domain::catalog::{
    NewProduct, NewSupplier, Product, Supplier, UpdateProduct, UpdateSupplier,
};
use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::email::{Email, FollowupDetection, NewEmail, RecordedChanges};
use crate::domain::email_account::{EmailAccount, NewEmailAccount, UpdateEmailAccount};
use crate::domain::followup::{Followup, NewFollowup, UpdateFollowup};
use crate::domain::member::{Member, MemberRole, NewMember};
use crate::domain::organization::{
    NewOrganization, Organization, OrganizationOwner, UpdateOrganization,
};
use crate::domain::preferences::UserPreferences;
use crate::domain::smart_folder::{FolderRules, NewSmartFolder, SmartFolder, UpdateSmartFolder};
use crate::domain::types::{
    ActivityId, ContactId, EmailAccountId, EmailAddress, FolderName, FollowupId, MemberId,
    MemoryId, MessageId, OrganizationId, ProductId, SmartFolderId, SupplierId, UserId, WebUrl,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ActivityListQuery, ActivityReader, ActivityWriter, CatalogReader, CatalogWriter,
    ContactListQuery, ContactReader, ContactWriter, EmailAccountReader, EmailAccountWriter,
    EmailListQuery, EmailReader, EmailWriter, FollowupListQuery, FollowupReader, FollowupWriter,
    MemberReader, MemberWriter, MemoryListQuery, MemoryReader, MemoryWriter, OrganizationReader,
    OrganizationWriter, PreferencesReader, PreferencesWriter, ProductListQuery, SmartFolderReader,
    SmartFolderWriter,
};

mock! {
    pub Repository {}

    impl OrganizationReader for Repository {
        fn get_organization_by_id(&self, id: OrganizationId) -> RepositoryResult<Option<Organization>>;
        fn list_organizations_for_user(
            &self,
            user_id: &UserId,
        ) -> RepositoryResult<Vec<(Organization, Member)>>;
    }

    impl OrganizationWriter for Repository {
        fn create_organization(
            &self,
            organization: &NewOrganization,
            owner: &OrganizationOwner,
            folders: &[(FolderName, FolderRules)],
        ) -> RepositoryResult<Organization>;
        fn update_organization(
            &self,
            id: OrganizationId,
            updates: &UpdateOrganization,
        ) -> RepositoryResult<Organization>;
        fn set_organization_logo(
            &self,
            id: OrganizationId,
            logo_url: &WebUrl,
        ) -> RepositoryResult<Organization>;
        fn delete_organization(&self, id: OrganizationId) -> RepositoryResult<()>;
    }

    impl MemberReader for Repository {
        fn get_member_by_id(
            &self,
            organization_id: OrganizationId,
            id: MemberId,
        ) -> RepositoryResult<Option<Member>>;
        fn get_member_for_user(
            &self,
            organization_id: OrganizationId,
            user_id: &UserId,
        ) -> RepositoryResult<Option<Member>>;
        fn list_members(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Member>>;
        fn count_owners(&self, organization_id: OrganizationId) -> RepositoryResult<usize>;
    }

    impl MemberWriter for Repository {
        fn create_member(&self, member: &NewMember) -> RepositoryResult<Member>;
        fn update_member_role(
            &self,
            organization_id: OrganizationId,
            id: MemberId,
            role: MemberRole,
        ) -> RepositoryResult<Member>;
        fn delete_member(&self, organization_id: OrganizationId, id: MemberId) -> RepositoryResult<()>;
        fn claim_invitations(&self, user_id: &UserId, email: &EmailAddress) -> RepositoryResult<usize>;
    }

    impl PreferencesReader for Repository {
        fn get_preferences(&self, user_id: &UserId) -> RepositoryResult<Option<UserPreferences>>;
    }

    impl PreferencesWriter for Repository {
        fn save_preferences(&self, preferences: &UserPreferences) -> RepositoryResult<UserPreferences>;
    }

    impl ContactReader for Repository {
        fn get_contact_by_id(
            &self,
            organization_id: OrganizationId,
            id: ContactId,
        ) -> RepositoryResult<Option<Contact>>;
        fn get_contact_by_email(
            &self,
            organization_id: OrganizationId,
            email: &EmailAddress,
        ) -> RepositoryResult<Option<Contact>>;
        fn list_contacts(&self, query: ContactListQuery) -> RepositoryResult<(usize, Vec<Contact>)>;
    }

    impl ContactWriter for Repository {
        fn create_contact(&self, contact: &NewContact) -> RepositoryResult<Contact>;
        fn import_contacts(&self, new_contacts: &[NewContact]) -> RepositoryResult<usize>;
        fn update_contact(
            &self,
            organization_id: OrganizationId,
            id: ContactId,
            updates: &UpdateContact,
        ) -> RepositoryResult<Contact>;
        fn delete_contact(&self, organization_id: OrganizationId, id: ContactId) -> RepositoryResult<()>;
    }

    impl EmailAccountReader for Repository {
        fn get_email_account_by_id(
            &self,
            organization_id: OrganizationId,
            id: EmailAccountId,
        ) -> RepositoryResult<Option<EmailAccount>>;
        fn list_email_accounts(
            &self,
            organization_id: OrganizationId,
            user_id: &UserId,
        ) -> RepositoryResult<Vec<EmailAccount>>;
        fn list_auto_sync_accounts(&self) -> RepositoryResult<Vec<EmailAccount>>;
    }

    impl EmailAccountWriter for Repository {
        fn create_email_account(&self, account: &NewEmailAccount) -> RepositoryResult<EmailAccount>;
        fn update_email_account(
            &self,
            organization_id: OrganizationId,
            id: EmailAccountId,
            updates: &UpdateEmailAccount,
        ) -> RepositoryResult<EmailAccount>;
        fn delete_email_account(
            &self,
            organization_id: OrganizationId,
            id: EmailAccountId,
        ) -> RepositoryResult<()>;
        fn mark_email_account_synced(
            &self,
            organization_id: OrganizationId,
            id: EmailAccountId,
            synced_at: NaiveDateTime,
        ) -> RepositoryResult<EmailAccount>;
    }

    impl EmailReader for Repository {
        fn get_email_by_message_id(
            &self,
            email_account_id: EmailAccountId,
            message_id: &MessageId,
        ) -> RepositoryResult<Option<Email>>;
        fn list_emails(&self, query: EmailListQuery) -> RepositoryResult<(usize, Vec<Email>)>;
    }

    impl EmailWriter for Repository {
        fn record_email(
            &self,
            email: &NewEmail,
            detection: &FollowupDetection,
        ) -> RepositoryResult<Option<RecordedChanges>>;
    }

    impl FollowupReader for Repository {
        fn get_followup_by_id(
            &self,
            organization_id: OrganizationId,
            id: FollowupId,
        ) -> RepositoryResult<Option<Followup>>;
        fn list_followups(&self, query: FollowupListQuery) -> RepositoryResult<(usize, Vec<Followup>)>;
        fn list_followups_with_contact_email(
            &self,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Vec<(Followup, Option<EmailAddress>)>>;
        fn list_open_followups_in_thread(
            &self,
            organization_id: OrganizationId,
            thread_id: &str,
        ) -> RepositoryResult<Vec<Followup>>;
        fn list_open_followups_due_before(
            &self,
            cutoff: NaiveDateTime,
        ) -> RepositoryResult<Vec<Followup>>;
    }

    impl FollowupWriter for Repository {
        fn create_followup(&self, followup: &NewFollowup) -> RepositoryResult<Followup>;
        fn update_followup(
            &self,
            organization_id: OrganizationId,
            id: FollowupId,
            updates: &UpdateFollowup,
        ) -> RepositoryResult<Followup>;
        fn save_followup_state(&self, followup: &Followup) -> RepositoryResult<Followup>;
        fn delete_followup(&self, organization_id: OrganizationId, id: FollowupId) -> RepositoryResult<()>;
    }

    impl SmartFolderReader for Repository {
        fn get_smart_folder_by_id(
            &self,
            organization_id: OrganizationId,
            id: SmartFolderId,
        ) -> RepositoryResult<Option<SmartFolder>>;
        fn list_smart_folders(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<SmartFolder>>;
    }

    impl SmartFolderWriter for Repository {
        fn create_smart_folder(&self, folder: &NewSmartFolder) -> RepositoryResult<SmartFolder>;
        fn update_smart_folder(
            &self,
            organization_id: OrganizationId,
            id: SmartFolderId,
            updates: &UpdateSmartFolder,
        ) -> RepositoryResult<SmartFolder>;
        fn delete_smart_folder(
            &self,
            organization_id: OrganizationId,
            id: SmartFolderId,
        ) -> RepositoryResult<()>;
    }

    impl CatalogReader for Repository {
        fn get_supplier_by_id(
            &self,
            organization_id: OrganizationId,
            id: SupplierId,
        ) -> RepositoryResult<Option<Supplier>>;
        fn list_suppliers(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Supplier>>;
        fn get_product_by_id(
            &self,
            organization_id: OrganizationId,
            id: ProductId,
        ) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    }

    impl CatalogWriter for Repository {
        fn create_supplier(&self, supplier: &NewSupplier) -> RepositoryResult<Supplier>;
        fn update_supplier(
            &self,
            organization_id: OrganizationId,
            id: SupplierId,
            updates: &UpdateSupplier,
        ) -> RepositoryResult<Supplier>;
        fn delete_supplier(&self, organization_id: OrganizationId, id: SupplierId) -> RepositoryResult<()>;
        fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product(
            &self,
            organization_id: OrganizationId,
            id: ProductId,
            updates: &UpdateProduct,
        ) -> RepositoryResult<Product>;
        fn delete_product(&self, organization_id: OrganizationId, id: ProductId) -> RepositoryResult<()>;
    }

    impl ActivityReader for Repository {
        fn get_activity_by_id(
            &self,
            organization_id: OrganizationId,
            id: ActivityId,
        ) -> RepositoryResult<Option<AiActivity>>;
        fn list_activities(&self, query: ActivityListQuery) -> RepositoryResult<(usize, Vec<AiActivity>)>;
    }

    impl ActivityWriter for Repository {
        fn create_activity(&self, activity: &NewAiActivity) -> RepositoryResult<AiActivity>;
    }

    impl MemoryReader for Repository {
        fn get_memory_by_id(
            &self,
            organization_id: OrganizationId,
            id: MemoryId,
        ) -> RepositoryResult<Option<AiMemory>>;
        fn list_memories(&self, query: MemoryListQuery) -> RepositoryResult<(usize, Vec<AiMemory>)>;
    }

    impl MemoryWriter for Repository {
        fn create_memory(&self, memory: &NewAiMemory) -> RepositoryResult<AiMemory>;
        fn delete_memory(&self, organization_id: OrganizationId, id: MemoryId) -> RepositoryResult<()>;
    }
}
