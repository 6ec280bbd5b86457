//! Repository traits and their Diesel-backed implementation.
//!
//! Every tenant-owned record is read and written with an explicit
//! [`OrganizationId`], so one organization can never observe another's data.

use chrono::{Duration, NaiveDateTime};

use crate::db::{DbConnection, DbPool};
use crate::domain::ai::{ActivityKind, AiActivity, AiMemory, NewAiActivity, NewAiMemory};
use crate::domain::catalog::{
    NewProduct, NewSupplier, Product, Supplier, UpdateProduct, UpdateSupplier,
};
use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::email::{Email, FollowupDetection, NewEmail, RecordedChanges};
use crate::domain::email_account::{EmailAccount, NewEmailAccount, UpdateEmailAccount};
use crate::domain::followup::{Followup, FollowupStatus, NewFollowup, UpdateFollowup};
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

pub mod ai;
pub mod catalog;
pub mod contact;
pub mod email;
pub mod email_account;
pub mod errors;
pub mod followup;
pub mod member;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod organization;
pub mod preferences;
pub mod smart_folder;

/// Diesel-backed repository sharing one connection pool across all traits.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub(crate) fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page) as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactListQuery {
    pub organization_id: OrganizationId,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ContactListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailListQuery {
    pub organization_id: OrganizationId,
    pub email_account_id: Option<EmailAccountId>,
    pub contact_id: Option<ContactId>,
    pub pagination: Option<Pagination>,
}

impl EmailListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            email_account_id: None,
            contact_id: None,
            pagination: None,
        }
    }

    pub fn account(mut self, email_account_id: EmailAccountId) -> Self {
        self.email_account_id = Some(email_account_id);
        self
    }

    pub fn contact(mut self, contact_id: ContactId) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Derived status filter; resolving it needs the clock and the due window.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusFilter {
    pub status: FollowupStatus,
    pub now: NaiveDateTime,
    pub due_window: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowupListQuery {
    pub organization_id: OrganizationId,
    pub owner_user_id: Option<UserId>,
    pub contact_id: Option<ContactId>,
    pub status: Option<StatusFilter>,
    pub pagination: Option<Pagination>,
}

impl FollowupListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            owner_user_id: None,
            contact_id: None,
            status: None,
            pagination: None,
        }
    }

    pub fn owner(mut self, user_id: UserId) -> Self {
        self.owner_user_id = Some(user_id);
        self
    }

    pub fn contact(mut self, contact_id: ContactId) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn status(
        mut self,
        status: FollowupStatus,
        now: NaiveDateTime,
        due_window: Duration,
    ) -> Self {
        self.status = Some(StatusFilter {
            status,
            now,
            due_window,
        });
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductListQuery {
    pub organization_id: OrganizationId,
    pub supplier_id: Option<SupplierId>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            supplier_id: None,
            search: None,
            pagination: None,
        }
    }

    pub fn supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityListQuery {
    pub organization_id: OrganizationId,
    pub kind: Option<ActivityKind>,
    pub pagination: Option<Pagination>,
}

impl ActivityListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            kind: None,
            pagination: None,
        }
    }

    pub fn kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryListQuery {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl MemoryListQuery {
    pub fn new(organization_id: OrganizationId, user_id: UserId) -> Self {
        Self {
            organization_id,
            user_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait OrganizationReader {
    fn get_organization_by_id(&self, id: OrganizationId)
    -> RepositoryResult<Option<Organization>>;
    /// Organizations the user has claimed a membership in, oldest membership first.
    fn list_organizations_for_user(
        &self,
        user_id: &UserId,
    ) -> RepositoryResult<Vec<(Organization, Member)>>;
}

pub trait OrganizationWriter {
    /// Creates the organization, its first owner and the given folders atomically.
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

pub trait MemberReader {
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

pub trait MemberWriter {
    fn create_member(&self, member: &NewMember) -> RepositoryResult<Member>;
    fn update_member_role(
        &self,
        organization_id: OrganizationId,
        id: MemberId,
        role: MemberRole,
    ) -> RepositoryResult<Member>;
    fn delete_member(&self, organization_id: OrganizationId, id: MemberId)
    -> RepositoryResult<()>;
    /// Attaches pending invitations sent to `email` to the signed-in user.
    fn claim_invitations(&self, user_id: &UserId, email: &EmailAddress)
    -> RepositoryResult<usize>;
}

pub trait PreferencesReader {
    fn get_preferences(&self, user_id: &UserId) -> RepositoryResult<Option<UserPreferences>>;
}

pub trait PreferencesWriter {
    fn save_preferences(&self, preferences: &UserPreferences)
    -> RepositoryResult<UserPreferences>;
}

pub trait ContactReader {
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

pub trait ContactWriter {
    fn create_contact(&self, contact: &NewContact) -> RepositoryResult<Contact>;
    /// Inserts all contacts or none of them.
    fn import_contacts(&self, new_contacts: &[NewContact]) -> RepositoryResult<usize>;
    fn update_contact(
        &self,
        organization_id: OrganizationId,
        id: ContactId,
        updates: &UpdateContact,
    ) -> RepositoryResult<Contact>;
    fn delete_contact(&self, organization_id: OrganizationId, id: ContactId)
    -> RepositoryResult<()>;
}

pub trait EmailAccountReader {
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
    /// Active accounts with auto-sync enabled, across all organizations.
    fn list_auto_sync_accounts(&self) -> RepositoryResult<Vec<EmailAccount>>;
}

pub trait EmailAccountWriter {
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

pub trait EmailReader {
    fn get_email_by_message_id(
        &self,
        email_account_id: EmailAccountId,
        message_id: &MessageId,
    ) -> RepositoryResult<Option<Email>>;
    fn list_emails(&self, query: EmailListQuery) -> RepositoryResult<(usize, Vec<Email>)>;
}

pub trait EmailWriter {
    /// Stores `email` and applies `detection` in one transaction. Returns
    /// `None` when the account already recorded this message id.
    fn record_email(
        &self,
        email: &NewEmail,
        detection: &FollowupDetection,
    ) -> RepositoryResult<Option<RecordedChanges>>;
}

pub trait FollowupReader {
    fn get_followup_by_id(
        &self,
        organization_id: OrganizationId,
        id: FollowupId,
    ) -> RepositoryResult<Option<Followup>>;
    fn list_followups(&self, query: FollowupListQuery)
    -> RepositoryResult<(usize, Vec<Followup>)>;
    /// Every follow-up of the organization with its contact's email, ordered by due date.
    fn list_followups_with_contact_email(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<(Followup, Option<EmailAddress>)>>;
    fn list_open_followups_in_thread(
        &self,
        organization_id: OrganizationId,
        thread_id: &str,
    ) -> RepositoryResult<Vec<Followup>>;
    /// Open follow-ups due at or before `cutoff`, across all organizations.
    fn list_open_followups_due_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> RepositoryResult<Vec<Followup>>;
}

pub trait FollowupWriter {
    fn create_followup(&self, followup: &NewFollowup) -> RepositoryResult<Followup>;
    fn update_followup(
        &self,
        organization_id: OrganizationId,
        id: FollowupId,
        updates: &UpdateFollowup,
    ) -> RepositoryResult<Followup>;
    /// Persists lifecycle fields (state, due date, draft, reminder) of `followup`.
    fn save_followup_state(&self, followup: &Followup) -> RepositoryResult<Followup>;
    fn delete_followup(&self, organization_id: OrganizationId, id: FollowupId)
    -> RepositoryResult<()>;
}

pub trait SmartFolderReader {
    fn get_smart_folder_by_id(
        &self,
        organization_id: OrganizationId,
        id: SmartFolderId,
    ) -> RepositoryResult<Option<SmartFolder>>;
    fn list_smart_folders(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<SmartFolder>>;
}

pub trait SmartFolderWriter {
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

pub trait CatalogReader {
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

pub trait CatalogWriter {
    fn create_supplier(&self, supplier: &NewSupplier) -> RepositoryResult<Supplier>;
    fn update_supplier(
        &self,
        organization_id: OrganizationId,
        id: SupplierId,
        updates: &UpdateSupplier,
    ) -> RepositoryResult<Supplier>;
    fn delete_supplier(&self, organization_id: OrganizationId, id: SupplierId)
    -> RepositoryResult<()>;
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(
        &self,
        organization_id: OrganizationId,
        id: ProductId,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product>;
    fn delete_product(&self, organization_id: OrganizationId, id: ProductId)
    -> RepositoryResult<()>;
}

pub trait ActivityReader {
    fn get_activity_by_id(
        &self,
        organization_id: OrganizationId,
        id: ActivityId,
    ) -> RepositoryResult<Option<AiActivity>>;
    fn list_activities(
        &self,
        query: ActivityListQuery,
    ) -> RepositoryResult<(usize, Vec<AiActivity>)>;
}

pub trait ActivityWriter {
    fn create_activity(&self, activity: &NewAiActivity) -> RepositoryResult<AiActivity>;
}

pub trait MemoryReader {
    fn get_memory_by_id(
        &self,
        organization_id: OrganizationId,
        id: MemoryId,
    ) -> RepositoryResult<Option<AiMemory>>;
    fn list_memories(&self, query: MemoryListQuery) -> RepositoryResult<(usize, Vec<AiMemory>)>;
}

pub trait MemoryWriter {
    fn create_memory(&self, memory: &NewAiMemory) -> RepositoryResult<AiMemory>;
    fn delete_memory(&self, organization_id: OrganizationId, id: MemoryId)
    -> RepositoryResult<()>;
}
