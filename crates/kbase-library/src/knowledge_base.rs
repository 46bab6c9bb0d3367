//! Request-layer entry point.
//!
//! [`KnowledgeBase`] ties configuration, the access service, and the
//! per-feature helpers together. Each method matches one request handler:
//! it takes the caller's [`Viewer`] and the rows the handler already
//! fetched, runs the checks in the handler's order, and returns what to
//! write back or sign. Storage and signing stay with the caller.

use kbase_config::KbaseConfig;
use kbase_rbac::{
    Capability, CapabilitySet, DocumentAccessService, Role, Viewer, require_capability,
};
use kbase_types::{
    Document, DocumentId, DocumentVersion, EmailTemplate, Note, NoteId, Profile, TemplateId,
    Timestamp, Tool, ToolId, UserId,
};
use tracing::{debug, info};

use crate::accounts::{Analytics, PasswordChange, PasswordReset};
use crate::download::{DownloadPlan, normalize_storage_key, plan_download};
use crate::error::{ApiError, Result};
use crate::resources::{NoteInput, TemplateInput, ToolInput};
use crate::search::{SearchHit, merge_matches, normalize_query, recency_listing, search_documents};
use crate::upload::{DocumentEdit, NewDocument, UploadPlan, UploadRequest, plan_upload};
use crate::versions::{CurrentVersion, VersionEntry, version_history};

fn found<'a, T>(row: Option<&'a T>, what: &str) -> Result<&'a T> {
    row.ok_or_else(|| ApiError::not_found(what))
}

fn found_mut<'a, T>(row: Option<&'a mut T>, what: &str) -> Result<&'a mut T> {
    row.ok_or_else(|| ApiError::not_found(what))
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    config: KbaseConfig,
    access: DocumentAccessService,
}

impl KnowledgeBase {
    /// Audit logging follows `access.audit`.
    pub fn new(config: KbaseConfig) -> Self {
        let access = DocumentAccessService::new().with_audit(config.access.audit);
        Self { config, access }
    }

    pub fn config(&self) -> &KbaseConfig {
        &self.config
    }

    pub fn access(&self) -> &DocumentAccessService {
        &self.access
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Builds the viewer for an authenticated profile.
    pub fn viewer(&self, profile: Option<&Profile>) -> Result<Viewer> {
        let profile = profile.ok_or_else(ApiError::unauthenticated)?;
        Ok(Viewer::from_profile(profile, self.config.access.default_role))
    }

    /// Capability flags for the UI. Anonymous callers get none.
    pub fn capabilities(&self, profile: Option<&Profile>) -> CapabilitySet {
        self.viewer(profile)
            .map_or(CapabilitySet::NONE, |viewer| viewer.capabilities())
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub fn plan_upload(
        &self,
        viewer: &Viewer,
        request: &UploadRequest,
        now: Timestamp,
    ) -> Result<UploadPlan> {
        self.access.authorize_upload(viewer)?;
        let plan = plan_upload(
            request,
            &viewer.id,
            &self.config.uploads,
            &self.config.storage,
            now,
        )?;
        debug!(viewer = %viewer.id, key = %plan.key, "Upload planned");
        Ok(plan)
    }

    /// Records a document whose content is already stored.
    pub fn create_document(
        &self,
        viewer: &Viewer,
        new: NewDocument,
        id: impl Into<DocumentId>,
        now: Timestamp,
    ) -> Result<Document> {
        self.access.authorize_upload(viewer)?;
        new.validate()?;
        let document = new.into_document(id, viewer.id.clone(), now);
        info!(document = %document.id, viewer = %viewer.id, "Document created");
        Ok(document)
    }

    pub fn edit_document(
        &self,
        viewer: &Viewer,
        document: Option<&mut Document>,
        edit: DocumentEdit,
    ) -> Result<()> {
        let document = found_mut(document, "Document")?;
        self.access.authorize_edit(document, viewer)?;
        edit.validate()?;
        edit.apply(document);
        Ok(())
    }

    /// Authorizes a delete and returns the object key to remove alongside
    /// the row.
    pub fn delete_document(&self, viewer: &Viewer, document: Option<&Document>) -> Result<String> {
        let document = found(document, "Document")?;
        self.access.authorize_delete(document, viewer)?;
        let key = match self.config.storage.bucket.as_deref() {
            Some(bucket) => normalize_storage_key(&document.storage_key, bucket),
            None => document.storage_key.as_str(),
        };
        info!(document = %document.id, viewer = %viewer.id, "Document deleted");
        Ok(key.to_string())
    }

    /// Plans a signed download. Documents the viewer cannot see are refused
    /// before any URL is produced.
    pub fn plan_download(
        &self,
        viewer: &Viewer,
        document: Option<&Document>,
    ) -> Result<DownloadPlan> {
        let document = found(document, "Document")?;
        self.access.authorize_view(document, viewer)?;
        plan_download(document, &self.config.storage)
    }

    /// Filters a listing down to what `viewer` may see.
    pub fn list_documents(&self, viewer: &Viewer, rows: Vec<Document>) -> Vec<Document> {
        self.access.list_visible(rows, viewer)
    }

    pub fn version_history(
        &self,
        viewer: &Viewer,
        document: Option<&Document>,
        current: CurrentVersion,
        archived: Vec<DocumentVersion>,
    ) -> Result<Vec<VersionEntry>> {
        let document = found(document, "Document")?;
        self.access.authorize_view(document, viewer)?;
        Ok(version_history(current, archived))
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Searches candidate rows with the substring fallback.
    ///
    /// A blank query lists the newest documents instead, capped at
    /// `search.listing_limit`.
    pub fn search(&self, viewer: &Viewer, query: &str, rows: &[Document]) -> Vec<SearchHit> {
        let hits = match normalize_query(query) {
            Some(query) => search_documents(rows, query),
            None => recency_listing(rows, self.config.search.listing_limit),
        };
        self.access.list_visible(hits, viewer)
    }

    /// Merges per-field matches fetched by the query layer.
    pub fn merge_search(
        &self,
        viewer: &Viewer,
        title: Vec<Document>,
        content_text: Vec<Document>,
        description: Vec<Document>,
    ) -> Vec<SearchHit> {
        self.access
            .list_visible(merge_matches(title, content_text, description), viewer)
    }

    /// Filters results from the database's ranked search.
    pub fn filter_ranked(&self, viewer: &Viewer, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        self.access.list_visible(hits, viewer)
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    pub fn create_tool(
        &self,
        viewer: &Viewer,
        input: ToolInput,
        id: impl Into<ToolId>,
        now: Timestamp,
    ) -> Result<Tool> {
        self.access.authorize_shared_resource_create(viewer)?;
        input.validate()?;
        Ok(input.into_tool(id, viewer.id.clone(), now))
    }

    pub fn update_tool(
        &self,
        viewer: &Viewer,
        tool: Option<&mut Tool>,
        input: ToolInput,
        now: Timestamp,
    ) -> Result<()> {
        let tool = found_mut(tool, "Tool")?;
        self.access.authorize_tool_mutation(tool, viewer)?;
        input.validate()?;
        input.apply(tool, now);
        Ok(())
    }

    pub fn delete_tool(&self, viewer: &Viewer, tool: Option<&Tool>) -> Result<()> {
        let tool = found(tool, "Tool")?;
        self.access.authorize_tool_mutation(tool, viewer)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Email templates
    // ------------------------------------------------------------------

    pub fn create_template(
        &self,
        viewer: &Viewer,
        input: TemplateInput,
        id: impl Into<TemplateId>,
        now: Timestamp,
    ) -> Result<EmailTemplate> {
        self.access.authorize_shared_resource_create(viewer)?;
        input.validate()?;
        Ok(input.into_template(id, viewer.id.clone(), now))
    }

    pub fn update_template(
        &self,
        viewer: &Viewer,
        template: Option<&mut EmailTemplate>,
        input: TemplateInput,
        now: Timestamp,
    ) -> Result<()> {
        let template = found_mut(template, "Email template")?;
        self.access.authorize_template_mutation(template, viewer)?;
        input.validate()?;
        input.apply(template, now);
        Ok(())
    }

    pub fn delete_template(&self, viewer: &Viewer, template: Option<&EmailTemplate>) -> Result<()> {
        let template = found(template, "Email template")?;
        self.access.authorize_template_mutation(template, viewer)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Any authenticated user may keep notes.
    pub fn create_note(
        &self,
        viewer: &Viewer,
        input: NoteInput,
        id: impl Into<NoteId>,
        now: Timestamp,
    ) -> Result<Note> {
        input.validate()?;
        Ok(input.into_note(id, viewer.id.clone(), now))
    }

    pub fn update_note(
        &self,
        viewer: &Viewer,
        note: Option<&mut Note>,
        input: NoteInput,
        now: Timestamp,
    ) -> Result<()> {
        input.validate()?;
        let note = found_mut(note, "Note")?;
        self.access.authorize_note_access(note, viewer)?;
        input.apply(note, now);
        Ok(())
    }

    pub fn delete_note(&self, viewer: &Viewer, note: Option<&Note>) -> Result<()> {
        let note = found(note, "Note")?;
        self.access.authorize_note_access(note, viewer)?;
        Ok(())
    }

    /// Keeps only the viewer's own notes.
    pub fn list_notes(&self, viewer: &Viewer, notes: Vec<Note>) -> Vec<Note> {
        notes.into_iter().filter(|n| n.user_id == viewer.id).collect()
    }

    // ------------------------------------------------------------------
    // User administration
    // ------------------------------------------------------------------

    pub fn list_users(&self, viewer: &Viewer, profiles: Vec<Profile>) -> Result<Vec<Profile>> {
        self.access.authorize_user_listing(viewer)?;
        Ok(profiles)
    }

    /// Validates and authorizes a role change, returning the role to store.
    ///
    /// **Checks, in order:**
    /// 1. The viewer may manage users
    /// 2. Target and role are present
    /// 3. The role is one of `admin`, `editor`, `viewer`
    /// 4. An admin is not demoting themselves
    pub fn change_role(&self, viewer: &Viewer, target: &UserId, requested: &str) -> Result<Role> {
        // Audited once the requested role is known.
        require_capability(Some(viewer), Capability::ManageUsers)?;

        if target.as_str().trim().is_empty() || requested.trim().is_empty() {
            return Err(ApiError::validation("UserId and role are required"));
        }
        let role = Role::parse(requested)
            .ok_or_else(|| ApiError::invalid_field("role", "Invalid role"))?;

        self.access.authorize_role_change(viewer, target, role)?;
        info!(viewer = %viewer.id, target = %target, role = %role, "Role changed");
        Ok(role)
    }

    /// Authorizes an administrator setting `target`'s password, then checks
    /// the new password.
    pub fn reset_password(
        &self,
        viewer: &Viewer,
        target: &UserId,
        reset: &PasswordReset,
    ) -> Result<()> {
        self.access.authorize_password_reset(viewer, target)?;
        reset.validate()?;
        info!(viewer = %viewer.id, target = %target, "Password reset");
        Ok(())
    }

    /// Checks a self-service password change before it goes to the identity
    /// provider, which verifies the current password.
    pub fn change_password(&self, viewer: &Viewer, change: &PasswordChange) -> Result<()> {
        change.validate()?;
        info!(viewer = %viewer.id, "Password change accepted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Dashboard
    // ------------------------------------------------------------------

    /// Totals shown to any signed-in user.
    pub fn analytics(
        &self,
        viewer: &Viewer,
        users: Option<u64>,
        documents: Option<u64>,
        email_templates: Option<u64>,
    ) -> Analytics {
        let analytics = Analytics::from_counts(users, documents, email_templates);
        debug!(viewer = %viewer.id, ?analytics, "Analytics computed");
        analytics
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(KbaseConfig::default())
    }
}
