use brokerdesk_core::{AppError, AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{
    Department, DepartmentContent, DepartmentContentDraft, DepartmentContentPatch,
};

use crate::ResourceService;

/// Departments and the posts they publish.
#[derive(Clone)]
pub struct DepartmentService {
    departments: ResourceService<Department>,
    contents: ResourceService<DepartmentContent>,
}

impl DepartmentService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        departments: ResourceService<Department>,
        contents: ResourceService<DepartmentContent>,
    ) -> Self {
        Self {
            departments,
            contents,
        }
    }

    /// Returns the department CRUD service.
    #[must_use]
    pub fn departments(&self) -> &ResourceService<Department> {
        &self.departments
    }

    /// Lists the posts of a department, newest first.
    pub async fn list_contents(
        &self,
        actor: &UserIdentity,
        department_id: RecordId,
    ) -> AppResult<Vec<DepartmentContent>> {
        self.departments.find(actor, department_id).await?;
        let mut contents: Vec<DepartmentContent> = self
            .contents
            .list(actor)
            .await?
            .into_iter()
            .filter(|content| content.department_id == department_id)
            .collect();
        contents.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(contents)
    }

    /// Adds a post to a department.
    pub async fn create_content(
        &self,
        actor: &UserIdentity,
        department_id: RecordId,
        mut draft: DepartmentContentDraft,
    ) -> AppResult<DepartmentContent> {
        self.departments.find(actor, department_id).await?;
        draft.department_id = department_id;
        self.contents.create(actor, draft).await
    }

    /// Updates a post of a department.
    pub async fn update_content(
        &self,
        actor: &UserIdentity,
        department_id: RecordId,
        id: RecordId,
        patch: DepartmentContentPatch,
    ) -> AppResult<DepartmentContent> {
        self.content_of(actor, department_id, id).await?;
        self.contents.update(actor, id, patch).await
    }

    /// Deletes a post of a department.
    pub async fn delete_content(
        &self,
        actor: &UserIdentity,
        department_id: RecordId,
        id: RecordId,
    ) -> AppResult<()> {
        self.content_of(actor, department_id, id).await?;
        self.contents.delete(actor, id).await
    }

    /// Deletes a department together with its posts.
    pub async fn delete_department(&self, actor: &UserIdentity, id: RecordId) -> AppResult<()> {
        self.departments
            .require(actor, brokerdesk_domain::Capability::Delete)
            .await?;
        let posts: Vec<RecordId> = self
            .contents
            .list_unchecked(actor.tenant_id())
            .await?
            .into_iter()
            .filter(|content| content.department_id == id)
            .map(|content| content.id)
            .collect();
        for post in posts {
            self.contents.delete_unchecked(actor.tenant_id(), post).await?;
        }
        self.departments.delete(actor, id).await
    }

    async fn content_of(
        &self,
        actor: &UserIdentity,
        department_id: RecordId,
        id: RecordId,
    ) -> AppResult<DepartmentContent> {
        let content = self.contents.find(actor, id).await?;
        if content.department_id != department_id {
            return Err(AppError::NotFound(format!(
                "post '{id}' does not belong to department '{department_id}'"
            )));
        }
        Ok(content)
    }
}
