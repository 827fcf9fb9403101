use brokerdesk_core::TenantId;
use brokerdesk_domain::{EmailAddress, validate_password};

use crate::UserAccount;

use super::*;

/// Parameters of an administrative user provisioning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Initial plaintext password.
    pub password: String,
    /// Role, which decides the default permissions.
    pub role: Role,
    /// Optional branch office.
    #[serde(default)]
    pub delegation_id: Option<RecordId>,
    /// Explicit section rows.
    #[serde(default)]
    pub permissions: Vec<SectionPermission>,
}

impl UserService {
    /// Creates account, profile, role and permission rows in one call.
    pub async fn provision(
        &self,
        actor: &UserIdentity,
        params: ProvisionUser,
    ) -> AppResult<UserProfile> {
        self.permissions
            .require(actor, Section::Users, Capability::Create)
            .await?;
        let matrix = self.permissions.matrix_for(actor).await?;
        if matrix.role() != Role::Admin {
            return Err(AppError::Forbidden(
                "only administrators can provision users".to_owned(),
            ));
        }

        let profile = self.provision_in(actor.tenant_id(), params).await?;
        tracing::info!(user_id = %profile.id, subject = actor.subject(), "user provisioned");
        self.publish(actor, ChangeKind::Inserted, &profile);
        Ok(profile)
    }

    /// Creates the first administrator of a tenant when it has no users.
    ///
    /// Returns `None` when the tenant is already populated.
    pub async fn bootstrap_admin(
        &self,
        tenant_id: TenantId,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<Option<UserProfile>> {
        if !self.directory.list_profiles(tenant_id).await?.is_empty() {
            return Ok(None);
        }

        let profile = self
            .provision_in(
                tenant_id,
                ProvisionUser {
                    name: name.to_owned(),
                    email: email.to_owned(),
                    password: password.to_owned(),
                    role: Role::Admin,
                    delegation_id: None,
                    permissions: Vec::new(),
                },
            )
            .await?;
        tracing::info!(user_id = %profile.id, "bootstrap administrator created");
        Ok(Some(profile))
    }

    async fn provision_in(
        &self,
        tenant_id: TenantId,
        params: ProvisionUser,
    ) -> AppResult<UserProfile> {
        let name = brokerdesk_core::NonEmptyString::new(params.name)?;
        let email = EmailAddress::new(params.email)?;
        validate_password(&params.password)?;

        if self
            .directory
            .find_account_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                email.as_str()
            )));
        }

        let password_hash = self.password_hasher.hash_password(&params.password)?;
        let now = Utc::now();
        let profile = UserProfile {
            id: RecordId::new(),
            name: name.into(),
            email,
            delegation_id: params.delegation_id,
            permissions: PermissionMatrix::for_role(params.role, &params.permissions),
            avatar_url: String::new(),
            created_at: now,
            updated_at: now,
        };

        self.directory
            .create_account(UserAccount {
                tenant_id,
                profile: profile.clone(),
                password_hash,
            })
            .await?;
        Ok(profile)
    }
}
