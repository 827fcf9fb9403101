use super::*;

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Credentials matched. The identity goes into the session.
    Authenticated(UserIdentity),
    /// Unknown email or wrong password. Callers show one generic message.
    Failed,
}

impl UserService {
    /// Authenticates with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let Some(account) = self
            .directory
            .find_account_by_email(email.trim())
            .await?
        else {
            // Hash anyway so unknown emails take as long as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if !self
            .password_hasher
            .verify_password(password, &account.password_hash)?
        {
            tracing::info!(user_id = %account.profile.id, "login rejected");
            return Ok(AuthOutcome::Failed);
        }

        let profile = account.profile;
        Ok(AuthOutcome::Authenticated(UserIdentity::new(
            profile.id.to_string(),
            profile.name,
            Some(profile.email.as_str().to_owned()),
            account.tenant_id,
        )))
    }
}
