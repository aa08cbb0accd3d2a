use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for registration, login and user reads.
///
/// Stateless apart from its collaborators; safe to share across requests.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User directory implementation
    /// * `authenticator` - Credential verifier and token issuer
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        // Fast path only; the directory's constraint is authoritative.
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            tracing::info!(email = %command.email, "Registration rejected: email taken");
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            email = %created_user.email,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            tracing::info!(email = %command.email, "Login rejected: unknown email");
            return Err(self
                .authenticator
                .reject_unknown(command.password.expose())
                .into());
        };

        let result = self
            .authenticator
            .authenticate(
                command.password.expose(),
                &user.password_hash,
                user.id,
                user.email.as_str(),
            )
            .map_err(|e| {
                match &e {
                    AuthenticationError::InvalidCredentials => {
                        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                    }
                    AuthenticationError::PasswordError(err) => {
                        tracing::error!(
                            user_id = %user.id,
                            error = %err,
                            "Stored credential digest is unusable"
                        );
                    }
                    AuthenticationError::JwtError(_) => {}
                }
                UserError::from(e)
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user,
            token: result.access_token,
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, UserError> {
        self.repository.list(page.offset, page.limit).await
    }
}
