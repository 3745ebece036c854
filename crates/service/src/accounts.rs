//! Registration, login, and token refresh.

use auth::{TokenIssuer, TokenPair, TokenType, password};
use domain::User;
use store::Store;

use crate::error::ServiceError;

/// Service for account lifecycle and credential exchange.
pub struct AccountService<S: Store> {
    store: S,
    tokens: TokenIssuer,
}

impl<S: Store> AccountService<S> {
    /// Creates a new account service.
    pub fn new(store: S, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Registers a new user. Fails with a conflict if the email is
    /// already registered.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        active: bool,
        admin: bool,
    ) -> Result<User, ServiceError> {
        let hash = password::hash_password(&password).map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            ServiceError::Internal
        })?;

        let user = self
            .store
            .create_user(User::new(name, email, hash, active, admin))
            .await?;

        metrics::counter!("accounts_created_total").increment(1);
        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Exchanges credentials for a token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let invalid = || ServiceError::Unauthorized("invalid credentials".to_string());

        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if !auth::password::verify_password(password, &user.password_hash) {
            return Err(invalid());
        }

        self.tokens.issue_pair(user.id).map_err(|e| {
            tracing::error!(error = %e, "token issuing failed");
            ServiceError::Internal
        })
    }

    /// Exchanges a refresh token for a fresh token pair.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        let user_id = self
            .tokens
            .verify(refresh_token, TokenType::Refresh)
            .map_err(|_| ServiceError::Unauthorized("invalid token".to_string()))?;

        self.tokens.issue_pair(user_id).map_err(|e| {
            tracing::error!(error = %e, "token issuing failed");
            ServiceError::Internal
        })
    }

    /// Resolves a bearer access token to its user.
    ///
    /// Rejects refresh tokens, unknown users, and inactive users.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, ServiceError> {
        let invalid = || ServiceError::Unauthorized("invalid token".to_string());

        let user_id = self
            .tokens
            .verify(access_token, TokenType::Access)
            .map_err(|_| invalid())?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(invalid)?;

        if !user.active {
            return Err(ServiceError::Unauthorized("inactive user".to_string()));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn service() -> AccountService<MemoryStore> {
        AccountService::new(MemoryStore::new(), TokenIssuer::new("test-secret", 30, 60))
    }

    async fn register(svc: &AccountService<MemoryStore>, email: &str) -> User {
        svc.register(
            "user".to_string(),
            email.to_string(),
            "s3cret".to_string(),
            true,
            false,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn register_stores_hash_not_password() {
        let svc = service();
        let user = register(&svc, "a@test.com").await;
        assert_ne!(user.password_hash, "s3cret");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = service();
        register(&svc, "a@test.com").await;

        let result = svc
            .register(
                "other".to_string(),
                "a@test.com".to_string(),
                "pw".to_string(),
                true,
                false,
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn login_roundtrip() {
        let svc = service();
        let user = register(&svc, "a@test.com").await;

        let pair = svc.login("a@test.com", "s3cret").await.unwrap();
        let authenticated = svc.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let svc = service();
        register(&svc, "a@test.com").await;

        let result = svc.login("a@test.com", "wrong").await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn login_rejects_unknown_email() {
        let svc = service();
        let result = svc.login("nobody@test.com", "pw").await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let svc = service();
        register(&svc, "a@test.com").await;

        let pair = svc.login("a@test.com", "s3cret").await.unwrap();
        let result = svc.refresh(&pair.access_token).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn refresh_issues_new_pair() {
        let svc = service();
        register(&svc, "a@test.com").await;

        let pair = svc.login("a@test.com", "s3cret").await.unwrap();
        let renewed = svc.refresh(&pair.refresh_token).await.unwrap();
        assert!(svc.authenticate(&renewed.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn authenticate_rejects_refresh_token() {
        let svc = service();
        register(&svc, "a@test.com").await;

        let pair = svc.login("a@test.com", "s3cret").await.unwrap();
        let result = svc.authenticate(&pair.refresh_token).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn authenticate_rejects_inactive_user() {
        let svc = service();
        svc.register(
            "user".to_string(),
            "a@test.com".to_string(),
            "s3cret".to_string(),
            false,
            false,
        )
        .await
        .unwrap();

        let pair = svc.login("a@test.com", "s3cret").await.unwrap();
        let result = svc.authenticate(&pair.access_token).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }
}
