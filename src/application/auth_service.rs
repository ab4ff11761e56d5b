use anyhow::Context;
use async_trait::async_trait;

use crate::domain::error::{Error, Result};
use crate::domain::store::Store;
use crate::domain::user::{Credentials, User};

use super::sessions::SessionRegistry;

#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    /// Creates the account and logs it in; returns the user and a token.
    async fn register(&self, creds: Credentials) -> Result<(User, String)>;
    async fn login(&self, creds: Credentials) -> Result<(User, String)>;
    async fn logout(&self, token: &str) -> Result<()>;
    /// Deletes the account, cascading lists and todos, and revokes every
    /// session the user holds.
    async fn delete_account(&self, token: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct AuthServiceImpl<R: Store> {
    store: R,
    sessions: SessionRegistry,
}

impl<R: Store> AuthServiceImpl<R> {
    pub fn new(store: R, sessions: SessionRegistry) -> Self {
        Self { store, sessions }
    }
}

#[async_trait]
impl<R: Store> AuthService for AuthServiceImpl<R> {
    async fn register(&self, creds: Credentials) -> Result<(User, String)> {
        let email = creds.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::InvalidInput("invalid email".into()));
        }
        if creds.password.is_empty() {
            return Err(Error::InvalidInput("password must not be empty".into()));
        }
        if self.store.user_by_email(&email).await?.is_some() {
            return Err(Error::InvalidInput("email already registered".into()));
        }
        let hash = bcrypt::hash(&creds.password, bcrypt::DEFAULT_COST)
            .context("hashing password")?;
        let user = self.store.create_user(&email, &hash).await?;
        let token = self.sessions.create(user.id);
        tracing::info!(user = %user.id.0, "registered");
        Ok((user, token))
    }

    async fn login(&self, creds: Credentials) -> Result<(User, String)> {
        let email = creds.email.trim().to_lowercase();
        // Unknown email and wrong password look identical to the caller.
        let Some(user) = self.store.user_by_email(&email).await? else {
            return Err(Error::Unauthorized);
        };
        let ok = bcrypt::verify(&creds.password, &user.password_hash)
            .context("verifying password")?;
        if !ok {
            return Err(Error::Unauthorized);
        }
        let token = self.sessions.create(user.id);
        Ok((user, token))
    }

    async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.revoke(token);
        Ok(())
    }

    async fn delete_account(&self, token: &str) -> Result<()> {
        let user_id = self.sessions.resolve(token)?;
        self.store.delete_user(user_id).await?;
        self.sessions.revoke_user(user_id);
        tracing::info!(user = %user_id.0, "account deleted");
        Ok(())
    }
}
