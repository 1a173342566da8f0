use log::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::ports::{SharedPasswordHasher, SharedTokenCodec, SharedUserRepository};
use crate::domain::user::{LoginRequest, NewUser, User};

#[derive(Clone)]
pub struct AuthService {
    users: SharedUserRepository,
    tokens: SharedTokenCodec,
    passwords: SharedPasswordHasher,
}

impl AuthService {
    pub fn new(
        users: SharedUserRepository,
        tokens: SharedTokenCodec,
        passwords: SharedPasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    pub fn create_user(&self, user: NewUser, password: &str) -> Result<User, DomainError> {
        if user.username.trim().is_empty() || user.email.trim().is_empty() {
            return Err(DomainError::invalid(
                "a username and an email are both required to create a user",
            ));
        }
        if password.is_empty() {
            return Err(DomainError::invalid(
                "the password provided is invalid, please provide a different one",
            ));
        }

        let created = self.users.create(user, self.passwords.hash(password)?)?;
        info!("Created user {} (admin={})", created.username, created.admin);
        Ok(created)
    }

    /// Creates the admin account unless its username or email is already
    /// taken. Returns whether an account was created.
    pub fn ensure_admin(&self, user: NewUser, password: &str) -> Result<bool, DomainError> {
        let taken = self.users.find_by_login(Some(&user.username), None)?.is_some()
            || self.users.find_by_login(None, Some(&user.email))?.is_some();
        if taken {
            return Ok(false);
        }
        self.create_user(NewUser { admin: true, ..user }, password)?;
        Ok(true)
    }

    /// Any mismatch (unknown user, wrong password) is the same Unauthorized.
    pub fn login(&self, request: &LoginRequest) -> Result<User, DomainError> {
        let username = non_blank(request.username.as_deref());
        let email = non_blank(request.email.as_deref());
        if username.is_none() && email.is_none() {
            return Err(DomainError::invalid(
                "no username or email was provided, please provide one or the other",
            ));
        }

        let rejected = || DomainError::Unauthorized("invalid credentials".to_string());

        let user = self
            .users
            .find_by_login(username, email)?
            .ok_or_else(rejected)?;
        let hash = self.users.password_hash(user.id)?.ok_or_else(rejected)?;

        if !self.passwords.verify(&request.password, &hash) {
            warn!("Failed login for {}", user.username);
            return Err(rejected());
        }
        info!("User {} logged in", user.username);
        Ok(user)
    }

    pub fn generate_token(&self, user: &User) -> Result<String, DomainError> {
        self.tokens.encode(user)
    }

    pub fn decode_token(&self, token: &str) -> Result<User, DomainError> {
        self.tokens.decode(token)
    }

    pub fn authenticate_token(&self, token: Option<&str>) -> Result<User, DomainError> {
        let token = token.ok_or_else(|| {
            DomainError::Unauthorized("no auth token was provided, please provide one".to_string())
        })?;
        self.decode_token(token)
    }

    /// Token must be valid and the stored account, not the token copy, must
    /// still be an admin.
    pub fn authenticate_admin(&self, token: Option<&str>) -> Result<User, DomainError> {
        let claimed = self.authenticate_token(token)?;

        let user = self
            .users
            .find_by_login(Some(&claimed.username), Some(&claimed.email))?
            .ok_or_else(|| {
                DomainError::Unauthorized(format!("user {} no longer exists", claimed.username))
            })?;

        if !user.admin {
            warn!("User {} attempted an admin route", user.username);
            return Err(DomainError::Unauthorized(format!(
                "the user {} doesn't have access to the requested route",
                user.username
            )));
        }
        Ok(user)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
