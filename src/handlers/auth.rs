use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{bearer_token, blocking};
use crate::domain::user::{LoginRequest, NewUser, User};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Identify the account by username, email or both.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserBody {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            admin: user.admin,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
    pub user: UserResponse,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Neither username nor email given"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = LoginRequest {
        username: body.username,
        email: body.email,
        password: body.password,
    };

    let (token, user) = blocking(move || {
        let user = state.auth.login(&request)?;
        let token = state.auth.generate_token(&user)?;
        Ok((token, user))
    })
    .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// POST /auth/check
///
/// Decodes the bearer token and returns the user it carries.
#[utoipa::path(
    post,
    path = "/auth/check",
    responses(
        (status = 200, description = "Token is valid", body = UserResponse),
        (status = 401, description = "Missing, expired or forged token"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn check(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let user = blocking(move || state.auth.authenticate_token(token.as_deref())).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// POST /auth/users
///
/// Admin only.
#[utoipa::path(
    post,
    path = "/auth/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing field or username/email taken"),
        (status = 401, description = "Missing or non-admin token"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateUserBody>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let body = body.into_inner();

    let user = blocking(move || {
        state.auth.authenticate_admin(token.as_deref())?;
        state.auth.create_user(
            NewUser {
                username: body.username,
                email: body.email,
                admin: body.admin,
            },
            &body.password,
        )
    })
    .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}
