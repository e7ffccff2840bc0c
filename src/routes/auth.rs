/// Authentication Routes
///
/// Registration, login, token refresh, and the current user's profile.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{PasswordHasher, SessionIssuer};
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::store::{NewUser, UserPatch, UserRecord, UserResponse, UserStore};
use crate::validators::{is_valid_email, is_valid_full_name, is_valid_password, is_valid_username};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

async fn ensure_email_free(store: &dyn UserStore, email: &str) -> Result<(), AppError> {
    if store.find_by_email(email).await?.is_some() {
        return Err(ValidationError::AlreadyExists("email".to_string()).into());
    }
    Ok(())
}

async fn ensure_username_free(store: &dyn UserStore, username: &str) -> Result<(), AppError> {
    if store.find_by_username(username).await?.is_some() {
        return Err(ValidationError::AlreadyExists("username".to_string()).into());
    }
    Ok(())
}

/// POST /api/v1/auth/register
///
/// Create an active, non-superuser account.
///
/// # Errors
/// - 400: invalid input, or email/username already taken
/// - 409: lost a race on the unique constraint
pub async fn register(
    form: web::Json<RegisterRequest>,
    store: web::Data<dyn UserStore>,
    hasher: web::Data<PasswordHasher>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    let username = is_valid_username(&form.username)?;
    is_valid_password(&form.password)?;
    let full_name = form
        .full_name
        .as_deref()
        .map(is_valid_full_name)
        .transpose()?
        .filter(|name| !name.is_empty());

    ensure_email_free(store.get_ref(), &email).await?;
    ensure_username_free(store.get_ref(), &username).await?;

    let user = store
        .insert(NewUser {
            email,
            username,
            full_name,
            password_hash: hasher.hash(&form.password)?,
            is_superuser: false,
        })
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// POST /api/v1/auth/login
///
/// Exchange email and password for an access/refresh token pair.
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
/// - 400: account is inactive
pub async fn login(
    form: web::Json<LoginRequest>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let tokens = issuer.login(&form.email, &form.password).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new pair. The submitted token is not
/// revoked; see `SessionIssuer::refresh`.
///
/// # Errors
/// - 401: invalid refresh token, or its identity is gone or inactive
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let tokens = issuer.refresh(&form.refresh_token).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// GET /api/v1/auth/me
///
/// **Requires an active account** (enforced by `BearerAuth`).
pub async fn get_current_user(user: web::ReqData<UserRecord>) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(&*user))
}

/// PATCH /api/v1/auth/me
///
/// Apply only the provided fields. Changing the email changes the token
/// subject, so existing tokens stop resolving and the user must log in again.
///
/// # Errors
/// - 400: invalid input, or new email/username already taken
pub async fn update_current_user(
    user: web::ReqData<UserRecord>,
    form: web::Json<UpdateProfileRequest>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user = user.into_inner();
    let context = ErrorContext::new("profile_update").with_user_id(user.id.to_string());
    let form = form.into_inner();

    let mut patch = UserPatch::default();

    if let Some(email) = form.email.as_deref().map(is_valid_email).transpose()? {
        if email != user.email {
            ensure_email_free(store.get_ref(), &email).await?;
            patch.email = Some(email);
        }
    }

    if let Some(username) = form.username.as_deref().map(is_valid_username).transpose()? {
        if username != user.username {
            ensure_username_free(store.get_ref(), &username).await?;
            patch.username = Some(username);
        }
    }

    patch.full_name = form.full_name.as_deref().map(is_valid_full_name).transpose()?;

    if patch.is_empty() {
        return Ok(HttpResponse::Ok().json(UserResponse::from(&user)));
    }

    let updated = store.update(user.id, patch).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = ?context.user_id,
        "Profile updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}
