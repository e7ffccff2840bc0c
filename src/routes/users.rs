/// User Administration Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, DatabaseError, ErrorContext};
use crate::store::{UserRecord, UserResponse, UserStore};

#[derive(Deserialize)]
pub struct StatusRequest {
    pub is_active: bool,
}

/// PUT /api/v1/users/{email}/status
///
/// Activate or deactivate an account. **Requires a superuser**.
/// Deactivation takes effect on the target's next request, including for
/// access tokens that have not expired.
///
/// # Errors
/// - 403: caller is not a superuser
/// - 404: no account with this email
pub async fn set_user_status(
    admin: web::ReqData<UserRecord>,
    path: web::Path<String>,
    form: web::Json<StatusRequest>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("set_user_status").with_user_id(admin.id.to_string());
    let email = path.into_inner();

    let target = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;

    let updated = store.set_active(target.id, form.is_active).await?;

    tracing::info!(
        request_id = %context.request_id,
        admin_id = ?context.user_id,
        target_id = %updated.id,
        is_active = updated.is_active,
        "User status changed"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}
