mod auth;
mod health_check;
mod users;

pub use auth::{get_current_user, login, refresh, register, update_current_user};
pub use health_check::health_check;
pub use users::set_user_status;
