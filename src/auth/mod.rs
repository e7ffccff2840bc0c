/// Authentication module
///
/// Password hashing, token issuance and verification, credential
/// authentication, session issuance and the per-request authorization gate.

mod authenticator;
mod authorizer;
mod claims;
mod jwt;
mod password;
mod session;

pub use authenticator::CredentialAuthenticator;
pub use authorizer::{extract_bearer, AccessPolicy, RequestAuthorizer};
pub use claims::{Claims, TokenPurpose};
pub use jwt::TokenCodec;
pub use password::PasswordHasher;
pub use session::{SessionIssuer, TokenResponse, TOKEN_TYPE};
