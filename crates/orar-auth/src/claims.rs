//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use orar_core::AppError;
use orar_models::ids::UserId;
use orar_models::users::{Principal, UserRole};

/// JWT claims for access tokens.
///
/// The identity provider signs these; the API trusts them without a
/// directory lookup to authorize a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    pub role: UserRole,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// The authenticated caller described by these claims.
    pub fn principal(&self) -> Result<Principal, AppError> {
        let id: UserId = self
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject"))?;
        Ok(Principal::new(id, self.email.clone(), self.role))
    }
}
