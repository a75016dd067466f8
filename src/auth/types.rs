use serde::{Deserialize, Serialize};

use crate::{db::dao::OwnerScope, error::AppError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // owner id
    pub exp: usize,  // expiry (unix)
    pub iat: usize,  // issued at
}

impl Claims {
    pub fn owner_id(&self) -> Result<i32, AppError> {
        self.sub
            .trim()
            .parse()
            .map_err(|_| AppError::unauthorized("Token subject is not an owner id"))
    }

    /// Scope every schedule call made on behalf of this token.
    pub fn owner_scope(&self) -> Result<OwnerScope, AppError> {
        self.owner_id().map(OwnerScope::new)
    }
}
