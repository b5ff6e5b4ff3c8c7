/// Protocol-level error taxonomy.
///
/// Component errors (signing, hashing, storage) are converted into one of
/// these variants before they reach the HTTP boundary. `NotFound` never
/// leaves the crate boundary as-is: handlers map it to `Unauthorized`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Issuance failed: {0}")]
    IssuanceFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
