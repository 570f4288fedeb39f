//! Insert-if-absent loop for values backed by a unique index
//!
//! The storage layer reports a collision as [`DomainError::DuplicateCode`].
//! There is no separate existence check, so two concurrent callers can never
//! both end up holding the same code.

use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::error::DomainError;

/// Upper bound on candidates tried before giving up
pub const MAX_UNIQUE_ATTEMPTS: u32 = 20;

/// Which unique column a code is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    AccessCode,
    GuestToken,
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessCode => f.write_str("access code"),
            Self::GuestToken => f.write_str("guest token"),
        }
    }
}

/// Generate candidates and hand each to `insert` until one is accepted.
///
/// `insert` must perform the actual write and fail with
/// `DomainError::DuplicateCode` when the unique index rejects the candidate.
/// Any other error aborts the loop. After [`MAX_UNIQUE_ATTEMPTS`] collisions
/// the loop returns `DomainError::ConflictExhausted`.
pub async fn insert_unique<T, G, F, Fut>(
    kind: CodeKind,
    mut generate: G,
    mut insert: F,
) -> Result<T, DomainError>
where
    G: FnMut() -> String,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    for _ in 0..MAX_UNIQUE_ATTEMPTS {
        match insert(generate()).await {
            Err(DomainError::DuplicateCode(_)) => continue,
            other => return other,
        }
    }

    Err(DomainError::ConflictExhausted {
        kind,
        attempts: MAX_UNIQUE_ATTEMPTS,
    })
}
