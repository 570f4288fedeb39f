//! Code generation and the uniqueness guard

mod code;
mod unique;

pub use code::{CodeSpec, ACCESS_CODE, GUEST_TOKEN};
pub use unique::{insert_unique, CodeKind, MAX_UNIQUE_ATTEMPTS};
