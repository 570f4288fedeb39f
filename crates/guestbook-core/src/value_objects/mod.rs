//! Value objects - immutable types that represent domain concepts

mod access_code;
mod snowflake;

pub use access_code::AccessCode;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
