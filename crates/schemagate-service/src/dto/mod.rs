//! Data Transfer Objects (DTOs).

mod db_dto;
mod hash_dto;
mod lenient;

pub use db_dto::*;
pub use hash_dto::*;
