//! Catalog domain module (film and series titles).
//!
//! This crate contains the `Title` record and its validation rules,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod title;
pub mod validate;

pub use title::{Title, TitleDraft, validate_title};
pub use validate::Validator;
