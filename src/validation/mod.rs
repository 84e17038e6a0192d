//! Request validation built on the `validator` crate.
//!
//! `ValidatedJson` / `ValidatedQuery` reject with 400 and the standard error
//! body; `validators` holds the field rules shared by several resources.

mod extractor;
pub mod validators;

pub use extractor::{ValidatedJson, ValidatedQuery};
pub use validators::{
    validate_json_object, validate_not_blank, validate_phone, validate_slot, validate_slug,
    validate_uuid,
};
