//! One module per catalogue kind, plus `system` for the version query.
//! Each handler function takes the decoded request payload and a response
//! body slice to fill, returning an [`super::dispatch::Outcome`] (§4.4-§4.6).

pub mod curve;
pub mod function;
pub mod group;
pub mod system;
pub mod variable;
