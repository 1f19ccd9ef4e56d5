pub mod bundle;
pub mod collaborators;
pub mod content_type;
pub mod error;
pub mod form;
pub mod licensing;
pub mod location;
pub mod policy;
pub mod pricing;
pub mod splits;
pub mod types;
pub mod uploads;

#[cfg(test)]
pub(crate) mod test_helpers;
