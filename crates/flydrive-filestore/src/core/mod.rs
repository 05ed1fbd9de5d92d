pub(crate) mod errors;
pub mod factory;
