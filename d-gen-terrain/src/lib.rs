pub mod layout;
pub mod obj;

#[cfg(feature = "generator")]
pub mod generator;
