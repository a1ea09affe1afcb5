//! Domain models for the care registry.

mod doctor;
mod identity;
mod mapping;
mod patient;
mod validation;

pub use doctor::*;
pub use identity::*;
pub use mapping::*;
pub use patient::*;
pub use validation::FieldError;
