pub mod availability;
pub mod enrollments;
pub mod packages;
pub mod pets;
pub mod public;
pub mod sessions;
pub mod templates;
