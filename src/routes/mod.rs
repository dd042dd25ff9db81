pub mod admin;
pub mod booking;
pub mod public;
