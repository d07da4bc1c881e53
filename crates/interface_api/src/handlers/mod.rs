//! Request handlers

pub mod claims;
pub mod form;
pub mod health;
