//! API controllers

pub mod health;
pub mod rules;
pub mod scan;
