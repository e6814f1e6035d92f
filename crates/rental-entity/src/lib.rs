//! # rental-entity
//!
//! Domain entity models for the rental booking core. Database entities
//! derive `sqlx::FromRow`; status enums map onto PostgreSQL enum types.

pub mod booking;
pub mod vehicle;
