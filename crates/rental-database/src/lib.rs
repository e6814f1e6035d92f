//! # rental-database
//!
//! PostgreSQL connection management, migrations, and the booking store:
//! the contract the booking service runs against plus a PostgreSQL and an
//! in-memory implementation.

pub mod connection;
pub mod migration;
pub mod store;

pub use connection::DatabasePool;
pub use store::memory::MemoryBookingStore;
pub use store::postgres::PgBookingStore;
pub use store::{BookingFilter, BookingStore, BookingUnitOfWork, VehicleRegistry};
