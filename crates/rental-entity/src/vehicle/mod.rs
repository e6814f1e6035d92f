//! Vehicle entity as exposed by the vehicle registry.

pub mod model;
pub mod status;

pub use model::Vehicle;
pub use status::VehicleStatus;
