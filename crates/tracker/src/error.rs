//! Error types for the map flow and dispatch.

use crate::vehicle::VehicleId;
use thiserror::Error;

/// Result type alias for tracker operations.
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

/// Errors from the map flow and its driver.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The fleet has no vehicle that can be assigned to a pickup
    #[error("No target vehicle available")]
    NoTargetVehicle,

    /// The configured target is not part of the fleet
    #[error("Vehicle '{0}' is not on the map")]
    UnknownVehicle(VehicleId),

    /// The map session task has stopped
    #[error("Map session is no longer running")]
    SessionClosed,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Errors when requesting a pickup from an operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("No operator with id {0}")]
    UnknownOperator(u32),

    #[error("{name} is not available right now")]
    OperatorUnavailable { name: String },
}
