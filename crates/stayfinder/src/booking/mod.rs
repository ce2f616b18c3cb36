//! Reservation ledger and availability engine.
//!
//! The engine tracks per-listing, per-day occupancy over a fixed horizon,
//! validates reservation requests, detects scheduling conflicts, and durably
//! commits successful bookings with an audit trail. Catalog loading and
//! display concerns live in [`crate::catalog`]; this module owns all of the
//! system's real state.

pub mod audit;
pub mod domain;
mod engine;
pub mod horizon;
pub mod ledger;
pub mod store;
pub mod validate;

pub use audit::{AuditError, AuditLog};
pub use domain::{AuditRecord, ListingId, ReservationRequest, ValidatedReservation};
pub use engine::{BookingEngine, DayAvailability, EngineError, ReservationOutcome};
pub use horizon::{Horizon, HorizonError};
pub use ledger::{AvailabilityLedger, Cell, LedgerError};
pub use store::{LedgerStore, StorageError};
pub use validate::{validate, RejectReason};
