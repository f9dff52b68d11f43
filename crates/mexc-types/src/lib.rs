//! Shared types for the MEXC spot WebSocket API
//!
//! This crate provides the wire and domain types used across the workspace.
//! It has no networking dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Topic`] - Subscribable streams and their deterministic stream keys
//! - [`CurrencyPair`], [`Interval`] - Topic parameters
//! - [`Command`], [`CommandAck`], [`Inbound`] - Control messages and frame classification
//! - [`Ohlc`], [`Order`] - Decoded push values
//! - [`MexcError`] - Error types

pub mod enums;
pub mod error;
pub mod mapper;
pub mod market;
pub mod messages;
pub mod symbol;
pub mod topic;

// Re-export commonly used types
pub use enums::*;
pub use error::*;
pub use market::*;
pub use messages::*;
pub use symbol::*;
pub use topic::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
