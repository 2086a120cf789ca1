//! Storefront Core Library
//!
//! Cart synchronization, checkout pricing, and order lifecycle for a retail
//! storefront. The crate owns the session-facing state (cart snapshot,
//! checkout session, suggestions) and the rules that govern it; storage and
//! transport are external collaborators behind [`backend::StorefrontBackend`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod backend;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use errors::ServiceError;
pub use events::{Event, EventSender};
pub use session::{AuthSession, AuthState, SessionEvent};
