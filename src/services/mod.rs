//! Business logic services
//!
//! This module contains business logic separated from HTTP concerns.
//! Services are pure functions or thin wrappers around the host that can be
//! tested without a running server.

pub mod config_store;
pub mod interface_status;
pub mod pages;
pub mod service_reload;
pub mod system_info;
