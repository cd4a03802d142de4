//! Presence sheet service.
//!
//! Serves weekly, payroll-month and custom-period attendance views over an
//! employee roster and daily presence records held by a remote REST API.
//! The aggregation itself lives in [`attendance`] and is pure; everything
//! else is plumbing around it.

pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod docs;
pub mod model;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
