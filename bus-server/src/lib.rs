//! Bus ticket booking server.
//!
//! Admins maintain a route catalog and dated bus schedules; travellers
//! search by (from, to, date), narrow the results, pick seats on a fixed
//! layout and get a confirmation.

pub mod accounts;
pub mod booking;
pub mod config;
pub mod domain;
pub mod store;
pub mod web;
