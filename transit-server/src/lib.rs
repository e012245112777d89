//! Sri Lanka transit finder server.
//!
//! Answers "which bus stop or station is closest, what will the bus cost,
//! and which buses or trains go where I want?" for Sri Lankan public
//! transport.

pub mod catalog;
pub mod config;
pub mod contact;
pub mod datasets;
pub mod fares;
pub mod geo;
pub mod ratelimit;
pub mod web;
