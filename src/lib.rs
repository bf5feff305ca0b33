//! Shuttle Booking - registration windows for recurring shuttle buses
//!
//! Group chats open one registration session per bus occurrence, riders
//! join and leave a capacity-bounded roster, and admins force individual
//! dates to run or not run through per-bus schedule overrides.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
