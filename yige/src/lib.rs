//! YiGe library
//!
//! The journaling core: day records, keepsake artifacts, metadata collection
//! and the guest/account session, usable from any host shell.

pub mod app;
pub mod artifact;
pub mod config;
pub mod database;
pub mod error;
pub mod imaging;
pub mod providers;
pub mod services;
