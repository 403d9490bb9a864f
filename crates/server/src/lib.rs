//! Crypto vote server library.
//!
//! Provides configuration, store bootstrap, and shutdown handling for the
//! `cryptovote-server` binary.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod config;
pub mod shutdown;
