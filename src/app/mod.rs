//! Application core — pure game logic, zero I/O.
//!
//! This module contains the authoritative command-processing machinery:
//! command and broadcast types, the validate-then-mutate service, the
//! timer cache, and the single-consumer queue. All interaction with
//! storage, the wall clock, and connected viewers happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without a database or a socket.

pub mod commands;
pub mod events;
pub mod ports;
pub mod processor;
pub mod service;
pub mod timer;
