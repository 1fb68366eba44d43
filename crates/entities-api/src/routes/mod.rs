//! # Route Modules
//!
//! One module per resource controller, each exposing a `router()`.

pub mod entities;
