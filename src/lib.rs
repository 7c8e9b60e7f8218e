//! Interactive explorer for CORD-19 paper metadata.
//!
//! The [`data`] module is the query layer (load, filter, aggregate); the
//! remaining modules are the egui dashboard built on top of it.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
