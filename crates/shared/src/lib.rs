//! Shared building blocks for the MPIJob operator crates

pub mod config;
