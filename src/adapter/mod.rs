//! Adapters implementing the ports.

pub mod solver;
