//! Ports: traits the application depends on and the types crossing them.

pub mod solver;
