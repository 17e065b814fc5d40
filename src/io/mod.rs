//! Offline export of recorded runs (for external plotting tools).

pub mod csv;
