//! Guidance and control: the per-tick gain scheduler and the cascade wiring
//! it to the discrete controllers.

pub mod cascade;
pub mod scheduler;

pub use cascade::{Actuation, CascadeController, VerticalMode};
pub use scheduler::{ControlDesignParams, GainScheduler};
