//! Service implementations for the InfoSight API.

pub mod wellness;

pub use wellness::{Wellness, WellnessService};
