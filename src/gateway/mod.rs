//! Gateway facade wiring the ad and reading subsystems together.

mod builder;
mod facade;

pub use builder::SutradharBuilder;
pub use facade::Sutradhar;
