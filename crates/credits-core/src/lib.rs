pub mod curve;
mod engine;
mod error;
mod event;
mod fees;
mod visibility;

pub use self::{engine::*, error::*, event::*, fees::*, visibility::*};
