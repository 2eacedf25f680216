mod engine;
mod error;
mod event;
mod state;

pub use self::{engine::*, error::*, event::*, state::*};
