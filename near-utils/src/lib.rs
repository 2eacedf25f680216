mod cache;
mod prefix;

pub use self::{cache::*, prefix::*};
