mod delayed_admin;
mod error;
mod event;
mod role;

pub use self::{delayed_admin::*, error::*, event::*, role::*};
