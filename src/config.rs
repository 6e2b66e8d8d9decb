//! Settings for the card: which source to follow, timing, layout, colours
//! and where logs go.

mod load;
mod schema;

pub use schema::*;
