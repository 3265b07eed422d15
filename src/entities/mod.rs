pub mod prelude;

pub mod answers;
pub mod articles;
pub mod categories;
pub mod questions;
pub mod resources;
pub mod users;
