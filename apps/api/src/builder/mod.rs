pub mod catalog;
pub mod handlers;
pub mod ids;
pub mod model;
pub mod reducer;
