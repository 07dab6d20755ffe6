pub mod common;
pub mod resources;

pub use common::common_routes;
pub use resources::resource_routes;
