pub mod backend;
pub mod factory;
pub mod stream;

pub use factory::build_engine;
