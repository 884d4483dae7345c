mod auth_extractor;
mod tracing_layer;

pub use auth_extractor::*;
pub use tracing_layer::*;
