pub mod constants;
pub mod generator;
pub mod intensity;
pub mod lines;
pub mod llm_interaction;
pub mod prompt;
pub mod web_server;

pub use generator::{GenerateRequest, PickupLineGenerator, ValidationError};
pub use intensity::Intensity;
pub use lines::LineSet;
