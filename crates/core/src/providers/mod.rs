pub mod registry;
pub mod response;
pub mod traits;

// Hosted model implementations
pub mod gemini;
pub mod openai;
