pub mod asset;
pub mod chat;
pub mod context;
pub mod insights;
pub mod narrative;
pub mod report;
pub mod session;
pub mod settings;
