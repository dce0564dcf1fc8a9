pub mod calculator_service;
pub mod narrative_service;
pub mod parser_service;
pub mod qa_service;
