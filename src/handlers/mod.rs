pub mod analyze;
pub mod health;
pub mod models;
pub mod ocr;
pub mod samples;
pub mod sessions;
