pub mod content;
pub mod mood;
pub mod seed;
pub mod settings;
