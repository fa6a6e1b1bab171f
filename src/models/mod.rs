pub mod content;
pub mod goal;
pub mod message;
pub mod mood;
pub mod settings;
pub mod user;
