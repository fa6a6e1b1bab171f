pub mod content;
pub mod goals;
pub mod health;
pub mod messages;
pub mod mood;
pub mod settings;
pub mod users;
