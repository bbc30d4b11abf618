pub mod chat;
pub mod errors;
pub mod ids;
pub mod models;
pub mod providers;
pub mod store;
pub mod tools;
