pub mod event;
pub mod health;
pub mod message;
pub mod outcome;
pub mod user;
