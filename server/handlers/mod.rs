pub mod catalog;
pub mod detect;
pub mod health;
