pub mod auth;
pub mod billing;
pub mod health;
pub mod password;
pub mod posts;
pub mod uploads;
pub mod users;
