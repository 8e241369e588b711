pub mod agencies;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod reports;
pub mod users;
