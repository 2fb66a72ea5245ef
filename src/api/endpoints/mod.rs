pub mod calls;
pub mod health;
pub mod reports;
pub mod sessions;
pub mod specialists;
