pub mod access;
pub mod health;
pub mod overview;
pub mod roles;
pub mod session;
