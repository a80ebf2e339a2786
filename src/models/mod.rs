pub mod application;
pub mod interview;
pub mod job;
pub mod message;
pub mod offer;
pub mod user;
