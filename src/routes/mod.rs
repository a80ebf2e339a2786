pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod messages;
pub mod offers;
