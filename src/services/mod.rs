pub mod application_service;
pub mod auth_service;
pub mod authorization;
pub mod interview_service;
pub mod job_service;
pub mod message_service;
pub mod offer_service;
pub mod stats_service;
