pub mod ai_service;
pub mod application_service;
pub mod notification_service;
pub mod scoring_service;
pub mod transition_service;
