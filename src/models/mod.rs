pub mod application;
pub mod application_status;
pub mod batch;
pub mod candidate;
pub mod job_posting;
pub mod notification;
pub mod transition_event;
