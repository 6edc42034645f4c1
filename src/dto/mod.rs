pub mod application_dto;
pub mod notification_dto;
