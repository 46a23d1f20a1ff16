pub mod email;
pub mod reply;
pub mod upload;
