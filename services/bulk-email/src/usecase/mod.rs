pub mod create_email;
pub mod get_task;
pub mod send;
