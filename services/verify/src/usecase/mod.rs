pub mod attempt;
pub mod profile;
pub mod retry;
pub mod review;
pub mod status;
pub mod submit;
