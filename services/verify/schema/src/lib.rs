//! sea-orm entities owned by the verify service.

pub mod photo_verifications;
pub mod user_profiles;
