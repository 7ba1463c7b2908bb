pub mod profile;
pub mod results;
pub mod verification;
