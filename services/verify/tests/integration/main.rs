
mod retry_test;
mod status_test;
