pub mod job;
pub mod nutrition;
pub mod upload;
