pub mod misc;
pub mod orders;
