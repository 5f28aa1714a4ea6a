pub mod args;
pub mod review;
