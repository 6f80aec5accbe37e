pub mod assert;
pub mod context;
pub mod debug;
pub mod exercise;
pub mod sink;
