pub mod base;
pub mod null;
pub mod portal;
