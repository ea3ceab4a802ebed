pub mod error;
pub mod pushrelay;
