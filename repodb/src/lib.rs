#![doc = include_str!("../README.md")]

pub mod cli;

mod error;
pub use error::Error;
