pub mod compiler;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod forth;
pub mod input;
pub mod repl;
pub mod stack;

pub use crate::{
    config::{Config, StackConfig},
    forth::{Forth, ForthError},
};
