#![allow(dead_code)]

pub mod completion;
pub mod loader;
