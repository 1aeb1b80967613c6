// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod compression;
pub mod config;
pub mod decimal;
pub mod export;
pub mod extract;
pub mod html;
pub mod parser;
pub mod pricing;
pub mod progress;
pub mod records;
pub mod writer;
