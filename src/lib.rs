// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod account;
pub mod branch;
pub mod customer;
pub mod fake;
pub mod pipeline;
pub mod preset;
pub mod record;
pub mod relationship;
pub mod transaction;
pub mod tsv;
