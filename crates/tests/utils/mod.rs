#![allow(dead_code)]
pub mod common;
pub mod ledger_node;
