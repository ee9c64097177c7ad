//! Invoice DB Library
//!
//! Repositories for the Transaction Store and the Document Store.

pub mod db;

pub use db::*;
