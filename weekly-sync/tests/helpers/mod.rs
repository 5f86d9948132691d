//! Test Helper Utilities
//!
//! In-memory fakes of the capability traits for weekly-sync tests
#![allow(dead_code)]

pub mod fakes;

pub use fakes::{
    at, event, ids, item, CollectionOp, FakeCatalog, FakeCollection, FakeEventSource,
    ScriptedWindowSource,
};
