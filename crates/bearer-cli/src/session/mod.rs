//! Session file location and client construction.

pub mod storage;
