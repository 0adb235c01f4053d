pub mod config;
pub mod logging;

pub mod clone;
pub mod download;
pub mod layout;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod storage;
