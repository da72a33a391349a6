//! Infrastructure layer - Storage backends and service implementations

pub mod api_key;
pub mod estate;
pub mod logging;
pub mod storage;
