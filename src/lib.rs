//! WiFi 指纹室内定位
//!
//! - `algorithms`: 定位核心（指纹、差异度、邻居筛选、加权质心）
//! - `radio_map`: 从 JSON 数据集加载参考指纹

pub mod algorithms;
pub mod radio_map;

pub use algorithms::{
    dissimilarity, estimate_location, Fingerprint, FingerprintPayload, Location, LocationResult,
    Locator, LocatorConfig, LocatorError, Neighborhood, MAX_DISSIMILARITY, MIN_DISSIMILARITY,
    MISSING_SIGNAL,
};
pub use radio_map::{LoadOptions, RadioMap, RadioMapError};
