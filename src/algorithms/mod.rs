/// 指纹定位算法模块
/// 
/// 该模块提供 WiFi 指纹室内定位的实现，支持：
/// - 不可变的指纹数据结构（接入点 -> 信号强度）
/// - 信号空间差异度计算（对单边缺失的接入点施加惩罚）
/// - 基于强信号覆盖得分的邻居筛选
/// - 差异度反比加权的质心估计
/// - 可配置的算法参数

pub mod error;
pub mod fingerprint;
pub mod locator;
pub mod locator_config;
pub mod results;

pub use error::*;
pub use fingerprint::*;
pub use locator::*;
pub use locator_config::*;
pub use results::*;
