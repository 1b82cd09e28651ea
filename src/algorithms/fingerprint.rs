/// WiFi 指纹定义和相关数据结构

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 缺失信号的哨兵值，比任何真实信号强度都大
///
/// 只能理解为“未知/超出范围”，不能当作测量值参与运算。
pub const MISSING_SIGNAL: i32 = i32::MAX;

/// 二维坐标
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Location { x, y }
    }

    /// 与另一坐标的欧几里得距离
    pub fn distance_to(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 数据集中附带的显示属性，定位算法从不读取
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerprintPayload {
    /// 标记半径
    pub radius: f64,
    /// 显示颜色（ARGB 整数）
    pub color: i32,
    /// 显示颜色分量
    pub color4f: Vec<i32>,
    /// 是否已被标记删除
    pub removed: bool,
}

/// 单个 WiFi 指纹：接入点 -> 信号强度，以及对应的中心坐标
///
/// 构造后不可变。参考指纹的 `center` 是真值；查询指纹的 `center`
/// 是待估计的量（可以用于评估误差）。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// 接入点 ID（通常为 MAC 地址） -> 信号强度 (dBm)
    signals: HashMap<String, i32>,
    /// 中心坐标
    center: Location,
    #[serde(default)]
    payload: FingerprintPayload,
}

impl Fingerprint {
    /// 创建新的指纹
    pub fn new(signals: HashMap<String, i32>, center: Location) -> Self {
        Fingerprint {
            signals,
            center,
            payload: FingerprintPayload::default(),
        }
    }

    /// 从 (接入点, 信号强度) 对创建（简洁方式）
    ///
    /// 重复的接入点以最后一次出现为准。
    pub fn from_pairs(pairs: &[(&str, i32)], x: f64, y: f64) -> Self {
        let signals = pairs
            .iter()
            .map(|(id, rssi)| (id.to_string(), *rssi))
            .collect();
        Self::new(signals, Location::new(x, y))
    }

    /// 附加显示属性
    pub fn with_payload(mut self, payload: FingerprintPayload) -> Self {
        self.payload = payload;
        self
    }

    /// 包含的所有接入点 ID（无序）
    pub fn access_points(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    /// 接入点的信号强度，不存在时返回 [`MISSING_SIGNAL`]
    pub fn signal_at(&self, id: &str) -> i32 {
        self.signal(id).unwrap_or(MISSING_SIGNAL)
    }

    /// 接入点的信号强度
    pub fn signal(&self, id: &str) -> Option<i32> {
        self.signals.get(id).copied()
    }

    /// 是否包含接入点
    pub fn contains(&self, id: &str) -> bool {
        self.signals.contains_key(id)
    }

    pub fn signals(&self) -> &HashMap<String, i32> {
        &self.signals
    }

    pub fn center(&self) -> Location {
        self.center
    }

    pub fn payload(&self) -> &FingerprintPayload {
        &self.payload
    }

    /// 接入点数量
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
