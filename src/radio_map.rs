/// 参考指纹数据集（radio map）加载
///
/// 数据格式为 JSON 数组，每条记录：
///
/// ```json
/// {
///   "CLASSNAME": "Fingerprint",
///   "INSTANCE": {
///     "mWiFiFingerprint": { "aa:bb:cc:dd:ee:ff": -67 },
///     "mCenter": { "x": 12.5, "y": 3.0 },
///     "mRadius": 1.0,
///     "mColor": -16776961,
///     "mColor4f": [0, 0, 255, 255],
///     "mIsRemoved": false
///   }
/// }
/// ```
///
/// `CLASSNAME` 字段不读取，缺失或取其他值都不影响加载。
/// 同一条记录内重复的接入点 ID（包括规范化后相同的 ID）会被拒绝。
/// 不合法的记录在这里被拒绝，不会传给定位引擎。

use crate::algorithms::{Fingerprint, FingerprintPayload, Location};
use regex::Regex;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};

static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}([:-][0-9A-Fa-f]{2}){5}$").expect("MAC 正则表达式错误")
});

/// 数据集加载错误
#[derive(Debug, Error)]
pub enum RadioMapError {
    #[error("读取数据集失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("第 {index} 条记录无效: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// 加载选项
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// 要求所有接入点 ID 都是 MAC 地址格式
    pub require_mac_ids: bool,
}

// ============================================================================
// JSON 原始记录
// ============================================================================

#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "INSTANCE")]
    instance: RawInstance,
}

#[derive(Deserialize)]
struct RawInstance {
    #[serde(rename = "mWiFiFingerprint", deserialize_with = "signal_entries")]
    wifi_fingerprint: Vec<(String, i64)>,
    #[serde(rename = "mCenter")]
    center: Location,
    #[serde(rename = "mRadius", default)]
    radius: f64,
    #[serde(rename = "mColor", default)]
    color: i32,
    #[serde(rename = "mColor4f", default)]
    color4f: Vec<i32>,
    #[serde(rename = "mIsRemoved", default)]
    is_removed: bool,
}

/// 按出现顺序保留所有条目；反序列化为 HashMap 会让重复的键互相覆盖
fn signal_entries<'de, D>(deserializer: D) -> Result<Vec<(String, i64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SignalEntriesVisitor;

    impl<'de> Visitor<'de> for SignalEntriesVisitor {
        type Value = Vec<(String, i64)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("接入点 ID 到信号强度的 JSON 对象")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, i64>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(SignalEntriesVisitor)
}

impl RawInstance {
    fn into_fingerprint(self, index: usize, options: &LoadOptions) -> Result<Fingerprint, RadioMapError> {
        let invalid = |reason: String| RadioMapError::InvalidRecord { index, reason };

        if !self.center.x.is_finite() || !self.center.y.is_finite() {
            return Err(invalid(format!(
                "中心坐标不是有限数: ({}, {})",
                self.center.x, self.center.y
            )));
        }

        let mut signals = HashMap::with_capacity(self.wifi_fingerprint.len());
        for (id, rss) in self.wifi_fingerprint {
            let rss = i32::try_from(rss)
                .map_err(|_| invalid(format!("接入点 {} 的信号强度 {} 超出范围", id, rss)))?;
            let normalized = normalize_ap_id(&id, options).map_err(&invalid)?;
            if signals.insert(normalized.clone(), rss).is_some() {
                return Err(invalid(format!("接入点 {} 重复出现", normalized)));
            }
        }

        let payload = FingerprintPayload {
            radius: self.radius,
            color: self.color,
            color4f: self.color4f,
            removed: self.is_removed,
        };
        Ok(Fingerprint::new(signals, self.center).with_payload(payload))
    }
}

/// MAC 格式的 ID 统一为小写冒号分隔；其他 ID 原样保留，除非要求 MAC 格式
fn normalize_ap_id(id: &str, options: &LoadOptions) -> Result<String, String> {
    if MAC_PATTERN.is_match(id) {
        return Ok(id.to_ascii_lowercase().replace('-', ":"));
    }
    if options.require_mac_ids {
        return Err(format!("接入点 ID '{}' 不是 MAC 地址", id));
    }
    if id.trim().is_empty() {
        return Err("接入点 ID 为空".to_string());
    }
    Ok(id.to_string())
}

// ============================================================================
// 数据集
// ============================================================================

/// 参考指纹数据集
#[derive(Clone, Debug, Default)]
pub struct RadioMap {
    fingerprints: Vec<Fingerprint>,
}

impl RadioMap {
    /// 从 JSON 字符串解析
    pub fn from_json_str(json: &str, options: &LoadOptions) -> Result<Self, RadioMapError> {
        let records: Vec<RawRecord> = serde_json::from_str(json)?;
        Self::from_records(records, options)
    }

    /// 从任意读取器解析
    pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, RadioMapError> {
        let records: Vec<RawRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records, options)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, RadioMapError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let map = Self::from_json_str(&json, options)?;
        info!(path = %path.display(), fingerprints = map.len(), "radio map loaded");
        Ok(map)
    }

    /// 从文件异步加载
    pub async fn load_async(
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<Self, RadioMapError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let map = Self::from_json_str(&json, options)?;
        info!(path = %path.display(), fingerprints = map.len(), "radio map loaded");
        Ok(map)
    }

    fn from_records(records: Vec<RawRecord>, options: &LoadOptions) -> Result<Self, RadioMapError> {
        let fingerprints = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.instance.into_fingerprint(index, options))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(records = fingerprints.len(), "radio map parsed");
        Ok(RadioMap { fingerprints })
    }

    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    pub fn into_fingerprints(self) -> Vec<Fingerprint> {
        self.fingerprints
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// 取出第 `index` 条作为查询指纹，其余作为参考集（留一法）
    pub fn split_off_query(mut self, index: usize) -> Option<(Fingerprint, Vec<Fingerprint>)> {
        if index >= self.fingerprints.len() {
            return None;
        }
        let query = self.fingerprints.remove(index);
        Some((query, self.fingerprints))
    }
}

impl From<Vec<Fingerprint>> for RadioMap {
    fn from(fingerprints: Vec<Fingerprint>) -> Self {
        RadioMap { fingerprints }
    }
}
