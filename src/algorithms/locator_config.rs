/// 定位引擎可调参数
///
/// 原先硬编码在算法中的常量集中在这里，便于针对不同场地调整

use crate::algorithms::LocatorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 定位参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// 强信号阈值 (dBm)，信号严格大于该值才算“强”接入点
    pub min_rss_to_count: i32,
    /// 强接入点少于该数量时，退回使用全部接入点
    pub min_strong_aps: usize,
    /// 邻居得分下限，得分严格大于该值才保留
    pub neighbor_min_score: i32,
    /// 单边缺失接入点的惩罚偏移量
    pub rss_offset: i32,
}

impl LocatorConfig {
    /// 从 JSON 字符串读取配置（缺省字段使用默认值）
    pub fn from_json_str(json: &str) -> Result<Self, LocatorError> {
        let config: LocatorConfig = serde_json::from_str(json)
            .map_err(|e| LocatorError::InvalidConfig(format!("JSON 解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证参数的合理性
    pub fn validate(&self) -> Result<(), LocatorError> {
        if self.min_strong_aps == 0 {
            return Err(LocatorError::InvalidConfig(
                "min_strong_aps 至少为 1".to_string(),
            ));
        }
        if self.rss_offset < 0 {
            return Err(LocatorError::InvalidConfig(
                "rss_offset 不能为负数".to_string(),
            ));
        }
        if self.min_rss_to_count > 0 {
            return Err(LocatorError::InvalidConfig(
                "min_rss_to_count 应为非正数（信号以 dBm 表示）".to_string(),
            ));
        }
        Ok(())
    }

    /// 获取配置描述
    pub fn description(&self) -> String {
        format!(
            "定位参数 - 强信号阈值={} dBm, 最少强接入点={}, 邻居得分下限={}, 缺失惩罚={}",
            self.min_rss_to_count, self.min_strong_aps, self.neighbor_min_score, self.rss_offset
        )
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            min_rss_to_count: -75,
            min_strong_aps: 3,
            neighbor_min_score: -1,
            rss_offset: 100,
        }
    }
}

impl fmt::Display for LocatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LocatorConfig::default();
        assert_eq!(config.min_rss_to_count, -75);
        assert_eq!(config.min_strong_aps, 3);
        assert_eq!(config.neighbor_min_score, -1);
        assert_eq!(config.rss_offset, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = LocatorConfig::from_json_str(r#"{"min_rss_to_count": -80}"#).unwrap();
        assert_eq!(config.min_rss_to_count, -80);
        assert_eq!(config.rss_offset, 100);
    }

    #[test]
    fn test_invalid_config() {
        let err = LocatorConfig::from_json_str(r#"{"rss_offset": -5}"#).unwrap_err();
        assert!(matches!(err, LocatorError::InvalidConfig(_)));

        let err = LocatorConfig::from_json_str(r#"{"min_strong_aps": 0}"#).unwrap_err();
        assert!(matches!(err, LocatorError::InvalidConfig(_)));

        let err = LocatorConfig::from_json_str(r#"{"min_rss_to_count": 5}"#).unwrap_err();
        assert!(matches!(err, LocatorError::InvalidConfig(_)));

        let config = LocatorConfig {
            min_rss_to_count: 0,
            ..LocatorConfig::default()
        };
        assert!(config.validate().is_ok());

        let err = LocatorConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, LocatorError::InvalidConfig(_)));
    }
}
