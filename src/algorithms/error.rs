/// 定位引擎错误类型

use thiserror::Error;

/// 定位失败原因
///
/// 所有错误都在发生处直接返回；计算是确定性的，重试没有意义。
/// 调用方收到错误时不会得到任何可用坐标。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// 输入无效：参考集为空，或查询指纹没有任何接入点
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 邻居筛选结果为空，没有可比较的参考指纹
    #[error("没有可比较的参考指纹 (no comparable reference fingerprints)")]
    NoComparableNeighbors,

    /// 配置参数不合理
    #[error("配置无效: {0}")]
    InvalidConfig(String),
}

impl LocatorError {
    pub fn empty_reference_set() -> Self {
        LocatorError::InvalidInput("参考指纹集为空".to_string())
    }

    pub fn empty_query() -> Self {
        LocatorError::InvalidInput("查询指纹不包含任何接入点".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LocatorError::NoComparableNeighbors;
        assert!(err.to_string().contains("no comparable reference fingerprints"));

        let err = LocatorError::empty_reference_set();
        assert!(matches!(err, LocatorError::InvalidInput(_)));
    }
}
