/// 定位结果数据结构
///
/// 包含估计坐标以及邻居筛选的元数据

use crate::algorithms::Location;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// 定位结果
#[derive(Clone, Debug, Serialize)]
pub struct LocationResult {
    /// 估计坐标
    pub location: Location,
    /// 参与加权的邻居指纹数量
    pub neighbor_count: usize,
    /// 邻居组的覆盖得分
    pub best_score: i32,
    /// 查询指纹到各邻居的平均信号空间距离
    pub mean_dissimilarity: f64,
    /// 使用的算法名称
    pub method: String,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
}

impl LocationResult {
    /// 创建新的定位结果
    pub fn new(
        location: Location,
        neighbor_count: usize,
        best_score: i32,
        mean_dissimilarity: f64,
    ) -> Self {
        Self::with_timestamp(
            location,
            neighbor_count,
            best_score,
            mean_dissimilarity,
            Utc::now(),
        )
    }

    /// 创建具有自定义时间戳的结果
    pub fn with_timestamp(
        location: Location,
        neighbor_count: usize,
        best_score: i32,
        mean_dissimilarity: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        LocationResult {
            location,
            neighbor_count,
            best_score,
            mean_dissimilarity,
            method: "weighted_knn".to_string(),
            timestamp,
        }
    }

    /// 获取 2D 坐标
    pub fn xy(&self) -> (f64, f64) {
        (self.location.x, self.location.y)
    }

    /// 与某个坐标（例如真值）的距离
    pub fn distance_to(&self, other: &Location) -> f64 {
        self.location.distance_to(other)
    }

    /// 获取详细描述
    pub fn detailed_description(&self) -> String {
        format!(
            "位置: ({:.6}, {:.6}), 邻居数: {}, 覆盖得分: {}, 平均信号距离: {:.2}, 方法: {}",
            self.location.x,
            self.location.y,
            self.neighbor_count,
            self.best_score,
            self.mean_dissimilarity,
            self.method
        )
    }
}

impl fmt::Display for LocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) [{} 个邻居]",
            self.location.x, self.location.y, self.neighbor_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_result_creation() {
        let result = LocationResult::new(Location::new(10.0, 20.0), 2, 4, 7.07);
        assert_eq!(result.xy(), (10.0, 20.0));
        assert_eq!(result.neighbor_count, 2);
        assert_eq!(result.method, "weighted_knn");
    }

    #[test]
    fn test_distance_calculation() {
        let result = LocationResult::new(Location::new(0.0, 0.0), 1, 2, 1.0);
        assert_eq!(result.distance_to(&Location::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_serialize() {
        let result = LocationResult::new(Location::new(1.5, 2.5), 1, 2, 3.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["location"]["x"], 1.5);
        assert_eq!(json["neighbor_count"], 1);
        assert!(json["timestamp"].is_string());
    }
}
