/// 基于 WiFi 指纹的最近邻定位
///
/// 流程：
/// - 强信号接入点筛选
/// - 按覆盖得分选出最佳邻居组
/// - 按信号空间距离反比加权求质心

use crate::algorithms::{Fingerprint, Location, LocationResult, LocatorConfig, LocatorError};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// 缺少指纹时返回的“最大差异”哨兵值
pub const MAX_DISSIMILARITY: f64 = f64::MAX;

/// 两个指纹完全相同时返回的最小正数，而不是 0
///
/// 只表示“需要一个非零权重”，不表示“略有差异”。
pub const MIN_DISSIMILARITY: f64 = f64::MIN_POSITIVE;

// ============================================================================
// 邻居集合
// ============================================================================

/// 邻居筛选结果
#[derive(Clone, Debug, PartialEq)]
pub struct Neighborhood<'a> {
    /// 得分最高的一组参考指纹，保持参考集中的顺序
    pub members: Vec<&'a Fingerprint>,
    /// 该组的覆盖得分；没有任何指纹过线时为 None
    pub score: Option<i32>,
}

impl Neighborhood<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ============================================================================
// 定位器
// ============================================================================

/// 指纹定位器
///
/// 无状态：每次调用只读取传入的参考集和查询指纹，可以在多个线程中同时使用。
#[derive(Clone, Debug, Default)]
pub struct Locator {
    config: LocatorConfig,
}

impl Locator {
    /// 使用自定义参数创建定位器
    pub fn new(config: LocatorConfig) -> Result<Self, LocatorError> {
        config.validate()?;
        Ok(Locator { config })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// 估计查询指纹的坐标
    ///
    /// # 错误
    /// - 参考集为空或查询指纹没有接入点: [`LocatorError::InvalidInput`]
    /// - 没有任何参考指纹的覆盖得分过线: [`LocatorError::NoComparableNeighbors`]
    pub fn estimate_location(
        &self,
        reference: &[Fingerprint],
        query: &Fingerprint,
    ) -> Result<Location, LocatorError> {
        Self::check_input(reference, query)?;
        let neighbors = self.select_neighbors(reference, query);
        let (location, _) = self.weighted_centroid(query, &neighbors.members)?;
        Ok(location)
    }

    /// 与 [`Locator::estimate_location`] 相同，并附带邻居筛选的元数据
    #[tracing::instrument(level = "debug", skip_all, fields(reference = reference.len(), query_aps = query.len()))]
    pub fn locate(
        &self,
        reference: &[Fingerprint],
        query: &Fingerprint,
    ) -> Result<LocationResult, LocatorError> {
        Self::check_input(reference, query)?;
        let neighbors = self.select_neighbors(reference, query);
        let (location, mean_dissimilarity) = self.weighted_centroid(query, &neighbors.members)?;

        Ok(LocationResult::new(
            location,
            neighbors.len(),
            neighbors.score.unwrap_or(self.config.neighbor_min_score),
            mean_dissimilarity,
        ))
    }

    /// 信号空间中的差异度（欧几里得距离）
    ///
    /// 只在一侧出现的接入点，把另一侧的缺失读数视为 `信号 + rss_offset`。
    /// 始终以 (查询, 参考) 的顺序调用。
    ///
    /// - 任一指纹缺失时返回 [`MAX_DISSIMILARITY`]
    /// - 距离恰好为 0 时返回 [`MIN_DISSIMILARITY`]，保证可以取倒数作为权重
    pub fn dissimilarity(&self, query: Option<&Fingerprint>, reference: Option<&Fingerprint>) -> f64 {
        let (Some(query), Some(reference)) = (query, reference) else {
            return MAX_DISSIMILARITY;
        };

        let distance = self.signal_distance(query, reference);
        if distance == 0.0 {
            MIN_DISSIMILARITY
        } else {
            distance
        }
    }

    /// 返回强信号接入点集合
    ///
    /// 强接入点不足 `min_strong_aps` 个时，返回全部接入点。
    pub fn strong_access_points<'a>(&self, fingerprint: &'a Fingerprint) -> HashSet<&'a str> {
        let mut strong = HashSet::new();
        let mut weak = HashSet::new();

        for (id, &rss) in fingerprint.signals() {
            if rss > self.config.min_rss_to_count {
                strong.insert(id.as_str());
            } else {
                weak.insert(id.as_str());
            }
        }

        if strong.len() < self.config.min_strong_aps {
            strong.extend(weak);
        }
        strong
    }

    /// 覆盖得分: 2 × 共有 − 仅查询有 − 仅候选有
    pub fn score(&self, query: &Fingerprint, candidate: &Fingerprint) -> i32 {
        overlap_score(
            &self.strong_access_points(query),
            &self.strong_access_points(candidate),
        )
    }

    /// 选出得分最高的一组参考指纹
    ///
    /// 得分不大于 `neighbor_min_score` 的指纹被丢弃；其余指纹中只保留
    /// 达到最高得分的那些，较低得分的组即使非空也不保留。
    pub fn select_neighbors<'a>(
        &self,
        reference: &'a [Fingerprint],
        query: &Fingerprint,
    ) -> Neighborhood<'a> {
        self.select_neighbors_from(reference, query)
    }

    /// 与 [`Locator::select_neighbors`] 相同，候选指纹可以来自任意迭代器
    pub fn select_neighbors_from<'a, I>(&self, candidates: I, query: &Fingerprint) -> Neighborhood<'a>
    where
        I: IntoIterator<Item = &'a Fingerprint>,
    {
        let query_aps = self.strong_access_points(query);

        let mut total = 0usize;
        let scored: Vec<(i32, &Fingerprint)> = candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                total += 1;
                let score = overlap_score(&query_aps, &self.strong_access_points(candidate));
                trace!(index, score, "candidate score");
                (score > self.config.neighbor_min_score).then_some((score, candidate))
            })
            .collect();

        let best = scored.iter().map(|(score, _)| *score).max();
        let members: Vec<&Fingerprint> = match best {
            Some(best) => scored
                .into_iter()
                .filter(|(score, _)| *score == best)
                .map(|(_, candidate)| candidate)
                .collect(),
            None => Vec::new(),
        };

        debug!(
            candidates = total,
            selected = members.len(),
            best_score = ?best,
            "neighbor selection"
        );

        Neighborhood {
            members,
            score: best,
        }
    }

    /// 留一法：以 `reference[index]` 为查询指纹，用其余指纹为它定位
    ///
    /// 直接借用参考集，不复制其余指纹。
    pub fn estimate_location_excluding(
        &self,
        reference: &[Fingerprint],
        index: usize,
    ) -> Result<Location, LocatorError> {
        let query = reference.get(index).ok_or_else(|| {
            LocatorError::InvalidInput(format!(
                "查询索引 {} 超出参考集范围 (共 {} 条)",
                index,
                reference.len()
            ))
        })?;
        if reference.len() < 2 {
            return Err(LocatorError::empty_reference_set());
        }
        if query.is_empty() {
            return Err(LocatorError::empty_query());
        }

        let others = reference
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, fp)| fp);
        let neighbors = self.select_neighbors_from(others, query);
        let (location, _) = self.weighted_centroid(query, &neighbors.members)?;
        Ok(location)
    }

    /// 按差异度倒数加权求邻居中心的质心，同时返回平均差异度
    ///
    /// 权重按 `最小差异度 / 差异度` 计算，与 `1 / 差异度` 只差一个公共因子，
    /// 结果相同；这样在 [`MIN_DISSIMILARITY`] 出现时权重仍然有限。
    pub fn weighted_centroid(
        &self,
        query: &Fingerprint,
        neighbors: &[&Fingerprint],
    ) -> Result<(Location, f64), LocatorError> {
        if neighbors.is_empty() {
            warn!("no comparable reference fingerprints");
            return Err(LocatorError::NoComparableNeighbors);
        }

        let distances: Vec<f64> = neighbors
            .iter()
            .map(|&neighbor| self.dissimilarity(Some(query), Some(neighbor)))
            .collect();
        let nearest = distances.iter().copied().fold(f64::INFINITY, f64::min);

        let mut sum_wx = 0.0;
        let mut sum_wy = 0.0;
        let mut sum_w = 0.0;
        for (neighbor, distance) in neighbors.iter().zip(&distances) {
            let weight = nearest / distance;
            let center = neighbor.center();
            sum_wx += weight * center.x;
            sum_wy += weight * center.y;
            sum_w += weight;
        }

        let mean = distances.iter().sum::<f64>() / distances.len() as f64;
        Ok((Location::new(sum_wx / sum_w, sum_wy / sum_w), mean))
    }

    // ========================================================================
    // 私有实现函数
    // ========================================================================

    fn check_input(reference: &[Fingerprint], query: &Fingerprint) -> Result<(), LocatorError> {
        if reference.is_empty() {
            return Err(LocatorError::empty_reference_set());
        }
        if query.is_empty() {
            return Err(LocatorError::empty_query());
        }
        Ok(())
    }

    // 平方和用整数累加，结果与 HashMap 的遍历顺序无关
    fn signal_distance(&self, query: &Fingerprint, reference: &Fingerprint) -> f64 {
        let offset = i64::from(self.config.rss_offset);
        let mut sum_sq: i128 = 0;

        for (id, &rss) in query.signals() {
            let diff = match reference.signal(id) {
                Some(other) => i64::from(rss) - i64::from(other),
                None => i64::from(rss) + offset,
            };
            sum_sq += i128::from(diff) * i128::from(diff);
        }

        for (id, &rss) in reference.signals() {
            if !query.contains(id) {
                let diff = i64::from(rss) + offset;
                sum_sq += i128::from(diff) * i128::from(diff);
            }
        }

        (sum_sq as f64).sqrt()
    }
}

fn overlap_score(query_aps: &HashSet<&str>, candidate_aps: &HashSet<&str>) -> i32 {
    let shared = query_aps.intersection(candidate_aps).count() as i32;
    let query_only = query_aps.len() as i32 - shared;
    let candidate_only = candidate_aps.len() as i32 - shared;
    2 * shared - query_only - candidate_only
}

// ============================================================================
// 默认参数的便捷入口
// ============================================================================

/// 使用默认参数计算差异度
pub fn dissimilarity(query: Option<&Fingerprint>, reference: Option<&Fingerprint>) -> f64 {
    Locator::default().dissimilarity(query, reference)
}

/// 使用默认参数估计坐标
pub fn estimate_location(
    reference: &[Fingerprint],
    query: &Fingerprint,
) -> Result<Location, LocatorError> {
    Locator::default().estimate_location(reference, query)
}
