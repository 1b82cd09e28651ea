/// 🎯 WiFi 指纹定位演示
///
/// 子命令：
/// - proximity: 从数据集中取出一条指纹，用其余指纹为它定位
/// - decreasing: 逐步缩小参考集，观察定位结果的变化
/// - evaluate: 对整个数据集做留一法评估（多线程）
///
/// 日志级别由 RUST_LOG 控制，默认 info

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wifiloc::{Fingerprint, LoadOptions, LocationResult, Locator, LocatorConfig, RadioMap};

const BOLD_RED: &str = "\x1b[1;31m";
const BOLD_TURQUOISE: &str = "\x1b[1;36m";
const RESET: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "wifiloc", about = "基于 WiFi 指纹的室内定位演示")]
struct Cli {
    /// 定位参数文件（JSON）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 要求接入点 ID 必须是 MAC 地址
    #[arg(long, global = true)]
    require_mac_ids: bool,

    /// 以 JSON 输出定位结果
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 用其余指纹为指定指纹定位
    Proximity {
        radio_map: PathBuf,
        #[arg(long, default_value_t = 0)]
        query_index: usize,
    },
    /// 每次去掉参考集中的第一条指纹，重复定位直到参考集为空
    Decreasing {
        training: PathBuf,
        #[arg(long, default_value_t = 15)]
        query_index: usize,
    },
    /// 留一法评估整个数据集
    Evaluate { radio_map: PathBuf },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("错误: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
            LocatorConfig::from_json_str(&json)?
        }
        None => LocatorConfig::default(),
    };
    tracing::info!("{}", config);

    let locator = Locator::new(config)?;
    let options = LoadOptions {
        require_mac_ids: cli.require_mac_ids,
    };

    match cli.command {
        Command::Proximity {
            radio_map,
            query_index,
        } => proximity(&locator, &radio_map, query_index, &options, cli.json).await,
        Command::Decreasing {
            training,
            query_index,
        } => decreasing(&locator, &training, query_index, &options, cli.json).await,
        Command::Evaluate { radio_map } => evaluate(&locator, &radio_map, &options).await,
    }
}

async fn load_query(
    path: &Path,
    query_index: usize,
    options: &LoadOptions,
) -> Result<(Fingerprint, Vec<Fingerprint>)> {
    let map = RadioMap::load_async(path, options)
        .await
        .with_context(|| format!("无法加载数据集 {}", path.display()))?;
    let len = map.len();
    map.split_off_query(query_index)
        .ok_or_else(|| anyhow!("查询索引 {} 超出数据集范围 (共 {} 条)", query_index, len))
}

async fn proximity(
    locator: &Locator,
    path: &Path,
    query_index: usize,
    options: &LoadOptions,
    json: bool,
) -> Result<()> {
    let (query, reference) = load_query(path, query_index, options).await?;
    let result = locator.locate(&reference, &query)?;
    print_result(&query, &result, json)
}

async fn decreasing(
    locator: &Locator,
    path: &Path,
    query_index: usize,
    options: &LoadOptions,
    json: bool,
) -> Result<()> {
    let (query, mut reference) = load_query(path, query_index, options).await?;

    while !reference.is_empty() {
        println!("参考指纹数: {}", reference.len());
        match locator.locate(&reference, &query) {
            Ok(result) => print_result(&query, &result, json)?,
            Err(e) => println!("  定位失败: {}", e),
        }
        reference.remove(0);
    }
    Ok(())
}

async fn evaluate(locator: &Locator, path: &Path, options: &LoadOptions) -> Result<()> {
    let map = RadioMap::load_async(path, options)
        .await
        .with_context(|| format!("无法加载数据集 {}", path.display()))?;
    let fingerprints = Arc::new(map.into_fingerprints());

    let mut handles = Vec::with_capacity(fingerprints.len());
    for index in 0..fingerprints.len() {
        let fingerprints = Arc::clone(&fingerprints);
        let locator = locator.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            locator
                .estimate_location_excluding(&fingerprints, index)
                .map(|estimate| estimate.distance_to(&fingerprints[index].center()))
        }));
    }

    let mut errors = Vec::new();
    let mut failures = 0usize;
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.await? {
            Ok(error) => errors.push(error),
            Err(e) => {
                failures += 1;
                tracing::warn!(index, error = %e, "localization failed");
            }
        }
    }

    println!("评估指纹数: {}", fingerprints.len());
    println!("成功: {}, 失败: {}", errors.len(), failures);
    if !errors.is_empty() {
        let mean = errors.iter().sum::<f64>() / errors.len() as f64;
        let max = errors.iter().copied().fold(0.0, f64::max);
        println!("平均误差: {:.3}, 最大误差: {:.3}", mean, max);
    }
    Ok(())
}

fn print_result(query: &Fingerprint, result: &LocationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    let truth = query.center();
    println!(
        "{}({} , {}){}{}({:.6} , {:.6}){} 距离真实位置: {:.6}",
        BOLD_RED,
        truth.x,
        truth.y,
        RESET,
        BOLD_TURQUOISE,
        result.location.x,
        result.location.y,
        RESET,
        result.distance_to(&truth)
    );
    Ok(())
}
