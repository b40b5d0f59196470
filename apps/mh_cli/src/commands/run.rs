// apps/mh_cli/src/commands/run.rs

//! 运行命令
//!
//! 按布置构建东西相邻的两个块，标记几何后交换幽灵层，
//! 然后在两个块上并行执行若干次边界处理。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use mh_boundary::{exchange, sweep_blocks, Block};
use mh_foundation::Direction;
use tracing::{info, warn};

use super::load_setup;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 块布置文件路径（JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 边界处理次数
    #[arg(short, long, default_value = "1")]
    pub steps: usize,

    /// 交换的幽灵层数（默认为布置中的幽灵层数）
    #[arg(long)]
    pub layers: Option<usize>,

    /// 假定两块的标志映射相同，不发送字典
    #[arg(long)]
    pub assume_identical: bool,

    /// 打印两个集合的描述
    #[arg(long)]
    pub verbose: bool,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MariHydro 边界处理 ===");

    let setup = load_setup(args.config.as_deref())?;
    let layers = args.layers.unwrap_or(setup.ghost_layers);
    if layers > setup.ghost_layers {
        anyhow::bail!("交换层数 {} 超过幽灵层数 {}", layers, setup.ghost_layers);
    }

    let mut west = Block::from_setup("west", &setup).context("构建西块失败")?;
    let mut east = Block::from_setup("east", &setup).context("构建东块失败")?;
    west.mark_regions(&setup).context("标记西块几何失败")?;
    east.mark_regions(&setup).context("标记东块几何失败")?;
    info!("块尺寸 {:?}, 幽灵层 {}", setup.size, setup.ghost_layers);

    let start = Instant::now();
    let sent = exchange(west.collection(), east.collection_mut(), Direction::E, layers, args.assume_identical)?;
    let received = exchange(east.collection(), west.collection_mut(), Direction::W, layers, args.assume_identical)?;
    info!("幽灵层交换: 东向 {} 字节, 西向 {} 字节", sent, received);

    for block in [&west, &east] {
        if !block.collection().check_consistency(setup.ghost_layers) {
            warn!("集合 '{}' 交换后不一致", block.collection().uid());
        }
    }

    let (west_collection, west_values) = west.into_parts();
    let (east_collection, east_values) = east.into_parts();
    let mut collections = vec![west_collection, east_collection];
    for _ in 0..args.steps {
        sweep_blocks(&mut collections, setup.ghost_layers);
    }
    info!("完成 {} 次边界处理, 耗时 {:.3} ms", args.steps, start.elapsed().as_secs_f64() * 1000.0);

    for (collection, values) in collections.iter().zip([&west_values, &east_values]) {
        let values = values.read();
        let interval = values.outer_interval();
        let (min, max) = interval
            .iter()
            .map(|cell| values.get(cell))
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        println!("{}: 数值范围 [{}, {}]", collection.uid(), min, max);
        if args.verbose {
            println!("{}", collection);
        }
    }

    Ok(())
}
