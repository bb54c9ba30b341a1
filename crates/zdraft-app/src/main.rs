//! ZDraft 命令行入口
//!
//! 载入或生成一张图纸，依次执行拾取、填充、块插入与分解，并输出摘要。
//!
//! 用法：`zdraft [--config <path>] [--save <path>] [drawing]`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use zdraft_core::prelude::*;
use zdraft_file::{load_archive, save_archive, AppConfig, DrawingArchive};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    save: Option<PathBuf>,
    drawing: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("`--config` 需要提供配置文件路径")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--save" => {
                let path = args.next().context("`--save` 需要提供输出路径")?;
                parsed.save = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => bail!("未知参数：{other}"),
            other => parsed.drawing = Some(PathBuf::from(other)),
        }
    }
    Ok(parsed)
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// 示例图纸：一个矩形房间、一扇圆窗和一条带关联标注的墙线
fn demo_session(config: EngineConfig) -> Result<(DrawingSession, Vec<EntityId>)> {
    let mut session = DrawingSession::new(config);
    let walls = session
        .document_mut()
        .layers
        .create_layer("WALLS")
        .context("创建图层失败")?;

    let room = session.add_entity(
        Entity::new(Rectangle::new(Point2::origin(), 4000.0, 3000.0)).with_layer(walls),
    );
    let window = session.add_entity(Entity::new(Circle::new(Point2::new(2000.0, 1500.0), 400.0)));
    let wall = session.add_entity(Entity::new(Line::new(
        Point2::new(0.0, 3200.0),
        Point2::new(4000.0, 3200.0),
    )));

    let dimension = session.document_mut().add_dimension(Dimension::new(
        DimensionKind::Aligned,
        Point2::new(0.0, 3200.0),
        Point2::new(4000.0, 3200.0),
        300.0,
    ));
    session.create_associative_relationship(dimension, &[wall], RelationshipType::Linear, None)?;
    session.reconcile()?;

    Ok((session, vec![room, window]))
}

fn open_session(path: &Path, config: EngineConfig) -> Result<(DrawingSession, Vec<EntityId>)> {
    let archive = load_archive(path).with_context(|| format!("无法打开 {}", path.display()))?;
    let (session, metadata) = archive.into_session(config);
    info!(title = %metadata.title, id = %metadata.id, "opened drawing");

    let closed = session
        .document()
        .entities()
        .filter(|e| HatchBoundary::from_shape(&e.shape).is_some())
        .map(|e| e.id)
        .collect();
    Ok((session, closed))
}

fn run(args: Args, config: AppConfig) -> Result<()> {
    let (mut session, hatch_sources) = match &args.drawing {
        Some(path) => open_session(path, config.engine.clone())?,
        None => demo_session(config.engine.clone())?,
    };

    let Some(bounds) = session.document().bounds() else {
        warn!("drawing is empty");
        return Ok(());
    };
    let pick = bounds.min;
    match session.hit_test_at_point(pick, None) {
        Some(hit) => {
            info!(entity = %hit.entity_id, distance = hit.distance, "hit at drawing corner")
        }
        None => info!(x = pick.x, y = pick.y, "nothing under drawing corner"),
    }
    let selected = session.hit_test_in_rect(bounds.min, bounds.max);

    let segments = if hatch_sources.is_empty() {
        Vec::new()
    } else {
        session.hatch_entities(&hatch_sources, "ANSI31", 50.0, 0.0)?
    };

    let door = session.insert_block(
        "DOOR",
        Point2::new(bounds.max.x, bounds.min.y),
        InstanceOptions::default().with_attribute("DOOR_NO", "D101"),
    )?;
    let exploded = session.explode_block_instance(door)?;
    let updates = session.reconcile()?;

    info!(
        entities = session.document().entity_count(),
        dimensions = session.document().dimensions().count(),
        selected = selected.len(),
        hatch_segments = segments.len(),
        exploded = exploded.len(),
        dimension_updates = updates.len(),
        "drawing summary"
    );

    if let Some(path) = &args.save {
        let mut archive = DrawingArchive::from_session(session);
        save_archive(&mut archive, path)
            .with_context(|| format!("无法保存 {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = AppConfig::load(args.config.as_deref()).context("加载配置失败")?;
    init_logging(&config)?;

    info!("Starting ZDraft...");
    run(args, config)
}
