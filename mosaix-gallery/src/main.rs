//! Headless demo gallery.
//!
//! Generates a seeded mock photo library, feeds it through the grid engine
//! against a simulated rendering environment, runs a scripted scroll
//! session, and reports what the engine did.

mod sim;
mod store;

use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use mosaix_grid::{
    DecorateContext, ElementKind, GridEvent, GridOptions, ImageGrid, SurfaceEvent, TileDecorator,
    fetch_all_items,
};
use mosaix_model::ImageItem;

use sim::SimEnv;
use store::{MockLibrary, PhotoDetails};

#[derive(Debug, Parser)]
#[command(name = "mosaix-gallery", about = "Simulated scroll session over a mock photo library")]
struct Cli {
    /// Number of photos in the mock library.
    #[arg(long, default_value_t = 240)]
    items: usize,

    /// Seed for the mock library generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Container width in px.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in px.
    #[arg(long, default_value_t = 800.0)]
    viewport: f32,

    /// Scroll distance per tick in px.
    #[arg(long, default_value_t = 380.0)]
    scroll_step: f32,

    /// Number of downward scroll ticks before scrolling back up.
    #[arg(long, default_value_t = 24)]
    ticks: usize,

    /// Print the computed layout as JSON and exit.
    #[arg(long)]
    dump_layout: bool,

    /// Simulate a failing datastore to exercise the error path.
    #[arg(long)]
    fail_source: bool,
}

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("mosaix_gallery", LevelFilter::Info)
        .filter_module("mosaix_grid", LevelFilter::Debug)
        .init();
}

/// Adds a capture-date badge overlay to every mounted tile.
struct DateBadgeDecorator;

impl TileDecorator<PhotoDetails> for DateBadgeDecorator {
    fn decorate_mount(&mut self, ctx: &mut DecorateContext<'_>, item: &ImageItem<PhotoDetails>) {
        ctx.add_overlay("date-badge");
        log::trace!(
            "date badge for {} ({})",
            item.id,
            item.extra.taken_at.date_naive()
        );
    }

    fn decorate_unmount(&mut self, ctx: &mut DecorateContext<'_>, _item: &ImageItem<PhotoDetails>) {
        ctx.remove_overlay("date-badge");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }
    let cli = Cli::parse();

    let library = if cli.fail_source {
        MockLibrary::failing()
    } else {
        MockLibrary::generate(cli.items, cli.seed)
    };

    let options = GridOptions::new(|item: &ImageItem<PhotoDetails>, w, h| {
        format!("https://photos.local/{}/w{w}h{h}.jpg", item.id)
    })
    .url_for_thumbnail(|item, w, h| format!("https://photos.local/{}/thumb_w{w}h{h}.jpg", item.id))
    .with_click_events(true)
    .decorator(DateBadgeDecorator);

    let mut grid = ImageGrid::new(options);
    let mut env = SimEnv::new(cli.width, cli.viewport);
    let mut outputs: Vec<GridEvent> = Vec::new();

    outputs.extend(grid.begin_loading());
    outputs.extend(grid.ingest_page(fetch_all_items(&library).await)?);
    outputs.extend(grid.enable(&mut env));
    pump(&mut grid, &mut env, &mut outputs);

    if cli.dump_layout {
        println!("{}", serde_json::to_string_pretty(grid.layout())?);
        grid.disable(&mut env);
        return Ok(());
    }

    log::info!(
        "enabled: {} items, layout height {:.0}px, {} containers live",
        grid.item_count(),
        grid.layout().total_height,
        env.live_count(ElementKind::TileContainer)
    );

    // Scripted session: scroll down, then halfway back up.
    for tick in 0..cli.ticks {
        env.advance(Duration::from_millis(120));
        env.scroll_to((tick + 1) as f32 * cli.scroll_step);
        outputs.extend(grid.handle_event(&mut env, SurfaceEvent::Scrolled));
        pump(&mut grid, &mut env, &mut outputs);
    }
    for tick in 0..cli.ticks / 2 {
        env.advance(Duration::from_millis(120));
        let offset = (cli.ticks - 1 - tick) as f32 * cli.scroll_step;
        env.scroll_to(offset);
        outputs.extend(grid.handle_event(&mut env, SurfaceEvent::Scrolled));
        pump(&mut grid, &mut env, &mut outputs);
    }

    // Click whatever ended up top-most to show the output path.
    if let Some(container) = env.first_live(ElementKind::TileContainer) {
        outputs.extend(grid.handle_event(&mut env, SurfaceEvent::Clicked(container)));
    }

    report(&outputs, &env, &grid);
    log::info!("datastore served {} request(s)", library.requests_served());

    grid.disable(&mut env);
    outputs.extend(grid.clear_image_data(&mut env));
    log::info!(
        "cleared: {} containers live",
        env.live_count(ElementKind::TileContainer)
    );
    Ok(())
}

/// Advance virtual time and feed due timers/asset loads to the grid until
/// the environment goes quiet.
fn pump(grid: &mut ImageGrid<PhotoDetails>, env: &mut SimEnv, outputs: &mut Vec<GridEvent>) {
    for _ in 0..64 {
        let events = env.drain_due();
        if events.is_empty() {
            if !env.has_pending_work() {
                break;
            }
            env.advance(Duration::from_millis(40));
            continue;
        }
        for event in events {
            outputs.extend(grid.handle_event(env, event));
        }
    }
}

fn report(outputs: &[GridEvent], env: &SimEnv, grid: &ImageGrid<PhotoDetails>) {
    let mut total = 0;
    let mut loaded = 0;
    let mut clicks = Vec::new();
    let mut source_failures = 0;
    for event in outputs {
        match event {
            GridEvent::TotalCount(count) => total = *count,
            GridEvent::LoadedCount(count) => loaded = *count,
            GridEvent::ItemClicked(id) => clicks.push(id.clone()),
            GridEvent::SourceFailed(_) => source_failures += 1,
            GridEvent::Loading(_) => {}
        }
    }

    println!("session summary");
    println!("  items:            {total}");
    println!("  loaded (current): {loaded}");
    println!("  layout height:    {:.0}px", grid.layout().total_height);
    println!(
        "  live nodes:       {} containers, {} placeholders, {} full images, {} overlays",
        env.live_count(ElementKind::TileContainer),
        env.live_count(ElementKind::PlaceholderImage),
        env.live_count(ElementKind::FullImage),
        env.live_count(ElementKind::Overlay),
    );
    println!(
        "  churn:            {} created / {} removed nodes, {} sources set, {} cleared",
        env.stats.nodes_created,
        env.stats.nodes_removed,
        env.stats.sources_set,
        env.stats.sources_cleared,
    );
    println!(
        "  loads:            {} delivered, {} markers applied",
        env.stats.loads_delivered, env.stats.marks_applied
    );
    if !clicks.is_empty() {
        println!("  clicked:          {}", clicks[0]);
    }
    if source_failures > 0 {
        println!("  source failures:  {source_failures} (grid kept last valid state)");
    }
}
