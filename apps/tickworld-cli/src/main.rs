use clap::{Parser, Subcommand};
use glam::Vec3;
use std::any::Any;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tickworld_kernel::{Entity, Mailbox, SharedView, World, WorldConfig, WorldContext};
use tickworld_tools::{ViewRecorder, WorldInspector};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickworld-cli", about = "CLI driver for tickworld simulations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default world configuration
    Info,
    /// Populate a world with drifting entities and step it
    Run {
        /// World config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Number of entities to spawn up front
        #[arg(short, long, default_value = "8")]
        spawn: usize,
        /// Seconds per tick
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
    },
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    OutOfBounds,
    Expired,
}

/// Moves in a straight line until it leaves the world or its lifetime runs
/// out. On expiry it may split into a smaller drifter before removing itself.
struct Drifter {
    position: Vec3,
    velocity: Vec3,
    ttl: f32,
    splits: u32,
    inbox: Mailbox<Signal>,
}

impl Drifter {
    fn new(position: Vec3, velocity: Vec3, ttl: f32, splits: u32) -> Self {
        Self {
            position,
            velocity,
            ttl,
            splits,
            inbox: Mailbox::new(),
        }
    }
}

impl Entity for Drifter {
    fn on_added_to_world(&mut self, ctx: &mut WorldContext<'_>) {
        tracing::debug!(entity = %ctx.id(), tick = ctx.tick(), "drifter entered");
    }

    fn on_removed_from_world(&mut self, ctx: &mut WorldContext<'_>) {
        tracing::debug!(entity = %ctx.id(), tick = ctx.tick(), "drifter left");
    }

    fn process_events(&mut self, ctx: &mut WorldContext<'_>) {
        let dt = ctx.delta_time();
        self.position += self.velocity * dt;
        self.ttl -= dt;
        if !ctx.bounds().contains(self.position) {
            self.inbox.post(Signal::OutOfBounds);
        }
        if self.ttl <= 0.0 {
            self.inbox.post(Signal::Expired);
        }

        for signal in self.inbox.drain() {
            match signal {
                Signal::OutOfBounds => ctx.remove_self(),
                Signal::Expired => {
                    if self.splits > 0 {
                        ctx.spawn(Drifter::new(
                            self.position,
                            -self.velocity * 0.5,
                            1.0,
                            self.splits - 1,
                        ));
                        self.splits = 0;
                    }
                    ctx.remove_self();
                }
            }
        }
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn populate(world: &mut World, count: usize) {
    let (w, h) = (world.width(), world.height());
    for i in 0..count {
        let t = (i as f32 + 0.5) / count as f32;
        let position = Vec3::new(w * t, h * 0.5, 0.0);
        let angle = t * std::f32::consts::TAU;
        let velocity = Vec3::new(angle.cos(), angle.sin(), 0.0) * (w.min(h) * 0.25);
        world.spawn(Drifter::new(position, velocity, 0.5 + t, (i % 3) as u32));
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = WorldConfig::default();
            println!("tickworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("default world: {}x{}", config.width, config.height);
        }
        Commands::Run {
            config,
            ticks,
            spawn,
            dt,
        } => {
            let config = match config {
                Some(path) => WorldConfig::load(&path)?,
                None => WorldConfig::default(),
            };
            let mut world = World::from_config(&config);
            tracing::info!(width = config.width, height = config.height, "world created");

            let recorder = Rc::new(RefCell::new(ViewRecorder::new()));
            let handle: SharedView = recorder.clone();
            world.attach_view(handle.clone());

            populate(&mut world, spawn);
            let mut departed = 0;
            for _ in 0..ticks {
                world.step(dt);
                departed += world.drain_detached().len();
                println!("{}", WorldInspector::summary(&world));
            }

            for id in WorldInspector::list_entities(&world) {
                if let Some(info) = WorldInspector::inspect_entity(&world, id) {
                    println!("  {info}");
                }
            }

            world.detach_view(&handle);
            departed += world.drain_detached().len();
            let recorder = recorder.borrow();
            println!(
                "Recorder: added={} removed={} balanced={}",
                recorder.added_count(),
                recorder.removed_count(),
                if recorder.is_balanced() { "OK" } else { "MISMATCH" }
            );
            println!("Detached entities handed back: {departed}");
        }
    }

    Ok(())
}
