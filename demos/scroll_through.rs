use std::path::PathBuf;
use std::{error::Error, fs};

use capscene::host::simulated::SimulatedHost;
use capscene::host::ViewportSize;
use capscene::renderless::RenderlessRenderer;
use capscene::{SceneConfig, Stage};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrolls a simulated landing page from top to bottom and logs the cap's pose.", long_about = None)]
struct Cli {
	#[arg(long, default_value_t = 1600)]
	width: u32,
	#[arg(long, default_value_t = 1000)]
	height: u32,
	#[arg(long, default_value_t = 12, help = "Scroll positions between top and bottom")]
	steps: u32,
	#[arg(long, default_value_t = 30, help = "Frames rendered at each scroll position")]
	frames: u32,
	#[arg(help = "Scene configuration JSON")]
	config: Option<PathBuf>,
	#[arg(long, help = "Log every region transition and frame")]
	verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO })
		.init();

	let config = match &cli.config {
		Some(path) => SceneConfig::from_json(&fs::read_to_string(path)?)?,
		None => SceneConfig::default(),
	};

	let host = SimulatedHost::landing_page(ViewportSize::new(cli.width, cli.height));
	let mut stage = Stage::mount(host, config, |_, surface| {
		Ok(RenderlessRenderer::new(surface.size.width, surface.size.height))
	})?;

	let max_scroll = stage.host().max_scroll();
	for step in 0..=cli.steps {
		let y = max_scroll * step as f32 / cli.steps.max(1) as f32;
		if let Some(event) = stage.host_mut().scroll_to(y) {
			stage.handle_event(event)?;
		}
		for _ in 0..cli.frames {
			let Some(frame) = stage.host_mut().next_frame(1000.0 / 60.0) else {
				break;
			};
			stage.handle_event(frame)?;
		}

		let scene = stage.scene();
		let pose = scene.model.transform();
		let drawn = stage
			.renderer()
			.and_then(|r| r.last_frame())
			.map_or(0, |frame| frame.draws.len());
		info!(
			"scroll {:>6.0}: position {:.2} rotation {:.2} scale {:.2}, camera {:.2}, internals {}, {} parts drawn",
			y,
			pose.translation,
			pose.rotation,
			pose.scale.x,
			scene.camera.position,
			if scene.model.internal_system_visible() { "shown" } else { "hidden" },
			drawn
		);
	}

	let resized = ViewportSize::new(cli.width / 2, cli.height / 2);
	if let Some(event) = stage.host_mut().resize_to(resized) {
		stage.handle_event(event)?;
		info!("Resized to {}, camera aspect {:.3}", resized, stage.scene().camera.aspect);
	}

	stage.unmount();
	info!(
		"Unmounted: {} listeners, {} pending frames, {} live surfaces",
		stage.host().listener_count(),
		stage.host().pending_frame_count(),
		stage.host().live_surface_count()
	);
	Ok(())
}
