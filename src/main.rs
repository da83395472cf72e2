use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use sera::cli::Cli;
use sera::config::{self, Options};
use sera::demo::{self, Scene};
use sera::{log_error, log_info, logging};

fn main() {
    if let Err(err) = run() {
        log_error!("{:#}", err);
        eprintln!("sera-demo: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration file, then let the command line override it
    let options = config::load_config(cli.config.as_deref())?;
    let options = cli.merge_into_options(options)?;

    logging::init(options.log_level);
    log_info!(
        "Configuration: {}x{} {} scene={} seed={} frames={}",
        options.resolution.width,
        options.resolution.height,
        options.format,
        options.scene,
        options.seed,
        options.frames
    );

    if cli.all {
        let dir = Path::new(&options.output);
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        for scene in Scene::ALL {
            let scene_options = Options {
                scene,
                ..options.clone()
            };
            render_to(&scene_options, &dir.join(format!("{}.png", scene.name())))?;
        }
        return Ok(());
    }

    render_to(&options, Path::new(&options.output))
}

fn render_to(options: &Options, path: &Path) -> Result<()> {
    let buffer = demo::render(options).with_context(|| format!("Failed to render '{}'", options.scene))?;
    demo::save_png(&buffer, path)
}
