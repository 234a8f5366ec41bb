//! depotscan: read item quantities off a depot screenshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod assets;
mod config;
mod export;

use config::Config;
use export::Format;

#[derive(Parser, Debug)]
#[command(name = "depotscan", version, about = "Recognize items and quantities in a depot screenshot")]
struct Args {
	/// Screenshot of the depot screen
	screenshot: PathBuf,

	/// Directory with `item_index.json` and `items/<item_id>.png`
	#[arg(long)]
	resource_dir: Option<PathBuf>,

	/// OCR model language code
	#[arg(long)]
	ocr_lang: Option<String>,

	/// Catalog index to start matching at (`next_begin` of the previous page)
	#[arg(long, default_value_t = 0)]
	begin: usize,

	#[arg(long, value_enum, default_value_t = Format::Json)]
	format: Format,

	/// Write an annotated copy of the working image here
	#[arg(long)]
	debug_dir: Option<PathBuf>,

	/// Persist the effective configuration before scanning
	#[arg(long)]
	save_config: bool,
}

fn main() -> Result<()> {
	// Structured logging. Use `RUST_LOG=debug` etc.
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	run(Args::parse())
}

fn run(args: Args) -> Result<()> {
	let mut config = Config::load_or_default();
	if let Some(dir) = args.resource_dir {
		config.resource_dir = dir;
	}
	if let Some(lang) = args.ocr_lang {
		config.ocr_lang = lang;
	}
	if args.debug_dir.is_some() {
		config.debug_dir = args.debug_dir;
	}
	if args.save_config {
		config.save()?;
	}

	let catalog = data::Catalog::load(config.item_index())?;
	let ocr = assets::resolve_ocr_assets(&config.ocr_lang)?;
	let ie = ie::Ie::try_new(
		config.depot.clone(),
		config.templates_dir(),
		&ocr.detection,
		&ocr.recognition,
		&ocr.charset,
	)
	.context("Initialize image engine")?;
	ie.check_catalog(&catalog);

	let image = ie::OwnedImage::open(&args.screenshot)?;
	tracing::info!(
		path = %args.screenshot.display(),
		width = image.width(),
		height = image.height(),
		working_width = ie.config().working_region.width,
		begin = args.begin,
		"scanning depot"
	);

	let analysis = match &config.debug_dir {
		Some(dir) => {
			let mut annotator = ie::Annotator::new(dir);
			let analysis = ie
				.depot_analyzer(&catalog)
				.with_diagnostics(&mut annotator)
				.analyze(image.as_image(), args.begin);
			if let Some(path) = annotator.written() {
				tracing::info!(path = %path.display(), "wrote debug image");
			}
			analysis
		}
		None => ie.depot_analyze(image.as_image(), &catalog, args.begin),
	}
	.with_context(|| format!("Analyze {}", args.screenshot.display()))?;

	tracing::info!(items = analysis.items.len(), next_begin = analysis.next_begin, "scan complete");
	println!("{}", export::render(args.format, &analysis)?);
	Ok(())
}
