mod image;
pub use self::image::*;
mod rect;
pub use rect::*;
mod ocr;
pub use ocr::*;
mod template;
pub use template::*;
mod debug;
pub use debug::*;

pub mod screen;

pub use screen::depot::{AnalysisResult, AnalyzeError, DepotAnalysis, DepotAnalyzer, DepotConfig, ItemCatalog, ItemInfo};

/// Image engine: the depot configuration together with its loaded
/// templates and OCR models.
pub struct Ie {
	config: DepotConfig,
	templates: TemplateSet,
	ocr: Ocr,
}

impl Ie {
	pub fn try_new(
		config: DepotConfig,
		templates_dir: impl AsRef<std::path::Path>,
		ocr_detection: impl AsRef<std::path::Path>,
		ocr_recognition: impl AsRef<std::path::Path>,
		ocr_charsset: impl AsRef<std::path::Path>,
	) -> anyhow::Result<Self> {
		Ok(Self {
			templates: TemplateSet::load_dir(templates_dir, config.match_threshold)?,
			ocr: Ocr::try_new(ocr_detection, ocr_recognition, ocr_charsset)?,
			config,
		})
	}

	pub fn config(&self) -> &DepotConfig {
		&self.config
	}

	/// Report catalog items that have no template. Returns how many are missing.
	pub fn check_catalog(&self, catalog: &dyn ItemCatalog) -> usize {
		if self.templates.is_empty() {
			tracing::warn!("no item templates loaded; nothing can be matched");
		}
		let missing = self.templates.missing(catalog);
		tracing::info!(templates = self.templates.len(), catalog = catalog.len(), "item templates");
		if !missing.is_empty() {
			tracing::warn!(
				count = missing.len(),
				first = ?&missing[..missing.len().min(5)],
				"catalog items without a template are skipped"
			);
		}
		missing.len()
	}

	/// Analyzer over `catalog` using this engine's templates and OCR.
	pub fn depot_analyzer<'a>(&'a self, catalog: &'a dyn ItemCatalog) -> DepotAnalyzer<'a> {
		DepotAnalyzer::new(&self.config, catalog, &self.templates, &self.ocr)
	}

	/// One-shot depot analysis without diagnostics.
	pub fn depot_analyze(&self, image: Image, catalog: &dyn ItemCatalog, begin: usize) -> Result<DepotAnalysis, AnalyzeError> {
		self.depot_analyzer(catalog).analyze(image, begin)
	}
}
