//! Geometry and thresholds the depot analyzer consumes.
//!
//! Everything here is in working space: the fixed resolution the item
//! templates were authored at.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Hsv, Rect};

/// Where the analyzer looks and what it expects to find there.
pub trait RegionProvider {
	/// Working region. Its size is the rescale target and every slot must fit inside it.
	fn working_region(&self) -> Rect;

	/// Seed region searched for the anchor item.
	fn anchor_region(&self) -> Rect;

	fn quantity(&self) -> &QuantityConfig;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepotConfig {
	pub working_region: Rect,
	pub anchor_region: Rect,
	/// Minimum template score (`0..=1`) accepted as a match.
	pub match_threshold: f32,
	pub quantity: QuantityConfig,
}

impl Default for DepotConfig {
	/// Starting point for templates authored against a 1280×720 capture.
	fn default() -> Self {
		Self {
			working_region: Rect::new(0, 0, 1280, 720),
			anchor_region: Rect::new(0, 100, 400, 300),
			match_threshold: 0.8,
			quantity: QuantityConfig::default(),
		}
	}
}

impl RegionProvider for DepotConfig {
	fn working_region(&self) -> Rect {
		self.working_region
	}

	fn anchor_region(&self) -> Rect {
		self.anchor_region
	}

	fn quantity(&self) -> &QuantityConfig {
		&self.quantity
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityConfig {
	/// Label region relative to the matched item rectangle (see [`Rect::moved`]).
	pub offset: Rect,
	/// Inclusive HSV bounds of glyph pixels (OpenCV scale, hue `0..180`).
	pub lower: Hsv,
	pub upper: Hsv,
	/// Widest gap (in columns) tolerated between two digits.
	pub max_spacing: u32,
	/// Background brighter than this (HSV value) ends the digit scan.
	pub background_v_upper: u8,
	/// Corrections applied to OCR text before parsing.
	pub ocr_replace: OcrReplace,
}

impl Default for QuantityConfig {
	fn default() -> Self {
		Self {
			offset: Rect::new(0, 52, 72, 22),
			lower: Hsv::new(0, 0, 170),
			upper: Hsv::new(255, 60, 255),
			max_spacing: 12,
			background_v_upper: 100,
			ocr_replace: OcrReplace::default(),
		}
	}
}

impl QuantityConfig {
	/// Gray threshold handed to the OCR: the hue pair of the mask bounds.
	pub fn ocr_threshold(&self) -> std::ops::RangeInclusive<u8> {
		self.lower.h..=self.upper.h
	}
}

/// Ordered `(pattern, replacement)` rules, compiled when the config is loaded.
///
/// Serialized as `[["[Oo]", "0"], ...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct OcrReplace(Vec<(Regex, String)>);

impl OcrReplace {
	pub fn apply(&self, text: &str) -> String {
		let mut out = text.to_string();
		for (re, with) in &self.0 {
			out = re.replace_all(&out, with.as_str()).into_owned();
		}
		out
	}
}

impl Default for OcrReplace {
	fn default() -> Self {
		const RULES: [(&str, &str); 6] = [
			(r"\s|,", ""),
			("[OoDQ]", "0"),
			("[Il|i]", "1"),
			("[Ss]", "5"),
			("[Zz]", "2"),
			("B", "8"),
		];
		Self(
			RULES
				.iter()
				.filter_map(|(re, with)| Some((Regex::new(re).ok()?, with.to_string())))
				.collect(),
		)
	}
}

impl TryFrom<Vec<(String, String)>> for OcrReplace {
	type Error = regex::Error;

	fn try_from(rules: Vec<(String, String)>) -> Result<Self, Self::Error> {
		rules
			.into_iter()
			.map(|(re, with)| Ok((Regex::new(&re)?, with)))
			.collect::<Result<Vec<_>, _>>()
			.map(Self)
	}
}

impl From<OcrReplace> for Vec<(String, String)> {
	fn from(rules: OcrReplace) -> Self {
		rules.0.into_iter().map(|(re, with)| (re.as_str().to_string(), with)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn replace_rules_fix_common_misreads() {
		let rules = OcrReplace::default();
		assert_eq!(rules.apply("1O4"), "104");
		assert_eq!(rules.apply("l,2S0"), "1250");
		assert_eq!(rules.apply("1.5万"), "1.5万");
	}

	#[test]
	fn config_round_trips_through_json() {
		let json = serde_json::to_string(&DepotConfig::default()).unwrap();
		let back: DepotConfig = serde_json::from_str(&json).unwrap();
		assert_eq!(back.working_region, Rect::new(0, 0, 1280, 720));
		assert_eq!(back.quantity.ocr_replace.apply("O"), "0");
	}

	#[test]
	fn invalid_replace_pattern_is_rejected() {
		let err = serde_json::from_str::<OcrReplace>(r#"[["(", "x"]]"#);
		assert!(err.is_err());
	}

	#[test]
	fn partial_config_uses_defaults() {
		let cfg: DepotConfig = serde_json::from_str(r#"{"match_threshold": 0.875}"#).unwrap();
		assert_eq!(cfg.match_threshold, 0.875);
		assert_eq!(cfg.quantity.max_spacing, 12);
	}
}
