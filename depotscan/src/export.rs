//! Output formats for a finished scan.

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
	/// Every recognized item with its capture rectangle, plus the resume cursor.
	Json,
	/// Depot import format of the penguin-stats / ArkPlanner planner.
	Arkplanner,
}

#[derive(Serialize)]
struct Full<'a> {
	items: &'a ie::AnalysisResult,
	next_begin: usize,
}

#[derive(Serialize)]
struct Planner<'a> {
	#[serde(rename = "@type")]
	kind: &'static str,
	items: Vec<PlannerItem<'a>>,
}

#[derive(Serialize)]
struct PlannerItem<'a> {
	id: &'a str,
	name: &'a str,
	have: u64,
}

pub fn render(format: Format, analysis: &ie::DepotAnalysis) -> Result<String> {
	let json = match format {
		Format::Json => serde_json::to_string_pretty(&Full {
			items: &analysis.items,
			next_begin: analysis.next_begin,
		}),
		Format::Arkplanner => serde_json::to_string(&Planner {
			kind: "@penguin-statistics/depot",
			items: analysis
				.items
				.values()
				.map(|info| PlannerItem {
					id: &info.item_id,
					name: &info.item_name,
					have: info.quantity,
				})
				.collect(),
		}),
	};
	json.context("serialize scan result")
}
