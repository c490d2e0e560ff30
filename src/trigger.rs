use log::trace;

use serde::{Deserialize, Serialize};

use super::series::SpatialUnitSeries;


/// What counts as a sustained rise: `rise_weeks` consecutive weeks, each at
/// least `rise_step` cases above the week before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
	pub rise_step: u64,
	pub rise_weeks: usize,
}

impl Default for TriggerConfig {
	fn default() -> Self {
		Self{
			rise_step: 10,
			rise_weeks: 4,
		}
	}
}


/// Index of the maximum; the earliest one on ties.
pub fn peak_index(cases: &[u64]) -> Option<usize> {
	let mut best: Option<usize> = None;
	for (i, v) in cases.iter().enumerate() {
		match best {
			Some(b) if cases[b] >= *v => (),
			_ => best = Some(i),
		}
	}
	best
}

/// Start of the strictly increasing stretch that ends at `peak`.
///
/// The scan index moves backwards while the week before it has strictly
/// fewer cases, and stops at the first week where that fails.
pub fn trough_before(cases: &[u64], peak: usize) -> usize {
	let mut i = peak;
	while i > 0 && cases[i - 1] < cases[i] {
		i -= 1;
	}
	i
}

/// First week `j > from` opening a run of `weeks` consecutive increases of
/// at least `step` each.
pub fn sustained_rise(cases: &[u64], from: usize, step: u64, weeks: usize) -> Option<usize> {
	let weeks = weeks.max(1);
	let mut run = 0;
	for j in (from + 1)..cases.len() {
		if cases[j] >= cases[j - 1].saturating_add(step) {
			run += 1;
			if run == weeks {
				return Some(j + 1 - weeks)
			}
		} else {
			run = 0;
		}
	}
	None
}

/// First week with more cases than the week before.
pub fn first_increase(cases: &[u64]) -> Option<usize> {
	(1..cases.len()).find(|&i| cases[i] > cases[i - 1])
}

/// Index of the trigger week, or `None` when the series shows no rise at
/// all (fewer than two weeks, constant or only falling).
pub fn detect_trigger(series: &SpatialUnitSeries, cfg: &TriggerConfig) -> Option<usize> {
	let cases = series.cases();
	if cases.len() < 2 {
		return None
	}
	let peak = peak_index(&cases)?;
	let trough = trough_before(&cases, peak);
	trace!("peak at {} ({} cases), trough at {}", series.date(peak), cases[peak], series.date(trough));

	match sustained_rise(&cases, trough, cfg.rise_step, cfg.rise_weeks) {
		Some(i) => Some(i),
		None => {
			trace!("no sustained rise after {}, falling back to first increase", series.date(trough));
			first_increase(&cases)
		},
	}
}
