use chrono::{Duration, NaiveDate};

use enum_map::{Enum, EnumMap};

use serde::{Deserialize, Serialize};

use super::series::{SpatialUnitSeries, WeeklyObservation};


/// Breeding-suitability conditions evaluated per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Condition {
	MaxTemp,
	MinTemp,
	Humidity,
	Rainfall,
	/// `(MaxTemp AND MinTemp) OR Humidity`, i.e. `meets_threshold`
	Combined,
}


/// Bounds for the per-week conditions. All bounds are inclusive.
///
/// The dashboard pages disagree on humidity and rainfall bounds, so both
/// variants are available as presets and every field can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
	pub max_temp_c: f64,
	pub min_temp_c: f64,
	pub humidity_min: f64,
	/// `None` leaves humidity without an upper bound.
	pub humidity_max: Option<f64>,
	pub rain_min_mm: f64,
	pub rain_max_mm: f64,
}

impl ThresholdConfig {
	/// Bounds used by the block-level breeding condition pages.
	pub fn breeding() -> Self {
		Self{
			max_temp_c: 35.0,
			min_temp_c: 18.0,
			humidity_min: 60.0,
			humidity_max: Some(80.0),
			rain_min_mm: 0.5,
			rain_max_mm: 150.0,
		}
	}

	/// Bounds quoted on the dashboard landing page.
	pub fn summary() -> Self {
		Self{
			humidity_max: None,
			rain_min_mm: 7.0,
			rain_max_mm: 350.0,
			..Self::breeding()
		}
	}

	pub fn max_temp_ok(&self, v: f64) -> bool {
		v <= self.max_temp_c
	}

	pub fn min_temp_ok(&self, v: f64) -> bool {
		v >= self.min_temp_c
	}

	pub fn humidity_ok(&self, v: f64) -> bool {
		v >= self.humidity_min && self.humidity_max.map(|max| v <= max).unwrap_or(true)
	}

	pub fn rainfall_ok(&self, v: f64) -> bool {
		v >= self.rain_min_mm && v <= self.rain_max_mm
	}

	pub fn evaluate(&self, obs: &WeeklyObservation) -> WeekFlags {
		let mut flags: EnumMap<Condition, bool> = EnumMap::default();
		flags[Condition::MaxTemp] = self.max_temp_ok(obs.temperature_2m_max);
		flags[Condition::MinTemp] = self.min_temp_ok(obs.temperature_2m_min);
		flags[Condition::Humidity] = self.humidity_ok(obs.relative_humidity_2m_mean);
		flags[Condition::Rainfall] = self.rainfall_ok(obs.rain_sum);
		flags[Condition::Combined] = (flags[Condition::MaxTemp] && flags[Condition::MinTemp]) || flags[Condition::Humidity];
		WeekFlags(flags)
	}

	pub fn evaluate_series(&self, series: &SpatialUnitSeries) -> Vec<WeekFlags> {
		series.weeks().iter().map(|w| self.evaluate(w)).collect()
	}
}

impl Default for ThresholdConfig {
	fn default() -> Self {
		Self::breeding()
	}
}


#[derive(Debug, Clone, PartialEq)]
pub struct WeekFlags(EnumMap<Condition, bool>);

impl WeekFlags {
	#[inline(always)]
	pub fn get(&self, c: Condition) -> bool {
		self.0[c]
	}

	pub fn meets_threshold(&self) -> bool {
		self.0[Condition::Combined]
	}
}


/// Shaded chart intervals: runs of 7-day-consecutive weeks where `c` holds,
/// each as (first week start, last week start + 6 days).
pub fn highlight_ranges(series: &SpatialUnitSeries, flags: &[WeekFlags], c: Condition) -> Vec<(NaiveDate, NaiveDate)> {
	assert_eq!(series.len(), flags.len());
	let mut result = Vec::new();
	let mut open: Option<(NaiveDate, NaiveDate)> = None;
	for (i, f) in flags.iter().enumerate() {
		if !f.get(c) {
			continue
		}
		let date = series.date(i);
		open = match open {
			Some((first, last)) if (date - last).num_days() == 7 => Some((first, date)),
			Some(run) => {
				result.push(run);
				Some((date, date))
			},
			None => Some((date, date)),
		};
	}
	if let Some(run) = open {
		result.push(run);
	}
	result.into_iter().map(|(first, last)| (first, last + Duration::days(6))).collect()
}
