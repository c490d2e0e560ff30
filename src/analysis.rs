use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use log::debug;

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::lag::{rainfall_lag, run_lag};
use super::record::{DerivedRow, WeeklyRecord};
use super::selection::{group_by_unit, select, UnitKey};
use super::series::SpatialUnitSeries;
use super::threshold::{Condition, ThresholdConfig, WeekFlags};
use super::trigger::{detect_trigger, TriggerConfig};


#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
	pub thresholds: ThresholdConfig,
	pub trigger: TriggerConfig,
}


/// Trigger week and lags of one spatial unit. Every field is `None` when it
/// does not apply, which is distinct from a lag of zero weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TriggerResult {
	pub trigger_date: Option<NaiveDate>,
	pub lag_max_weeks: Option<u32>,
	pub lag_min_weeks: Option<u32>,
	pub lag_hum_weeks: Option<u32>,
	pub lag_all_weeks: Option<u32>,
	pub lag_rainfall_weeks: Option<u32>,
}

impl TriggerResult {
	/// Lag belonging to a condition. For `Rainfall` this is the lag to the
	/// rainfall peak, not to a run of `rainfall_ok` weeks.
	pub fn lag(&self, c: Condition) -> Option<u32> {
		match c {
			Condition::MaxTemp => self.lag_max_weeks,
			Condition::MinTemp => self.lag_min_weeks,
			Condition::Humidity => self.lag_hum_weeks,
			Condition::Rainfall => self.lag_rainfall_weeks,
			Condition::Combined => self.lag_all_weeks,
		}
	}

	/// Where the second reference line goes: `trigger_date - lag` weeks.
	pub fn onset_date(&self, c: Condition) -> Option<NaiveDate> {
		let trigger = self.trigger_date?;
		let lag = self.lag(c)?;
		Some(trigger - Duration::weeks(lag as i64))
	}
}


pub struct SeriesAnalysis {
	pub flags: Vec<WeekFlags>,
	pub result: TriggerResult,
}


pub fn analyse(series: &SpatialUnitSeries, config: &AnalysisConfig) -> SeriesAnalysis {
	let flags = config.thresholds.evaluate_series(series);
	let trigger = match detect_trigger(series, &config.trigger) {
		Some(i) => i,
		None => {
			debug!("no trigger in series {} .. {}", series.first_date(), series.last_date());
			return SeriesAnalysis{flags, result: TriggerResult::default()}
		},
	};

	let result = TriggerResult{
		trigger_date: Some(series.date(trigger)),
		lag_max_weeks: run_lag(series, &flags, trigger, Condition::MaxTemp),
		lag_min_weeks: run_lag(series, &flags, trigger, Condition::MinTemp),
		lag_hum_weeks: run_lag(series, &flags, trigger, Condition::Humidity),
		lag_all_weeks: run_lag(series, &flags, trigger, Condition::Combined),
		lag_rainfall_weeks: rainfall_lag(series, trigger),
	};
	debug!("trigger at {}: {:?}", series.date(trigger), result);
	SeriesAnalysis{flags, result}
}


/// Analyse the rows matching a (district, block) display-name selection.
/// An empty selection is [`Error::EmptySeries`](crate::Error::EmptySeries).
pub fn analyse_selection(records: &[WeeklyRecord], district_disp: &str, block_disp: &str, config: &AnalysisConfig) -> Result<(SpatialUnitSeries, SeriesAnalysis)> {
	let rows = select(records, district_disp, block_disp);
	let series = SpatialUnitSeries::build(rows.iter().map(|r| r.observation))?;
	let analysis = analyse(&series, config);
	Ok((series, analysis))
}


pub struct UnitAnalysis<'r> {
	pub key: UnitKey,
	pub records: Vec<&'r WeeklyRecord>,
	pub series: SpatialUnitSeries,
	pub analysis: SeriesAnalysis,
}

/// Analyse every spatial unit of a table independently, in key order.
pub fn analyse_table<'r>(records: &'r [WeeklyRecord], config: &AnalysisConfig) -> Result<Vec<UnitAnalysis<'r>>> {
	let mut result = Vec::new();
	for (key, rows) in group_by_unit(records) {
		let series = SpatialUnitSeries::build(rows.iter().map(|r| r.observation))?;
		let analysis = analyse(&series, config);
		result.push(UnitAnalysis{key, records: rows, series, analysis});
	}
	debug!("analysed {} spatial units", result.len());
	Ok(result)
}

/// One row per de-duplicated week of every unit, carrying the unit's
/// derived values.
pub fn derived_rows(units: &[UnitAnalysis]) -> Vec<DerivedRow> {
	let mut result = Vec::new();
	for unit in units {
		// same resolution as the series builder: later rows win
		let mut by_date: BTreeMap<NaiveDate, &WeeklyRecord> = BTreeMap::new();
		for rec in unit.records.iter() {
			by_date.insert(rec.observation.week_start_date, *rec);
		}
		let res = &unit.analysis.result;
		for (w, flags) in unit.series.weeks().iter().zip(unit.analysis.flags.iter()) {
			let rec = by_date[&w.week_start_date];
			result.push(DerivedRow{
				dtname: unit.key.district.clone(),
				sdtname: unit.key.block.clone(),
				dtname_disp: rec.district_disp.clone(),
				sdtname_disp: rec.block_disp.clone(),
				week_start_date: w.week_start_date,
				dengue_cases: w.dengue_cases,
				temperature_2m_max: w.temperature_2m_max,
				temperature_2m_min: w.temperature_2m_min,
				relative_humidity_2m_mean: w.relative_humidity_2m_mean,
				rain_sum: w.rain_sum,
				max_temp_ok: flags.get(Condition::MaxTemp),
				min_temp_ok: flags.get(Condition::MinTemp),
				humidity_ok: flags.get(Condition::Humidity),
				rainfall_ok: flags.get(Condition::Rainfall),
				meets_threshold: flags.meets_threshold(),
				trigger_date: res.trigger_date,
				lag_all_weeks: res.lag_all_weeks,
				lag_max_weeks: res.lag_max_weeks,
				lag_min_weeks: res.lag_min_weeks,
				lag_hum_weeks: res.lag_hum_weeks,
				lag_rainfall_weeks: res.lag_rainfall_weeks,
				pct_blocks_with_cases: rec.pct_blocks_with_cases,
			});
		}
	}
	result
}


/// Chart title annotation for a lag: `"3 weeks"`, `"1 week"`, or `"–"`.
pub fn format_lag(lag: Option<u32>) -> String {
	match lag {
		Some(1) => "1 week".into(),
		Some(n) => format!("{} weeks", n),
		None => "–".into(),
	}
}
