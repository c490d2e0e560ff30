use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use super::analysis::AnalysisConfig;
use super::error::{Error, Result};


/// Read an [`AnalysisConfig`] from a TOML file. Missing keys keep their
/// defaults.
///
/// ```toml
/// [thresholds]
/// humidity_max = 90.0
///
/// [trigger]
/// rise_weeks = 3
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig> {
	let text = fs::read_to_string(path)?;
	parse(&text)
}

pub fn parse(text: &str) -> Result<AnalysisConfig> {
	let config: AnalysisConfig = toml::from_str(text)?;
	check(config)
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
	match env::var(name) {
		Ok(v) => match v.trim().parse::<T>() {
			Ok(v) => Ok(Some(v)),
			Err(_) => Err(Error::Config(format!("{}={:?} is not a valid value", name, v))),
		},
		Err(env::VarError::NotPresent) => Ok(None),
		Err(e) => Err(Error::Config(format!("{}: {}", name, e))),
	}
}

/// Defaults, or the file named by `DENGUE_CONFIG`, with `DENGUE_*`
/// overrides applied on top.
pub fn from_env() -> Result<AnalysisConfig> {
	let mut config = match env::var_os("DENGUE_CONFIG") {
		Some(path) => {
			debug!("loading configuration from {:?}", path);
			load(path)?
		},
		None => AnalysisConfig::default(),
	};

	let t = &mut config.thresholds;
	if let Some(v) = env_value("DENGUE_MAX_TEMP_C")? {
		t.max_temp_c = v;
	}
	if let Some(v) = env_value("DENGUE_MIN_TEMP_C")? {
		t.min_temp_c = v;
	}
	if let Some(v) = env_value("DENGUE_HUMIDITY_MIN")? {
		t.humidity_min = v;
	}
	if let Some(v) = env_value::<String>("DENGUE_HUMIDITY_MAX")? {
		// "none" lifts the upper bound
		t.humidity_max = if v.eq_ignore_ascii_case("none") {
			None
		} else {
			Some(v.parse::<f64>().map_err(|_| Error::Config(format!("DENGUE_HUMIDITY_MAX={:?} is not a valid value", v)))?)
		};
	}
	if let Some(v) = env_value("DENGUE_RAIN_MIN_MM")? {
		t.rain_min_mm = v;
	}
	if let Some(v) = env_value("DENGUE_RAIN_MAX_MM")? {
		t.rain_max_mm = v;
	}
	if let Some(v) = env_value("DENGUE_RISE_STEP")? {
		config.trigger.rise_step = v;
	}
	if let Some(v) = env_value("DENGUE_RISE_WEEKS")? {
		config.trigger.rise_weeks = v;
	}
	check(config)
}

fn check(config: AnalysisConfig) -> Result<AnalysisConfig> {
	let t = &config.thresholds;
	if t.humidity_max.map(|max| max < t.humidity_min).unwrap_or(false) {
		return Err(Error::Config("humidity_max is below humidity_min".into()))
	}
	if t.rain_max_mm < t.rain_min_mm {
		return Err(Error::Config("rain_max_mm is below rain_min_mm".into()))
	}
	if config.trigger.rise_weeks == 0 {
		return Err(Error::Config("rise_weeks must be at least 1".into()))
	}
	Ok(config)
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::threshold::ThresholdConfig;

	#[test]
	fn empty_file_gives_defaults() {
		assert_eq!(parse("").unwrap(), AnalysisConfig::default());
	}

	#[test]
	fn partial_override() {
		let cfg = parse("[thresholds]\nrain_min_mm = 7.0\nrain_max_mm = 350.0\n\n[trigger]\nrise_weeks = 3\n").unwrap();
		assert_eq!(cfg.thresholds.rain_min_mm, 7.0);
		assert_eq!(cfg.thresholds.rain_max_mm, 350.0);
		assert_eq!(cfg.thresholds.max_temp_c, ThresholdConfig::breeding().max_temp_c);
		assert_eq!(cfg.trigger.rise_weeks, 3);
		assert_eq!(cfg.trigger.rise_step, 10);
	}

	#[test]
	fn rejects_inverted_bounds() {
		assert!(matches!(parse("[thresholds]\nrain_min_mm = 20.0\nrain_max_mm = 10.0\n"), Err(Error::Config(_))));
		assert!(matches!(parse("[trigger]\nrise_weeks = 0\n"), Err(Error::Config(_))));
		assert!(matches!(parse("[thresholds]\nmax_temp_c = \"hot\"\n"), Err(Error::Config(_))));
	}

	const VARS: &[&str] = &[
		"DENGUE_CONFIG",
		"DENGUE_MAX_TEMP_C",
		"DENGUE_MIN_TEMP_C",
		"DENGUE_HUMIDITY_MIN",
		"DENGUE_HUMIDITY_MAX",
		"DENGUE_RAIN_MIN_MM",
		"DENGUE_RAIN_MAX_MM",
		"DENGUE_RISE_STEP",
		"DENGUE_RISE_WEEKS",
	];

	// All environment handling lives in this one test; the process
	// environment is shared between test threads.
	#[test]
	fn environment_overrides() {
		for name in VARS {
			env::remove_var(name);
		}
		assert_eq!(from_env().unwrap(), AnalysisConfig::default());

		let path = env::temp_dir().join(format!("dengue-config-{}.toml", std::process::id()));
		fs::write(&path, "[thresholds]\nrain_min_mm = 7.0\n\n[trigger]\nrise_weeks = 3\n").unwrap();
		env::set_var("DENGUE_CONFIG", &path);
		env::set_var("DENGUE_MAX_TEMP_C", "36.5");
		env::set_var("DENGUE_HUMIDITY_MAX", "none");
		env::set_var("DENGUE_RISE_STEP", " 5 ");
		let cfg = from_env();

		env::set_var("DENGUE_RISE_WEEKS", "x");
		let bad_weeks = from_env();
		env::remove_var("DENGUE_RISE_WEEKS");

		env::set_var("DENGUE_HUMIDITY_MAX", "lots");
		let bad_humidity = from_env();

		env::set_var("DENGUE_HUMIDITY_MAX", "50");
		let inverted = from_env();

		for name in VARS {
			env::remove_var(name);
		}
		let _ = fs::remove_file(&path);

		let cfg = cfg.unwrap();
		assert_eq!(cfg.thresholds.rain_min_mm, 7.0);
		assert_eq!(cfg.thresholds.rain_max_mm, 150.0);
		assert_eq!(cfg.thresholds.max_temp_c, 36.5);
		assert_eq!(cfg.thresholds.min_temp_c, 18.0);
		assert_eq!(cfg.thresholds.humidity_max, None);
		assert_eq!(cfg.trigger.rise_weeks, 3);
		assert_eq!(cfg.trigger.rise_step, 5);

		assert!(matches!(bad_weeks, Err(Error::Config(_))));
		assert!(matches!(bad_humidity, Err(Error::Config(_))));
		assert!(matches!(inverted, Err(Error::Config(_))));
	}
}
