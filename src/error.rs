use std::fmt;
use std::io;

use smartstring::alias::{String as SmartString};


#[derive(Debug)]
pub enum Error {
	EmptySeries,
	Invalid{
		row: usize,
		field: &'static str,
		value: SmartString,
		reason: &'static str,
	},
	Csv(csv::Error),
	Io(io::Error),
	Fetch(reqwest::Error),
	Config(String),
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::EmptySeries => f.write_str("no data for this selection"),
			Self::Invalid{row, field, value, reason} => write!(f, "row {}: invalid {} {:?}: {}", row, field, value, reason),
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Fetch(e) => fmt::Display::fmt(e, f),
			Self::Config(msg) => write!(f, "invalid configuration: {}", msg),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Csv(e) => Some(e),
			Self::Io(e) => Some(e),
			Self::Fetch(e) => Some(e),
			_ => None,
		}
	}
}

impl From<csv::Error> for Error {
	fn from(err: csv::Error) -> Self {
		Self::Csv(err)
	}
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Self::Fetch(err)
	}
}

impl From<toml::de::Error> for Error {
	fn from(err: toml::de::Error) -> Self {
		Self::Config(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
