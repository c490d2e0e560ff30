use std::fs;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::info;

use flate2;

use super::error::Result;


pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}


/// Download `url` to `path` unless `path` already exists, and return `path`.
///
/// The body goes to a sibling `.part` file first so an interrupted download
/// is never mistaken for a finished one.
pub fn fetch_once<P: AsRef<Path>>(url: &str, path: P) -> Result<PathBuf> {
	let path = path.as_ref();
	if path.exists() {
		return Ok(path.to_path_buf())
	}
	info!("fetching {} to {}", url, path.display());
	let mut resp = reqwest::blocking::get(url)?.error_for_status()?;
	let mut partial = path.as_os_str().to_owned();
	partial.push(".part");
	let partial = PathBuf::from(partial);
	{
		let mut f = fs::File::create(&partial)?;
		resp.copy_to(&mut f)?;
	}
	fs::rename(&partial, path)?;
	Ok(path.to_path_buf())
}

fn cache_name(url: &str) -> &str {
	let trimmed = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
	match trimmed.rsplit('/').next() {
		Some(name) if !name.is_empty() => name,
		_ => "download.csv",
	}
}

/// Open a local path, or fetch an `http(s)://` URL once into the working
/// directory and open the cached copy.
pub fn open_input(arg: &str) -> Result<Box<dyn Read>> {
	if arg.starts_with("http://") || arg.starts_with("https://") {
		let path = fetch_once(arg, cache_name(arg))?;
		return Ok(magic_open(path)?)
	}
	Ok(magic_open(arg)?)
}


#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn cache_name_from_url() {
		assert_eq!(cache_name("https://example.org/data/time_series_dashboard.csv"), "time_series_dashboard.csv");
		assert_eq!(cache_name("https://example.org/data/ts.csv.gz?alt=media"), "ts.csv.gz");
		assert_eq!(cache_name("https://example.org/"), "download.csv");
	}

	#[test]
	fn opens_gzip_transparently() {
		let dir = std::env::temp_dir().join(format!("dengue-ioutil-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		let path = dir.join("weeks.csv.gz");
		{
			let f = fs::File::create(&path).unwrap();
			let mut enc = flate2::write::GzEncoder::new(f, flate2::Compression::default());
			enc.write_all(b"a,b\n1,2\n").unwrap();
			enc.finish().unwrap();
		}
		let mut text = String::new();
		magic_open(&path).unwrap().read_to_string(&mut text).unwrap();
		assert_eq!(text, "a,b\n1,2\n");
		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn fetch_once_keeps_existing_file() {
		let dir = std::env::temp_dir().join(format!("dengue-fetch-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		let path = dir.join("cached.csv");
		fs::write(&path, "cached").unwrap();
		// no request is made, so an unroutable URL is fine
		let got = fetch_once("http://127.0.0.1:9/never", &path).unwrap();
		assert_eq!(got, path);
		assert_eq!(fs::read_to_string(&path).unwrap(), "cached");
		fs::remove_dir_all(&dir).unwrap();
	}
}
