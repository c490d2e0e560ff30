use std::collections::{BTreeMap, BTreeSet};

use smartstring::alias::{String as SmartString};

use super::record::WeeklyRecord;


/// Raw `(dtname, sdtname)` pair identifying a district or block. District
/// level rows carry `All` as block name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
	pub district: SmartString,
	pub block: SmartString,
}


/// High-burden marker carried as a suffix on display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burden {
	Normal,
	/// `"Name (High)"`
	High,
	/// `"Name (High District - N)"`
	HighDistrict(u32),
	/// `"Name (Has High Blocks)"`
	HasHighBlocks,
	/// `"Name (High Block - N)"`
	HighBlock(u32),
}

fn ranked_suffix(name: &str, prefix: &str) -> Option<u32> {
	let start = name.find(prefix)? + prefix.len();
	let rest = &name[start..];
	let end = rest.find(')')?;
	rest[..end].trim().parse::<u32>().ok()
}

impl Burden {
	pub fn of(name: &str) -> Self {
		if let Some(rank) = ranked_suffix(name, "(High District - ") {
			return Self::HighDistrict(rank)
		}
		if let Some(rank) = ranked_suffix(name, "(High Block - ") {
			return Self::HighBlock(rank)
		}
		if name.contains("(Has High Blocks)") {
			return Self::HasHighBlocks
		}
		if name.contains("(High)") {
			return Self::High
		}
		Self::Normal
	}
}

/// Names shown on the top-blocks page.
pub fn is_high_burden(name: &str) -> bool {
	name.contains("High")
}

fn is_all(name: &str) -> bool {
	name.eq_ignore_ascii_case("all")
}

fn sorted_with_all<'x, I, F>(names: I, key: F) -> Vec<SmartString>
	where I: IntoIterator<Item = &'x str>,
	      F: Fn(&str) -> (u8, u32, String)
{
	let unique: BTreeSet<&str> = names.into_iter().filter(|n| !is_all(n)).collect();
	let mut sorted: Vec<&str> = unique.into_iter().collect();
	sorted.sort_by_cached_key(|n| key(*n));
	let mut result: Vec<SmartString> = Vec::with_capacity(sorted.len() + 1);
	result.push("All".into());
	result.extend(sorted.into_iter().map(SmartString::from));
	result
}

/// District selector order: `All`, ranked high districts, districts with
/// high blocks, everything else.
pub fn sorted_districts<'x, I: IntoIterator<Item = &'x str>>(names: I) -> Vec<SmartString> {
	sorted_with_all(names, |n| match Burden::of(n) {
		Burden::HighDistrict(rank) => (0, rank, String::new()),
		Burden::HasHighBlocks => (1, 0, n.to_lowercase()),
		_ => (2, 0, n.to_lowercase()),
	})
}

/// Block selector order: `All`, ranked high blocks, everything else.
pub fn sorted_blocks<'x, I: IntoIterator<Item = &'x str>>(names: I) -> Vec<SmartString> {
	sorted_with_all(names, |n| match Burden::of(n) {
		Burden::HighBlock(rank) => (0, rank, String::new()),
		_ => (1, 0, n.to_lowercase()),
	})
}

pub fn district_options(records: &[WeeklyRecord]) -> Vec<SmartString> {
	sorted_districts(records.iter().map(|r| r.district_disp.as_str()))
}

pub fn block_options(records: &[WeeklyRecord], district_disp: &str) -> Vec<SmartString> {
	sorted_blocks(
		records.iter()
			.filter(|r| r.district_disp.as_str() == district_disp)
			.map(|r| r.block_disp.as_str())
	)
}

/// Rows whose display names match the selection exactly.
pub fn select<'r>(records: &'r [WeeklyRecord], district_disp: &str, block_disp: &str) -> Vec<&'r WeeklyRecord> {
	records.iter()
		.filter(|r| r.district_disp.as_str() == district_disp && r.block_disp.as_str() == block_disp)
		.collect()
}

pub fn group_by_unit(records: &[WeeklyRecord]) -> BTreeMap<UnitKey, Vec<&WeeklyRecord>> {
	let mut result: BTreeMap<UnitKey, Vec<&WeeklyRecord>> = BTreeMap::new();
	for rec in records {
		match result.get_mut(&rec.unit) {
			Some(rows) => rows.push(rec),
			None => {
				result.insert(rec.unit.clone(), vec![rec]);
			},
		}
	}
	result
}
