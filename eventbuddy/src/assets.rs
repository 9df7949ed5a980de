use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrAssets {
	pub detection: PathBuf,
	pub recognition: PathBuf,
	pub charset: PathBuf,
}

impl OcrAssets {
	fn in_dir(dir: &Path, lang_code: &str) -> Self {
		Self {
			detection: dir.join("detection.mnn"),
			recognition: dir.join(format!("{lang_code}_recognition.mnn")),
			charset: dir.join(format!("{lang_code}_charset.txt")),
		}
	}

	fn is_complete(&self) -> bool {
		self.detection.is_file() && self.recognition.is_file() && self.charset.is_file()
	}
}

fn normalize_ocr_dir(dir: PathBuf) -> PathBuf {
	// Accept either the app root (containing `ocr/`) or the `ocr/` folder itself.
	if dir.join("detection.mnn").is_file() {
		dir
	} else {
		dir.join("ocr")
	}
}

/// Resolve OCR model paths.
///
/// Search order: the configured directory, `EVENTBUDDY_ASSETS_DIR`, the
/// executable's directory, the working directory, then the user data dir.
pub fn resolve_ocr_assets(configured: Option<&Path>, lang_code: &str) -> Result<OcrAssets> {
	let mut candidates: Vec<PathBuf> = Vec::new();
	if let Some(dir) = configured {
		candidates.push(dir.to_path_buf());
	}
	if let Some(dir) = std::env::var_os("EVENTBUDDY_ASSETS_DIR") {
		candidates.push(PathBuf::from(dir));
	}
	if let Ok(exe) = std::env::current_exe()
		&& let Some(dir) = exe.parent()
	{
		candidates.push(dir.to_path_buf());
	}
	if let Ok(cwd) = std::env::current_dir() {
		candidates.push(cwd);
	}
	if let Some(dir) = dirs::data_dir() {
		candidates.push(dir.join("eventbuddy"));
	}

	find_in(candidates, lang_code)
}

fn find_in(candidates: Vec<PathBuf>, lang_code: &str) -> Result<OcrAssets> {
	let mut tried = Vec::new();
	for base in candidates {
		let ocr_dir = normalize_ocr_dir(base);
		let assets = OcrAssets::in_dir(&ocr_dir, lang_code);
		if assets.is_complete() {
			return Ok(assets);
		}
		tried.push(ocr_dir);
	}

	bail!(
		"OCR model files not found. Expected ocr/detection.mnn, ocr/{lang_code}_recognition.mnn and ocr/{lang_code}_charset.txt.\n\nSearched in:\n{}\n\nFix: set `ocr_dir` in the config or EVENTBUDDY_ASSETS_DIR to the folder that contains them.",
		tried
			.into_iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n")
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn touch(dir: &Path, names: &[&str]) {
		std::fs::create_dir_all(dir).unwrap();
		for name in names {
			std::fs::write(dir.join(name), b"").unwrap();
		}
	}

	#[test]
	fn finds_models_in_ocr_subfolder() {
		let root = tempfile::tempdir().unwrap();
		let ocr = root.path().join("ocr");
		touch(&ocr, &["detection.mnn", "en_recognition.mnn", "en_charset.txt"]);

		let assets = find_in(vec![root.path().to_path_buf()], "en").unwrap();
		assert_eq!(assets.recognition, ocr.join("en_recognition.mnn"));
	}

	#[test]
	fn skips_incomplete_dirs() {
		let a = tempfile::tempdir().unwrap();
		let b = tempfile::tempdir().unwrap();
		touch(a.path(), &["detection.mnn", "en_recognition.mnn"]);
		touch(b.path(), &["detection.mnn", "en_recognition.mnn", "en_charset.txt"]);

		let assets = find_in(vec![a.path().to_path_buf(), b.path().to_path_buf()], "en").unwrap();
		assert_eq!(assets.detection, b.path().join("detection.mnn"));

		let err = find_in(vec![a.path().to_path_buf()], "en").unwrap_err();
		assert!(err.to_string().contains("en_charset.txt"));
	}
}
