use anyhow::{Context, Result};
use xcap::image::EncodableLayout;

/// A capturable top-level window.
#[derive(Debug, Clone)]
pub struct WindowInfo {
	pub app_name: String,
	pub title: String,
	pub width: u32,
	pub height: u32,
}

pub fn list_windows() -> Result<Vec<WindowInfo>> {
	let windows = xcap::Window::all().context("enumerate windows")?;
	Ok(windows
		.into_iter()
		.filter_map(|window| {
			Some(WindowInfo {
				app_name: window.app_name().ok()?,
				title: window.title().unwrap_or_default(),
				width: window.width().ok()?,
				height: window.height().ok()?,
			})
		})
		.collect())
}

pub fn find_window(app_name: &str) -> Result<Option<xcap::Window>> {
	let windows = xcap::Window::all().context("enumerate windows")?;
	Ok(windows
		.into_iter()
		.find(|window| window.app_name().ok().as_deref() == Some(app_name)))
}

/// Capture the window and scale it to the reference layout height.
///
/// `Ok(None)` when no such window exists or it is minimized.
pub fn capture(app_name: &str, reference_height: u32) -> Result<Option<ie::OwnedImage>> {
	let Some(window) = find_window(app_name)? else {
		return Ok(None);
	};
	if window.is_minimized().unwrap_or(false) {
		return Ok(None);
	}

	let img = window
		.capture_image()
		.with_context(|| format!("capture window {app_name:?}"))?;
	let image = ie::OwnedImage::from_rgba(img.width() as usize, img.as_bytes());
	Ok(Some(image.resized_h(reference_height)?))
}
