//! Launch-at-login registration.
//!
//! Every platform is handled with a per-user entry file that the session
//! manager picks up on login: a `.cmd` launcher in the Windows Startup folder,
//! a LaunchAgent plist on macOS and an XDG autostart `.desktop` file elsewhere.

use std::{
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const APP_NAME: &str = "eventbuddy";

/// Whether the app starts at user login. Both calls are idempotent.
pub trait Autostart {
	fn get_enabled(&self) -> Result<bool>;
	fn set_enabled(&self, enabled: bool) -> Result<()>;
}

/// Autostart entry backed by a single file.
#[derive(Debug, Clone)]
pub struct EntryFile {
	path: PathBuf,
	contents: String,
}

impl EntryFile {
	pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			contents: contents.into(),
		}
	}

	/// Entry that launches the running executable in watch mode.
	pub fn for_current_exe() -> Result<Self> {
		let exe = std::env::current_exe().context("current_exe() unavailable")?;
		Ok(Self::new(platform_entry_path()?, platform_entry(&exe)))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Autostart for EntryFile {
	fn get_enabled(&self) -> Result<bool> {
		Ok(self.path.is_file())
	}

	fn set_enabled(&self, enabled: bool) -> Result<()> {
		if enabled {
			if let Some(parent) = self.path.parent() {
				fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
			}
			fs::write(&self.path, &self.contents).with_context(|| format!("write {:?}", self.path))?;
			tracing::info!(path = %self.path.display(), "autostart enabled");
		} else {
			match fs::remove_file(&self.path) {
				Ok(()) => tracing::info!(path = %self.path.display(), "autostart disabled"),
				Err(err) if err.kind() == ErrorKind::NotFound => {}
				Err(err) => return Err(err).with_context(|| format!("remove {:?}", self.path)),
			}
		}
		Ok(())
	}
}

#[cfg(windows)]
fn platform_entry_path() -> Result<PathBuf> {
	let roaming = dirs::config_dir().context("config_dir() unavailable")?;
	Ok(roaming
		.join("Microsoft")
		.join("Windows")
		.join("Start Menu")
		.join("Programs")
		.join("Startup")
		.join(format!("{APP_NAME}.cmd")))
}

#[cfg(windows)]
fn platform_entry(exe: &Path) -> String {
	format!("@echo off\r\nstart \"\" \"{}\" watch\r\n", exe.display())
}

#[cfg(target_os = "macos")]
fn platform_entry_path() -> Result<PathBuf> {
	let home = dirs::home_dir().context("home_dir() unavailable")?;
	Ok(home.join("Library").join("LaunchAgents").join(format!("{APP_NAME}.plist")))
}

#[cfg(target_os = "macos")]
fn platform_entry(exe: &Path) -> String {
	format!(
		r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Label</key>
	<string>{APP_NAME}</string>
	<key>ProgramArguments</key>
	<array>
		<string>{}</string>
		<string>watch</string>
	</array>
	<key>RunAtLoad</key>
	<true/>
</dict>
</plist>
"#,
		exe.display()
	)
}

#[cfg(not(any(windows, target_os = "macos")))]
fn platform_entry_path() -> Result<PathBuf> {
	let config = dirs::config_dir().context("config_dir() unavailable")?;
	Ok(config.join("autostart").join(format!("{APP_NAME}.desktop")))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn platform_entry(exe: &Path) -> String {
	format!(
		"[Desktop Entry]\nType=Application\nName={APP_NAME}\nExec=\"{}\" watch\nX-GNOME-Autostart-enabled=true\n",
		exe.display()
	)
}
