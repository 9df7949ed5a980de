//! eventbuddy: watches the game window for double reward events.

mod assets;
mod capture;
mod config;
mod poll;
mod report;
mod startup;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ie::EventKind;

use crate::{config::Config, startup::Autostart};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
	/// Config file to use instead of the per-user one.
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Poll the game window and log event changes.
	Watch,
	/// Analyse a saved screenshot and print the report as JSON.
	Inspect {
		screenshot: PathBuf,
		/// Nav item currently selected in the screenshot; reads its counter.
		#[arg(long, value_enum)]
		selected: Option<Selected>,
		/// Write a copy with every sampled region outlined.
		#[arg(long)]
		annotate: Option<PathBuf>,
	},
	/// List capturable windows (to pick `app_name`).
	Windows,
	/// Write the effective config to disk so it can be edited.
	Config,
	/// Query or change launch at login.
	Startup {
		#[arg(value_enum, default_value_t = StartupAction::Status)]
		action: StartupAction,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Selected {
	Calyx,
	Relic,
	Rogue,
}

impl From<Selected> for EventKind {
	fn from(value: Selected) -> Self {
		match value {
			Selected::Calyx => EventKind::Calyx,
			Selected::Relic => EventKind::Relic,
			Selected::Rogue => EventKind::Rogue,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartupAction {
	Status,
	Enable,
	Disable,
}

fn main() -> Result<()> {
	// Structured logging. Use `RUST_LOG=debug` etc.
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let cli = Cli::parse();
	let config = match &cli.config {
		Some(path) => Config::load_from(path)?,
		None => Config::load_or_default(),
	};

	match cli.command {
		Command::Watch => watch(config),
		Command::Inspect {
			screenshot,
			selected,
			annotate,
		} => inspect(config, screenshot, selected.map(EventKind::from), annotate),
		Command::Windows => {
			for window in capture::list_windows()? {
				println!("{}\t{}x{}\t{}", window.app_name, window.width, window.height, window.title);
			}
			Ok(())
		}
		Command::Config => {
			let path = match cli.config {
				Some(path) => path,
				None => Config::path()?,
			};
			config.save_to(&path)?;
			println!("{}", path.display());
			Ok(())
		}
		Command::Startup { action } => {
			let entry = startup::EntryFile::for_current_exe()?;
			match action {
				StartupAction::Status => {}
				StartupAction::Enable => entry.set_enabled(true)?,
				StartupAction::Disable => entry.set_enabled(false)?,
			}
			println!(
				"launch at login: {} ({})",
				if entry.get_enabled()? { "enabled" } else { "disabled" },
				entry.path().display()
			);
			Ok(())
		}
	}
}

fn load_ie(config: &Config) -> Result<ie::Ie> {
	let models = assets::resolve_ocr_assets(config.ocr_dir.as_deref(), &config.ocr_lang)?;
	tracing::debug!(?models, "loading OCR models");
	ie::Ie::try_new(
		config.layout.clone(),
		&models.detection,
		&models.recognition,
		&models.charset,
		config.ocr,
	)
}

fn watch(config: Config) -> Result<()> {
	let ie = Arc::new(load_ie(&config)?);
	let app_name = config.app_name.clone();
	let height = config.reference_height;
	tracing::info!(%app_name, poll_delay_s = config.poll_delay_s, "watching");

	let reports = poll::spawn(
		ie,
		Duration::from_secs_f32(config.poll_delay_s.max(0.1)),
		move || capture::capture(&app_name, height),
	);

	let mut last = None;
	for report in reports {
		if last.as_ref() != Some(&report) {
			tracing::info!(
				pinned = report.pinned_character,
				calyx = report.calyx,
				relic = report.relic,
				rogue = report.rogue,
				combat_remain = ?report.combat.remain(),
				"events changed"
			);
			last = Some(report);
		}
	}
	Ok(())
}

fn inspect(
	config: Config,
	screenshot: PathBuf,
	selected: Option<EventKind>,
	annotate: Option<PathBuf>,
) -> Result<()> {
	let ie = load_ie(&config)?;
	let image = ie::OwnedImage::open(&screenshot)?.resized_h(config.reference_height)?;

	let report = report::analyze(&ie, image.as_image(), selected)?;
	println!("{}", serde_json::to_string_pretty(&report).context("serialize report")?);

	if let Some(path) = annotate {
		image
			.as_image()
			.save_annotated(&path, &report::sampled_regions(&ie, &report))
			.with_context(|| format!("annotate {:?}", path))?;
	}
	Ok(())
}
