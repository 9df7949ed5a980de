use std::{
	sync::{
		Arc,
		mpsc::{self, Receiver},
	},
	time::{Duration, Instant},
};

use anyhow::Result;

use crate::report::{self, Report};

/// Background capture + analysis loop.
///
/// Each poll grabs one frame from `source`, runs every detector on it and
/// sends the report. Capture or analysis errors are logged and the loop moves
/// on to the next poll. The thread exits once the receiver is dropped.
pub fn spawn<F>(ie: Arc<ie::Ie>, delay: Duration, mut source: F) -> Receiver<Report>
where
	F: FnMut() -> Result<Option<ie::OwnedImage>> + Send + 'static,
{
	let (tx, rx) = mpsc::channel();

	std::thread::spawn(move || {
		loop {
			let started = Instant::now();

			match source() {
				Ok(Some(image)) => match report::analyze(&ie, image.as_image(), None) {
					Ok(report) => {
						if tx.send(report).is_err() {
							break;
						}
					}
					Err(err) => tracing::warn!(error = %err, "analysis failed"),
				},
				Ok(None) => tracing::debug!("window not available"),
				Err(err) => tracing::warn!(error = %err, "capture failed"),
			}

			std::thread::sleep(delay.saturating_sub(started.elapsed()));
		}
		tracing::debug!("poller stopped");
	});

	rx
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use ie::{Color, CounterReading, Layout};

	use super::*;
	use crate::report::tests::{FixedRows, frame};

	#[test]
	fn reports_frames_and_survives_capture_errors() {
		let layout = Layout::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let ie = Arc::new(ie::Ie::with_recognizer(layout.clone(), FixedRows(vec!["2/3"], calls)));

		let relic = frame(&[(layout.relic_tag, Color::new(252, 251, 140))]);
		let mut polls = 0;
		let rx = spawn(ie, Duration::from_millis(1), move || {
			polls += 1;
			match polls {
				1 => anyhow::bail!("capture backend hiccup"),
				2 => Ok(None),
				_ => Ok(Some(relic.clone())),
			}
		});

		let report = rx.recv_timeout(Duration::from_secs(10)).unwrap();
		assert!(report.relic);
		assert!(!report.calyx);
		assert_eq!(report.combat, CounterReading::Absent);

		// A second frame arrives too; dropping the receiver then ends the thread.
		assert!(rx.recv_timeout(Duration::from_secs(10)).is_ok());
	}
}
