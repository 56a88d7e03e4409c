/*! Opportunistic per-file job ownership.

A unit of work (one output file) is owned through a `<path>.running` stamp
containing the worker's hostname and marked finished by renaming it to
`<path>.done`. This is not distributed consensus: stale stamps are safe to
remove manually and re-running any unit is idempotent.
!*/
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::Once;

use lazy_static::lazy_static;
use log::{info, warn};

lazy_static! {
    /// stamps removed by the interrupt handler
    static ref LIVE_STAMPS: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
}

static INSTALL_HANDLER: Once = Once::new();

/// Hostname of this worker, for stamp contents and working-file suffixes.
pub fn host() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown-host".to_string())
}

fn stamp_path(output: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", output.display(), suffix))
}

/// Trap interrupt/terminate once per process; on delivery, drop all live
/// `.running` stamps and exit. Working files stay behind for inspection.
fn install_interrupt_handler() {
    INSTALL_HANDLER.call_once(|| {
        let result = ctrlc::set_handler(|| {
            let stamps = LIVE_STAMPS.lock().expect("stamp registry poisoned");
            for stamp in stamps.iter() {
                if let Err(e) = std::fs::remove_file(stamp) {
                    eprintln!("could not remove stamp {stamp:?}: {e}");
                }
            }
            std::process::exit(1);
        });
        if let Err(e) = result {
            warn!("could not install interrupt handler: {e}");
        }
    });
}

/// Ownership of one unit of work.
///
/// Dropping an incomplete claim removes the `.running` stamp so a crash in
/// this process does not poison the unit for other workers.
pub struct UnitClaim {
    running: PathBuf,
    completed: bool,
}

impl UnitClaim {
    /// Try to claim the unit producing `output`.
    ///
    /// Returns `Ok(None)` when the unit is already done or owned elsewhere.
    pub fn claim(output: &Path) -> Result<Option<UnitClaim>, std::io::Error> {
        let done = stamp_path(output, "done");
        let running = stamp_path(output, "running");

        if done.exists() {
            info!("{output:?}: already done, skipping");
            return Ok(None);
        }
        if running.exists() {
            warn!("{output:?}: owned by another worker, skipping");
            return Ok(None);
        }

        install_interrupt_handler();

        // create_new keeps the claim atomic when two workers race
        match OpenOptions::new().write(true).create_new(true).open(&running) {
            Ok(mut file) => {
                writeln!(file, "{}", host())?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                warn!("{output:?}: lost claim race, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        LIVE_STAMPS
            .lock()
            .expect("stamp registry poisoned")
            .push(running.clone());

        Ok(Some(UnitClaim {
            running,
            completed: false,
        }))
    }

    /// Flip `.running` to `.done` after the output has been renamed into
    /// place.
    pub fn complete(mut self) -> Result<(), std::io::Error> {
        let done = self
            .running
            .with_extension("done");
        std::fs::rename(&self.running, done)?;
        self.completed = true;
        Self::unregister(&self.running);
        Ok(())
    }

    fn unregister(path: &Path) {
        let mut stamps = LIVE_STAMPS.lock().expect("stamp registry poisoned");
        stamps.retain(|p| p != path);
    }
}

impl Drop for UnitClaim {
    fn drop(&mut self) {
        if !self.completed {
            if let Err(e) = std::fs::remove_file(&self.running) {
                warn!("could not release claim {:?}: {e}", self.running);
            }
            Self::unregister(&self.running);
        }
    }
}

/// 1-minute load average, if the platform exposes it.
pub fn load_average() -> Option<f64> {
    let content = std::fs::read_to_string("/proc/loadavg").ok()?;
    content.split_whitespace().next()?.parse().ok()
}

/// Block until the 1-minute load average drops below `max_load`.
///
/// Platforms without /proc never block.
pub fn wait_below_load(max_load: f64) {
    while let Some(load) = load_average() {
        if load < max_load {
            break;
        }
        info!("load {load:.2} >= {max_load:.2}, waiting");
        std::thread::sleep(std::time::Duration::from_secs(30));
    }
}
