use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;

const RECORDING_PREFIX: &str = "reaction_";
const VIDEO_SIZE: &str = "1280x720";
const STOP_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not launch recorder: {0}")]
    Spawn(#[from] std::io::Error),
}

fn output_path() -> PathBuf {
    let dir = glib::user_special_dir(glib::UserDirectory::Videos)
        .unwrap_or_else(glib::tmp_dir);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    dir.join(format!("{}{}.webm", RECORDING_PREFIX, millis))
}

/// A running self-recording of the player's reaction. Strictly best-effort:
/// callers treat every failure as "no recording" and carry on.
pub struct CaptureSession {
    child: Child,
    output: PathBuf,
}

impl CaptureSession {
    pub fn start() -> Result<CaptureSession, CaptureError> {
        let output = output_path();
        let child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "v4l2", "-video_size", VIDEO_SIZE, "-i", "/dev/video0"])
            .args(["-f", "pulse", "-i", "default"])
            .arg(&output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::info!("recording to {}", output.display());
        Ok(CaptureSession { child, output })
    }

    /// Stops the recorder, asking ffmpeg to finalize the file first and
    /// killing it if it will not. Returns immediately with the output
    /// path; the wait-and-kill runs on a detached thread so the caller
    /// (the GTK main thread) never blocks on the grace period.
    pub fn stop(mut self) -> PathBuf {
        if let Some(stdin) = self.child.stdin.as_mut() {
            let _ = stdin.write_all(b"q");
        }
        drop(self.child.stdin.take());

        let mut child = self.child;
        let output = self.output.clone();
        std::thread::spawn(move || {
            let deadline = Instant::now() + STOP_GRACE;
            loop {
                match child.try_wait() {
                    Ok(Some(_)) => break,
                    Ok(None) if Instant::now() < deadline => {
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    _ => {
                        let _ = child.kill();
                        let _ = child.wait();
                        break;
                    }
                }
            }
            tracing::info!("recording saved to {}", output.display());
        });
        self.output
    }

    #[cfg(test)]
    pub(super) fn with_child(child: Child, output: PathBuf) -> CaptureSession {
        CaptureSession { child, output }
    }
}
