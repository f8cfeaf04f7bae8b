use crate::encode::codec::VideoCodec;
use crate::encode::sink::{FrameSink, Recorder, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::backend::FrameRGBA;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Size of the reads performed on `ffmpeg` stdout; each read becomes one chunk.
const CHUNK_BYTES: usize = 64 * 1024;

/// Options for [`FfmpegRecorder`].
#[derive(Clone, Debug)]
pub struct FfmpegRecorderOpts {
    /// Container/codec to produce. Must name an `ffmpeg` encoder.
    pub codec: VideoCodec,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// `ffmpeg` executable to run.
    pub ffmpeg_bin: PathBuf,
}

impl FfmpegRecorderOpts {
    /// Options for `codec` using `ffmpeg` from `PATH`.
    pub fn new(codec: VideoCodec) -> Self {
        Self {
            codec,
            bg_rgba: [0, 0, 0, 255],
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

/// Recorder that spawns the system `ffmpeg`, streams raw frames to its stdin and collects the
/// container bytes it writes to stdout.
///
/// `end` closes stdin and waits for the process to exit, so once it returns every encoded byte has
/// been drained into the chunk list.
pub struct FfmpegRecorder {
    opts: FfmpegRecorderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    chunks: Vec<Vec<u8>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegRecorder {
    /// Create a recorder. Nothing is spawned until `begin`.
    pub fn new(opts: FfmpegRecorderOpts) -> ChocoResult<Self> {
        if opts.codec.ffmpeg_encoder().is_none() {
            return Err(ChocoError::validation(format!(
                "codec '{}' is not encoded through ffmpeg",
                opts.codec
            )));
        }
        Ok(Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            chunks: Vec::new(),
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        })
    }

    /// Check that `ffmpeg` runs and offers the encoder this recorder needs.
    pub fn probe(&self) -> ChocoResult<()> {
        let Some(encoder) = self.opts.codec.ffmpeg_encoder() else {
            return Ok(());
        };
        let listing = list_encoders(&self.opts.ffmpeg_bin)?;
        if !encoder_listed(&listing, encoder) {
            return Err(ChocoError::UnsupportedCodec {
                codec: self.opts.codec.id().to_string(),
                encoder: encoder.to_string(),
            });
        }
        Ok(())
    }

    fn spawn(&self, cfg: &SinkConfig) -> ChocoResult<Child> {
        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: opaque RGBA8, flattened in push_frame.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args(self.opts.codec.ffmpeg_output_args());

        cmd.spawn().map_err(|e| {
            ChocoError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })
    }

    fn kill(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        // Both pipes are closed once the child is reaped, so the drains finish promptly.
        if let Some(handle) = self.stdout_drain.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSink for FfmpegRecorder {
    #[tracing::instrument(level = "debug", skip(self), fields(codec = %self.opts.codec))]
    fn begin(&mut self, cfg: SinkConfig) -> ChocoResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ChocoError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ChocoError::validation(
                "ffmpeg recorder width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ChocoError::validation(
                "ffmpeg recorder width/height must be even (required for yuv420p output)",
            ));
        }
        if self.child.is_some() {
            return Err(ChocoError::capture("ffmpeg recorder already started"));
        }

        self.probe()?;

        let mut child = self.spawn(&cfg)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChocoError::capture("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChocoError::capture("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ChocoError::capture("failed to open ffmpeg stderr (unexpected)"))?;

        let stdout_drain = std::thread::spawn(move || {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            Ok(chunks)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            "ffmpeg recorder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.chunks.clear();
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ChocoError::capture("ffmpeg recorder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ChocoError::capture(
                "ffmpeg recorder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ChocoError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ChocoError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ChocoError::capture("ffmpeg recorder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ChocoError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), fields(codec = %self.opts.codec))]
    fn end(&mut self) -> ChocoResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ChocoError::capture("ffmpeg recorder not started"))?;

        let status = child
            .wait()
            .map_err(|e| ChocoError::capture(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let chunks = match self.stdout_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ChocoError::capture("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| ChocoError::capture(format!("ffmpeg stdout read failed: {e}")))?,
            None => Vec::new(),
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ChocoError::capture("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ChocoError::capture(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ChocoError::capture(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            chunks = chunks.len(),
            bytes = chunks.iter().map(Vec::len).sum::<usize>(),
            "ffmpeg flushed"
        );
        self.chunks.extend(chunks);
        Ok(())
    }
}

impl Recorder for FfmpegRecorder {
    fn codec(&self) -> VideoCodec {
        self.opts.codec
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.chunks)
    }

    /// Kill the encoder without waiting for it to finish pending frames.
    fn abort(&mut self) {
        self.kill();
        self.cfg = None;
        self.chunks.clear();
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        if self.child.is_some() {
            tracing::warn!("ffmpeg recorder dropped before end; killing encoder");
            self.kill();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Output of `ffmpeg -hide_banner -encoders`.
fn list_encoders(ffmpeg_bin: &std::path::Path) -> ChocoResult<String> {
    let out = Command::new(ffmpeg_bin)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            ChocoError::capture(format!(
                "ffmpeg is required for video capture, but '{}' could not be run: {e}",
                ffmpeg_bin.display()
            ))
        })?;
    if !out.status.success() {
        return Err(ChocoError::capture(format!(
            "'{} -encoders' exited with status {}",
            ffmpeg_bin.display(),
            out.status
        )));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Whether an `ffmpeg -encoders` listing contains `encoder`.
///
/// Listing rows look like ` V....D libx264    libx264 H.264 / AVC ...`: a flags column followed by
/// the encoder name.
pub(crate) fn encoder_listed(listing: &str, encoder: &str) -> bool {
    listing.lines().any(|line| {
        let mut cols = line.split_whitespace();
        matches!(
            (cols.next(), cols.next()),
            (Some(flags), Some(name)) if flags.len() == 6 && name == encoder
        )
    })
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
