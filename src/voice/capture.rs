use crate::config::AudioConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// How long to wait for the capture thread to report a working device.
const DEVICE_OPEN_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone access denied: {0}")]
    Denied(String),

    #[error("capture is already active")]
    AlreadyActive,

    #[error("capture is not active")]
    NotActive,
}

/// A finished recording: mono 16-bit samples plus their rate
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Audio capture device
///
/// `start` doubles as the capability check for microphone access: it opens
/// the device and begins buffering, or fails with a recoverable
/// `CaptureError::Denied`. `stop` returns everything buffered since the
/// start. Implementations buffer in memory; a recording is one short clip,
/// not a stream.
pub trait CaptureDevice: Send + Sync {
    /// Open the device and start buffering audio
    fn start(&self) -> Result<(), CaptureError>;

    /// Stop buffering and return the captured clip
    fn stop(&self) -> Result<CapturedAudio, CaptureError>;

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Microphone capture through cpal
///
/// The cpal stream is not `Send`, so it lives on a dedicated thread for the
/// duration of the recording. The thread reports device-open success or
/// failure back through a channel, then parks until `stop` joins it.
pub struct MicrophoneCapture {
    config: AudioConfig,
    samples: Arc<Mutex<Vec<i16>>>,
    captured_rate: Arc<AtomicU32>,
    recording: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MicrophoneCapture {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            samples: Arc::new(Mutex::new(Vec::new())),
            captured_rate: Arc::new(AtomicU32::new(0)),
            recording: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }
}

impl CaptureDevice for MicrophoneCapture {
    fn start(&self) -> Result<(), CaptureError> {
        if self.recording.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyActive);
        }

        self.samples.lock().unwrap().clear();

        let (ready_tx, ready_rx) = mpsc::channel();
        let samples = Arc::clone(&self.samples);
        let captured_rate = Arc::clone(&self.captured_rate);
        let recording = Arc::clone(&self.recording);
        let device_pattern = self.config.device_pattern.clone();
        let sample_rate = self.config.sample_rate;

        let worker = std::thread::spawn(move || {
            run_capture_thread(
                device_pattern,
                sample_rate,
                samples,
                captured_rate,
                recording,
                ready_tx,
            );
        });

        match ready_rx.recv_timeout(DEVICE_OPEN_TIMEOUT) {
            Ok(Ok(())) => {
                let mut handle = self.worker.lock().unwrap();
                *handle = Some(worker);
                Ok(())
            }
            Ok(Err(reason)) => {
                self.recording.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(CaptureError::Denied(reason))
            }
            Err(_) => {
                self.recording.store(false, Ordering::SeqCst);
                Err(CaptureError::Denied("device did not respond".to_string()))
            }
        }
    }

    fn stop(&self) -> Result<CapturedAudio, CaptureError> {
        if !self.recording.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::NotActive);
        }

        {
            let mut handle = self.worker.lock().unwrap();
            if let Some(worker) = handle.take() {
                if worker.join().is_err() {
                    error!("Capture thread panicked");
                }
            }
        }

        let samples = {
            let mut buffered = self.samples.lock().unwrap();
            std::mem::take(&mut *buffered)
        };

        let sample_rate = self.captured_rate.load(Ordering::SeqCst);

        info!(
            "Capture stopped: {} samples at {}Hz",
            samples.len(),
            sample_rate
        );

        Ok(CapturedAudio {
            samples,
            sample_rate,
        })
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// Owns the cpal stream for one recording; parks until `recording` clears
fn run_capture_thread(
    device_pattern: String,
    sample_rate: u32,
    samples: Arc<Mutex<Vec<i16>>>,
    captured_rate: Arc<AtomicU32>,
    recording: Arc<AtomicBool>,
    ready_tx: mpsc::Sender<Result<(), String>>,
) {
    let (device, stream_config, actual_rate, channels) =
        match resolve_device_and_config(&device_pattern, sample_rate) {
            Ok(resolved) => resolved,
            Err(e) => {
                let _ = ready_tx.send(Err(format!("{e:#}")));
                return;
            }
        };

    captured_rate.store(actual_rate, Ordering::SeqCst);

    let samples_cb = Arc::clone(&samples);
    let recording_cb = Arc::clone(&recording);

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if !recording_cb.load(Ordering::Relaxed) {
                return;
            }
            let mono = downmix_to_mono(data, channels);
            let mut buffered = samples_cb.lock().unwrap();
            buffered.extend(mono.iter().map(|&s| f32_to_i16(s)));
        },
        |err| error!("Audio capture error: {}", err),
        None,
    );

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(format!("Failed to build input stream: {e}")));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(format!("Failed to start input stream: {e}")));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    while recording.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    // Stream stops when dropped
}

/// Find an input device matching `pattern` and build a mono `StreamConfig`
/// at the requested sample rate, falling back to the device default when the
/// exact rate isn't supported
fn resolve_device_and_config(
    pattern: &str,
    sample_rate: u32,
) -> anyhow::Result<(Device, StreamConfig, u32, u16)> {
    use anyhow::Context;

    let host = cpal::default_host();
    let pattern = pattern.to_lowercase();

    let device = host
        .input_devices()
        .context("Failed to enumerate input devices")?
        .find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(&pattern))
                .unwrap_or(false)
        })
        .or_else(|| host.default_input_device())
        .context("No input audio device found")?;

    let desired_rate = SampleRate(sample_rate);
    let stream_config: StreamConfig = match device
        .supported_input_configs()
        .context("Cannot query device input configs")?
        .find(|c| {
            c.channels() >= 1
                && c.min_sample_rate() <= desired_rate
                && desired_rate <= c.max_sample_rate()
        }) {
        Some(range) => {
            let mut sc: StreamConfig = range.with_sample_rate(desired_rate).into();
            sc.channels = 1;
            sc
        }
        None => {
            let default = device
                .default_input_config()
                .context("No default input config")?;
            warn!(
                "{}Hz not supported by '{}'; falling back to {}Hz, {}ch",
                sample_rate,
                device.name().unwrap_or_else(|_| "<unknown>".into()),
                default.sample_rate().0,
                default.channels(),
            );
            default.into()
        }
    };

    let actual_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    Ok((device, stream_config, actual_rate, channels))
}

/// Downmix interleaved multi-channel audio to mono by averaging channels
fn downmix_to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    let ch = channels as usize;
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
