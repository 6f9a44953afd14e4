use super::capture::CapturedAudio;
use anyhow::{Context, Result};
use base64::Engine;
use std::io::Cursor;

/// Encode a captured clip as a `data:audio/wav;base64,...` URI
///
/// The samples are written as a 16-bit mono WAV into memory and the whole
/// file is base64-encoded into the URI body.
pub fn wav_data_uri(audio: &CapturedAudio) -> Result<String> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());

    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
    for &sample in &audio.samples {
        writer
            .write_sample(sample)
            .context("Failed to write sample to WAV")?;
    }
    writer.finalize().context("Failed to finalize WAV")?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(cursor.into_inner());

    Ok(format!("data:audio/wav;base64,{encoded}"))
}

/// Base64 payload of a data URI (the part after `base64,`), or the whole
/// string when it isn't a data URI
pub fn data_uri_payload(data_uri: &str) -> &str {
    data_uri
        .split_once("base64,")
        .map(|(_, payload)| payload)
        .unwrap_or(data_uri)
}
