use std::{fs::File, io, path::Path};

use symphonia::core::{
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error as SymphError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use super::{Summarize, regular_file_size, size_kb};
use crate::{
    error::ProbeError,
    summary::{SummaryRow, round_to},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub duration_seconds: f64,
    /// Native rate reported by the decoder, never resampled.
    pub sample_rate: u32,
    /// Decoded frames per channel.
    pub sample_count: u64,
    pub channels: u16,
    pub size_bytes: u64,
}

impl AudioInfo {
    pub fn size_kb(&self) -> f64 {
        size_kb(self.size_bytes)
    }
}

impl Summarize for AudioInfo {
    fn summarize(&self, row: &mut SummaryRow) {
        row.insert("duration_seconds", round_to(self.duration_seconds, 3));
        row.insert("sample_rate", self.sample_rate);
        row.insert("channels", self.channels);
        row.insert("size_kb", round_to(self.size_kb(), 2));
    }
}

pub(super) fn analyze(path: &Path) -> Result<AudioInfo, ProbeError> {
    let size_bytes = regular_file_size(path)?;

    let file = File::open(path).map_err(|e| ProbeError::io(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| ProbeError::decode(path, format!("unrecognised audio format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProbeError::decode(path, "no decodable audio track"))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| ProbeError::decode(path, format!("no decoder for codec: {e}")))?;

    let mut sample_rate = params.sample_rate;
    let mut channels = params.channels.map(|c| c.count() as u16);
    let mut sample_count = 0u64;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphError::ResetRequired) => break,
            Err(e) => return Err(ProbeError::decode(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(buf) => {
                let spec = *buf.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count() as u16);
                sample_count += buf.frames() as u64;
            }
            // Damaged packets are skipped; the rest of the stream is still counted.
            Err(SymphError::DecodeError(e)) => debug!(error = e, "skipping undecodable packet"),
            Err(e) => return Err(ProbeError::decode(path, e)),
        }
    }

    let sample_rate = sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| ProbeError::decode(path, "unknown sample rate"))?;

    Ok(AudioInfo {
        duration_seconds: sample_count as f64 / f64::from(sample_rate),
        sample_rate,
        sample_count,
        channels: channels.unwrap_or(0),
        size_bytes,
    })
}
