//! PCM buffer module.
//!
//! Decodes the bundled WAV file into memory and rescales its samples
//! for volume control.

use crate::error::{Error, Result};
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;

/// Midpoint of unsigned 8-bit PCM.
const U8_MIDPOINT: f64 = 128.0;

/// Sample data, stored in the width it was decoded with.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// 8-bit unsigned, silence at 128.
    U8(Vec<u8>),
    /// 16-bit signed.
    I16(Vec<i16>),
    /// 32-bit signed.
    I32(Vec<i32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(s) => s.len(),
            Samples::I16(s) => s.len(),
            Samples::I32(s) => s.len(),
        }
    }

    /// Bytes per sample.
    pub fn width(&self) -> u16 {
        match self {
            Samples::U8(_) => 1,
            Samples::I16(_) => 2,
            Samples::I32(_) => 4,
        }
    }
}

/// Decoded interleaved PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Samples,
}

impl PcmBuffer {
    /// Loads a WAV file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::AssetMissing(path.to_path_buf()));
        }
        let reader = WavReader::open(path)?;
        Self::decode(reader)
    }

    /// Decodes an already opened WAV stream.
    pub fn decode<R: Read>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int {
            return Err(Error::UnsupportedFormat {
                bits: spec.bits_per_sample,
                format: "float",
            });
        }

        let samples = match spec.bits_per_sample {
            // hound hands out 8-bit samples re-centred on zero
            8 => Samples::U8(
                reader
                    .into_samples::<i8>()
                    .map(|s| s.map(|s| (i16::from(s) + 128) as u8))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            16 => Samples::I16(
                reader
                    .into_samples::<i16>()
                    .collect::<std::result::Result<_, _>>()?,
            ),
            32 => Samples::I32(
                reader
                    .into_samples::<i32>()
                    .collect::<std::result::Result<_, _>>()?,
            ),
            bits => {
                return Err(Error::UnsupportedFormat {
                    bits,
                    format: "integer",
                })
            }
        };

        Ok(Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            samples,
        })
    }

    /// Returns a copy with every sample multiplied by `gain`.
    ///
    /// 8-bit samples are scaled around their midpoint. Results are truncated
    /// toward zero and clamped to the range of the sample width, so gains
    /// above 1.0 saturate instead of wrapping.
    pub fn rescaled(&self, gain: f64) -> Self {
        let samples = match &self.samples {
            Samples::U8(s) => Samples::U8(
                s.iter()
                    .map(|&v| {
                        (U8_MIDPOINT + (f64::from(v) - U8_MIDPOINT) * gain).clamp(0.0, 255.0) as u8
                    })
                    .collect(),
            ),
            Samples::I16(s) => Samples::I16(
                s.iter()
                    .map(|&v| {
                        (f64::from(v) * gain)
                            .trunc()
                            .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
                    })
                    .collect(),
            ),
            Samples::I32(s) => Samples::I32(
                s.iter()
                    .map(|&v| {
                        (f64::from(v) * gain)
                            .trunc()
                            .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
                    })
                    .collect(),
            ),
        };

        Self {
            channels: self.channels,
            sample_rate: self.sample_rate,
            samples,
        }
    }

    /// Samples normalized to [-1.0, 1.0] for the output device.
    pub fn to_f32(&self) -> Vec<f32> {
        match &self.samples {
            Samples::U8(s) => s.iter().map(|&v| (f32::from(v) - 128.0) / 128.0).collect(),
            Samples::I16(s) => s.iter().map(|&v| f32::from(v) / 32_768.0).collect(),
            Samples::I32(s) => s
                .iter()
                .map(|&v| (f64::from(v) / 2_147_483_648.0) as f32)
                .collect(),
        }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback length.
    pub fn duration(&self) -> std::time::Duration {
        if self.sample_rate == 0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn gains() -> impl Iterator<Item = f64> {
        (0..=10).map(|i| f64::from(i) / 10.0)
    }

    fn buffer(samples: Samples) -> PcmBuffer {
        PcmBuffer {
            channels: 1,
            sample_rate: 8_000,
            samples,
        }
    }

    fn fixtures() -> Vec<PcmBuffer> {
        vec![
            buffer(Samples::U8(vec![0, 1, 64, 127, 128, 129, 200, 254, 255])),
            buffer(Samples::I16(vec![
                i16::MIN,
                -20_000,
                -1,
                0,
                1,
                7,
                12_345,
                i16::MAX,
            ])),
            buffer(Samples::I32(vec![
                i32::MIN,
                -1_000_000_000,
                -3,
                0,
                3,
                999_999,
                i32::MAX,
            ])),
        ]
    }

    /// Distance of every sample from silence.
    fn amplitudes(buffer: &PcmBuffer) -> Vec<i64> {
        match &buffer.samples {
            Samples::U8(s) => s.iter().map(|&v| (i64::from(v) - 128).abs()).collect(),
            Samples::I16(s) => s.iter().map(|&v| i64::from(v).abs()).collect(),
            Samples::I32(s) => s.iter().map(|&v| i64::from(v).abs()).collect(),
        }
    }

    fn wav_bytes(
        bits: u16,
        format: SampleFormat,
        write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>),
    ) -> Vec<u8> {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: bits,
            sample_format: format,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn rescale_is_repeatable() {
        for asset in fixtures() {
            for gain in gains() {
                assert_eq!(asset.rescaled(gain), asset.rescaled(gain));
            }
        }
    }

    #[test]
    fn amplitude_grows_with_gain() {
        for asset in fixtures() {
            let mut previous = amplitudes(&asset.rescaled(0.0));
            for gain in gains().skip(1) {
                let current = amplitudes(&asset.rescaled(gain));
                for (before, after) in previous.iter().zip(&current) {
                    assert!(after >= before, "width {} gain {gain}", asset.samples.width());
                }
                previous = current;
            }
        }
    }

    #[test]
    fn scaled_samples_stay_within_input_magnitude() {
        for asset in fixtures() {
            let original = amplitudes(&asset);
            for gain in gains() {
                let scaled = amplitudes(&asset.rescaled(gain));
                for (orig, out) in original.iter().zip(&scaled) {
                    assert!(out <= orig);
                }
            }
        }
    }

    #[test]
    fn eight_bit_stays_in_range_even_when_boosted() {
        let asset = buffer(Samples::U8((0..=255).collect()));
        for gain in gains().chain([1.5, 3.0]) {
            // u8 cannot leave [0, 255]; check saturation at the extremes instead
            let Samples::U8(out) = asset.rescaled(gain).samples else {
                panic!("width changed");
            };
            assert_eq!(out.len(), 256);
            if gain >= 1.5 {
                assert_eq!(out[0], 0);
                assert_eq!(out[255], 255);
            }
        }
    }

    #[test]
    fn signed_samples_saturate_above_unity() {
        let asset = buffer(Samples::I16(vec![i16::MIN, 20_000, -20_000, i16::MAX]));
        assert_eq!(
            asset.rescaled(2.0).samples,
            Samples::I16(vec![i16::MIN, i16::MAX, i16::MIN, i16::MAX])
        );
        let asset = buffer(Samples::I32(vec![i32::MIN, i32::MAX]));
        assert_eq!(asset.rescaled(2.0).samples, Samples::I32(vec![i32::MIN, i32::MAX]));
    }

    #[test]
    fn mute_and_full_volume() {
        for asset in fixtures() {
            assert_eq!(asset.rescaled(1.0), asset);
        }
        let silent = fixtures()[1].rescaled(0.0);
        assert_eq!(silent.samples, Samples::I16(vec![0; 8]));
        let silent = fixtures()[0].rescaled(0.0);
        assert_eq!(silent.samples, Samples::U8(vec![128; 9]));
    }

    #[test]
    fn truncates_toward_zero() {
        let asset = buffer(Samples::I16(vec![-7, 7, -15, 15]));
        assert_eq!(asset.rescaled(0.1).samples, Samples::I16(vec![0, 0, -1, 1]));
        let asset = buffer(Samples::U8(vec![0, 255]));
        // 128 - 12.8 = 115.2 and 128 + 12.7 = 140.7
        assert_eq!(asset.rescaled(0.1).samples, Samples::U8(vec![115, 140]));
    }

    #[test]
    fn decodes_sixteen_bit_wav() {
        let bytes = wav_bytes(16, SampleFormat::Int, |w| {
            for s in [0i16, 1_000, -1_000, i16::MAX] {
                w.write_sample(s).unwrap();
            }
        });
        let pcm = PcmBuffer::decode(WavReader::new(Cursor::new(bytes)).unwrap()).unwrap();

        assert_eq!(pcm.channels, 2);
        assert_eq!(pcm.sample_rate, 22_050);
        assert_eq!(pcm.frames(), 2);
        assert_eq!(pcm.samples, Samples::I16(vec![0, 1_000, -1_000, i16::MAX]));
    }

    #[test]
    fn decodes_eight_bit_wav_as_unsigned() {
        let bytes = wav_bytes(8, SampleFormat::Int, |w| {
            for s in [-128i8, 0, 127, -1] {
                w.write_sample(s).unwrap();
            }
        });
        let pcm = PcmBuffer::decode(WavReader::new(Cursor::new(bytes)).unwrap()).unwrap();
        assert_eq!(pcm.samples, Samples::U8(vec![0, 128, 255, 127]));
    }

    #[test]
    fn rejects_float_and_odd_widths() {
        let bytes = wav_bytes(32, SampleFormat::Float, |w| {
            w.write_sample(0.5f32).unwrap();
            w.write_sample(-0.5f32).unwrap();
        });
        let err = PcmBuffer::decode(WavReader::new(Cursor::new(bytes)).unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { bits: 32, format: "float" }));

        let bytes = wav_bytes(24, SampleFormat::Int, |w| {
            w.write_sample(1i32).unwrap();
            w.write_sample(-1i32).unwrap();
        });
        let err = PcmBuffer::decode(WavReader::new(Cursor::new(bytes)).unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { bits: 24, .. }));
    }

    #[test]
    fn loads_the_bundled_horn() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::config::SOUND_FILE);
        let pcm = PcmBuffer::load(&path).unwrap();
        assert_eq!(pcm.channels, 1);
        assert_eq!(pcm.samples.width(), 2);
        assert!(pcm.frames() > 0);
        assert!(pcm.duration() > std::time::Duration::from_millis(100));
    }

    #[test]
    fn missing_file_is_reported() {
        let path = Path::new("definitely/not/here.wav");
        assert!(matches!(PcmBuffer::load(path), Err(Error::AssetMissing(p)) if p == path));
    }

    #[test]
    fn normalizes_for_playback() {
        assert_eq!(buffer(Samples::U8(vec![0, 128])).to_f32(), vec![-1.0, 0.0]);
        assert_eq!(buffer(Samples::I16(vec![i16::MIN, 0])).to_f32(), vec![-1.0, 0.0]);
        assert_eq!(buffer(Samples::I32(vec![i32::MIN, 0])).to_f32(), vec![-1.0, 0.0]);
    }
}
