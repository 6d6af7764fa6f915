//! Audio feature extraction.
//!
//! The external audio source delivers a fixed-length buffer of non-negative
//! frequency magnitudes once per tick. This module reduces it to four
//! normalized scalars (bass, mid, high, overall), each clamped to [0, 1].
//! A missing source is a valid, silently degraded state: every feature is
//! exactly zero, never NaN.

/// Normalized per-tick audio features.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioFeatureFrame {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub overall: f32,
}

impl AudioFeatureFrame {
    /// The all-zero frame reported when no source is connected.
    pub const SILENCE: AudioFeatureFrame = AudioFeatureFrame {
        bass: 0.0,
        mid: 0.0,
        high: 0.0,
        overall: 0.0,
    };
}

/// Band-averaging extractor.
///
/// Bands are proportional to the buffer length: the first eighth is bass,
/// the next three eighths mid, and the remaining half high, so any fixed
/// buffer size degrades sanely.
#[derive(Clone, Debug)]
pub struct AudioFeatureExtractor {
    /// Magnitude mapped to a feature value of 1.0.
    ceiling: f32,
}

impl AudioFeatureExtractor {
    pub fn new(ceiling: f32) -> Self {
        Self {
            ceiling: ceiling.max(f32::EPSILON),
        }
    }

    /// Reduce a spectrum to band features. `None` or an empty buffer
    /// yields [`AudioFeatureFrame::SILENCE`].
    pub fn extract(&self, spectrum: Option<&[f32]>) -> AudioFeatureFrame {
        let spectrum = match spectrum {
            Some(s) if !s.is_empty() => s,
            _ => return AudioFeatureFrame::SILENCE,
        };

        let n = spectrum.len();
        let bass_end = (n / 8).max(1);
        let mid_end = (n / 2).max(bass_end + 1).min(n);

        AudioFeatureFrame {
            bass: self.band_level(&spectrum[..bass_end]),
            mid: self.band_level(&spectrum[bass_end..mid_end]),
            high: self.band_level(&spectrum[mid_end..]),
            overall: self.band_level(spectrum),
        }
    }

    fn band_level(&self, band: &[f32]) -> f32 {
        if band.is_empty() {
            return 0.0;
        }
        let mean = band.iter().sum::<f32>() / band.len() as f32;
        (mean / self.ceiling).clamp(0.0, 1.0)
    }
}

impl Default for AudioFeatureExtractor {
    fn default() -> Self {
        // Byte-magnitude analyser buffers peak at 255.
        Self::new(255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_source_is_silence() {
        let extractor = AudioFeatureExtractor::default();
        assert_eq!(extractor.extract(None), AudioFeatureFrame::SILENCE);
        assert_eq!(extractor.extract(Some(&[])), AudioFeatureFrame::SILENCE);
    }

    #[test]
    fn test_flat_spectrum() {
        let extractor = AudioFeatureExtractor::new(100.0);
        let spectrum = vec![50.0; 64];
        let frame = extractor.extract(Some(&spectrum));
        assert!((frame.bass - 0.5).abs() < 1e-6);
        assert!((frame.mid - 0.5).abs() < 1e-6);
        assert!((frame.high - 0.5).abs() < 1e-6);
        assert!((frame.overall - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bass_heavy_spectrum() {
        let extractor = AudioFeatureExtractor::new(100.0);
        let mut spectrum = vec![0.0; 64];
        for v in spectrum.iter_mut().take(8) {
            *v = 80.0;
        }
        let frame = extractor.extract(Some(&spectrum));
        assert!(frame.bass > 0.7);
        assert_eq!(frame.mid, 0.0);
        assert_eq!(frame.high, 0.0);
        assert!(frame.overall > 0.0 && frame.overall < frame.bass);
    }

    #[test]
    fn test_values_clamped() {
        let extractor = AudioFeatureExtractor::new(10.0);
        let spectrum = vec![1000.0; 32];
        let frame = extractor.extract(Some(&spectrum));
        assert_eq!(frame.bass, 1.0);
        assert_eq!(frame.overall, 1.0);
    }

    #[test]
    fn test_tiny_buffer_defined() {
        let extractor = AudioFeatureExtractor::new(100.0);
        let frame = extractor.extract(Some(&[30.0]));
        assert!(frame.bass.is_finite());
        assert!(frame.mid.is_finite());
        assert!(frame.high.is_finite());
        assert!(frame.overall.is_finite());
    }
}
