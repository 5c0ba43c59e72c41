//! Audio constants fixed by the classifier's input contract.

/// Sample rate required by the YAMNet classifier (Hz)
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Samples per classification window (1 second at 16 kHz)
pub const CHUNK_SIZE_SAMPLES: usize = 16_000;

/// Standard number of channels for mono audio capture
pub const CHANNELS_MONO: u16 = 1;

/// Window duration in milliseconds (derived constant)
pub const CHUNK_DURATION_MS: f32 = (CHUNK_SIZE_SAMPLES as f32 * 1000.0) / SAMPLE_RATE_HZ as f32;
