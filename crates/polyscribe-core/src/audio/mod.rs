//! Audio input plumbing

mod resample;

pub use resample::{resample_to_16khz, stereo_to_mono};
