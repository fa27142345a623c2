//! FFmpeg CLI wrapper for frame extraction.
//!
//! Decoding is delegated to an external `ffmpeg` executable; this crate only
//! builds the command line, runs it and reports success or failure.

pub mod command;
pub mod error;
pub mod extractor;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use extractor::{frame_pattern, FfmpegFrameExtractor, FrameExtractor, FRAME_PREFIX_LEN};
