//! Sound module.
//!
//! Plays the rescaled horn on every key press. A new press always cuts
//! off whatever is still playing.

use crate::error::{Error, Result};
use crate::pcm::PcmBuffer;
use parking_lot::Mutex;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::sync::Arc;

/// Number of pre-scaled buffers kept ready for playback.
const POOL_SIZE: usize = 1;

/// One in-flight playback.
pub trait Playback: Send {
    /// Stops the sound. Backends may report an error for a sound that
    /// already finished; the engine ignores it.
    fn stop(&self) -> Result<()>;
}

/// Something that can play a PCM buffer.
pub trait AudioOutput: Send + Sync {
    fn play(&self, buffer: &PcmBuffer) -> Result<Box<dyn Playback>>;
}

/// Audio output on the default device.
pub struct RodioOutput {
    handle: OutputStreamHandle,
}

impl RodioOutput {
    /// Opens the default output device.
    ///
    /// The returned stream must stay alive on the calling thread for as
    /// long as sounds should be heard.
    pub fn open_default() -> Result<(Self, OutputStream)> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| Error::Output(e.to_string()))?;
        Ok((Self { handle }, stream))
    }
}

impl AudioOutput for RodioOutput {
    fn play(&self, buffer: &PcmBuffer) -> Result<Box<dyn Playback>> {
        let sink = Sink::try_new(&self.handle).map_err(|e| Error::Output(e.to_string()))?;
        sink.append(SamplesBuffer::new(
            buffer.channels,
            buffer.sample_rate,
            buffer.to_f32(),
        ));
        Ok(Box::new(RodioPlayback(sink)))
    }
}

/// A rodio sink playing one sound. Dropping it silences the sound.
struct RodioPlayback(Sink);

impl Playback for RodioPlayback {
    fn stop(&self) -> Result<()> {
        self.0.stop();
        Ok(())
    }
}

/// Pre-scaled buffers, handed out round-robin.
struct SoundPool {
    buffers: Vec<Arc<PcmBuffer>>,
    next: usize,
}

impl SoundPool {
    fn filled(buffer: PcmBuffer) -> Self {
        let buffer = Arc::new(buffer);
        Self {
            buffers: vec![buffer; POOL_SIZE],
            next: 0,
        }
    }

    fn take(&mut self) -> Arc<PcmBuffer> {
        self.next = (self.next + 1) % self.buffers.len();
        Arc::clone(&self.buffers[self.next])
    }
}

/// Holds the decoded asset and plays its rescaled copy.
///
/// Shared between the main thread (volume changes, quit) and the key
/// listener thread (triggers).
pub struct SoundEngine<O: AudioOutput> {
    asset: PcmBuffer,
    output: O,
    pool: Mutex<SoundPool>,
    playing: Mutex<Vec<Box<dyn Playback>>>,
}

impl<O: AudioOutput> SoundEngine<O> {
    /// Creates an engine playing `asset` at `gain`.
    pub fn new(asset: PcmBuffer, output: O, gain: f64) -> Self {
        let pool = SoundPool::filled(asset.rescaled(gain));
        Self {
            asset,
            output,
            pool: Mutex::new(pool),
            playing: Mutex::new(Vec::new()),
        }
    }

    /// Rebuilds the playback buffers from the original asset at `gain`.
    pub fn rescale(&self, gain: f64) {
        let pool = SoundPool::filled(self.asset.rescaled(gain));
        *self.pool.lock() = pool;
        log::debug!("Sound rescaled to gain {:.2}", gain);
    }

    /// Stops the current sound and starts a fresh one.
    pub fn trigger(&self) -> Result<()> {
        // Held across stop and play so concurrent triggers never overlap.
        let mut playing = self.playing.lock();
        stop_all(&mut playing);

        let buffer = self.pool.lock().take();
        let playback = self.output.play(&buffer)?;
        playing.push(playback);
        Ok(())
    }

    /// Stops every sound still tracked.
    pub fn stop(&self) {
        stop_all(&mut self.playing.lock());
    }

    /// The buffer the next trigger will play.
    #[cfg(test)]
    pub fn current_buffer(&self) -> Arc<PcmBuffer> {
        let pool = self.pool.lock();
        Arc::clone(&pool.buffers[(pool.next + 1) % pool.buffers.len()])
    }
}

fn stop_all(playing: &mut Vec<Box<dyn Playback>>) {
    for playback in playing.drain(..) {
        if let Err(e) = playback.stop() {
            log::trace!("Ignoring stop error: {}", e);
        }
    }
}
