//! Chime playback
//!
//! The controller only ever asks for "play from the start". Failures are
//! reported to the caller, which logs and ignores them.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while preparing or playing the chime
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read sound asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("audio output unavailable: {0}")]
    Device(String),
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Plays the single fixed chime asset
pub trait AudioPlayer: Send + Sync {
    /// Play the chime from its beginning, cutting off any playback in progress
    fn play_from_start(&self) -> Result<(), AudioError>;

    /// Release playback resources on teardown
    fn shutdown(&self) {}
}

/// Fallback chime: the terminal bell on stderr
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AudioPlayer for TerminalBell {
    fn play_from_start(&self) -> Result<(), AudioError> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| AudioError::Playback(e.to_string()))
    }
}

/// Read the sound asset once so every chime plays from memory
pub fn load_asset(path: &Path) -> Result<Arc<[u8]>, AudioError> {
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|source| AudioError::Asset {
            path: path.to_path_buf(),
            source,
        })
}

/// Build the player for `path`, falling back to the terminal bell when the
/// asset or the audio device is unavailable
pub fn load_player(path: &Path) -> Arc<dyn AudioPlayer> {
    let asset = match load_asset(path) {
        Ok(asset) => asset,
        Err(e) => {
            warn!("{}, using terminal bell", e);
            return Arc::new(TerminalBell);
        }
    };
    info!("Loaded chime asset {} ({} bytes)", path.display(), asset.len());
    open_output(asset)
}

#[cfg(feature = "sound")]
fn open_output(asset: Arc<[u8]>) -> Arc<dyn AudioPlayer> {
    match rodio_player::RodioPlayer::new(asset) {
        Ok(player) => {
            info!("Audio output initialized");
            Arc::new(player)
        }
        Err(e) => {
            warn!("{}, using terminal bell", e);
            Arc::new(TerminalBell)
        }
    }
}

#[cfg(not(feature = "sound"))]
fn open_output(_asset: Arc<[u8]>) -> Arc<dyn AudioPlayer> {
    info!("Built without the `sound` feature, using terminal bell");
    Arc::new(TerminalBell)
}

#[cfg(feature = "sound")]
pub mod rodio_player {
    //! rodio output on a dedicated thread (the output stream is not `Send`)

    use std::{
        io::Cursor,
        sync::{
            mpsc::{channel, sync_channel, Sender},
            Arc, Mutex,
        },
        thread::JoinHandle,
    };

    use rodio::{Decoder, OutputStream, Sink};
    use tracing::{debug, warn};

    use super::{AudioError, AudioPlayer};

    enum AudioCommand {
        Play,
        Shutdown,
    }

    pub struct RodioPlayer {
        sender: Mutex<Option<Sender<AudioCommand>>>,
        handle: Mutex<Option<JoinHandle<()>>>,
    }

    impl RodioPlayer {
        /// Open the default output device on a new audio thread
        pub fn new(asset: Arc<[u8]>) -> Result<Self, AudioError> {
            let (tx, rx) = channel::<AudioCommand>();
            let (ready_tx, ready_rx) = sync_channel::<Result<(), String>>(1);

            let handle = std::thread::Builder::new()
                .name("chime-audio".to_string())
                .spawn(move || {
                    let (_stream, stream_handle) = match OutputStream::try_default() {
                        Ok(output) => output,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.to_string()));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));

                    let mut current: Option<Sink> = None;
                    while let Ok(command) = rx.recv() {
                        match command {
                            AudioCommand::Play => {
                                if let Some(sink) = current.take() {
                                    sink.stop();
                                }
                                let sink = match Sink::try_new(&stream_handle) {
                                    Ok(sink) => sink,
                                    Err(e) => {
                                        debug!("Failed to create audio sink: {}", e);
                                        continue;
                                    }
                                };
                                match Decoder::new(Cursor::new(Arc::clone(&asset))) {
                                    Ok(source) => {
                                        sink.append(source);
                                        current = Some(sink);
                                    }
                                    Err(e) => debug!("Failed to decode chime: {}", e),
                                }
                            }
                            AudioCommand::Shutdown => {
                                debug!("Audio thread received shutdown signal");
                                break;
                            }
                        }
                    }
                    debug!("Audio thread exiting");
                })
                .map_err(|e| AudioError::Device(e.to_string()))?;

            match ready_rx.recv() {
                Ok(Ok(())) => Ok(Self {
                    sender: Mutex::new(Some(tx)),
                    handle: Mutex::new(Some(handle)),
                }),
                Ok(Err(e)) => Err(AudioError::Device(e)),
                Err(_) => Err(AudioError::Device("audio thread exited during startup".to_string())),
            }
        }
    }

    impl AudioPlayer for RodioPlayer {
        fn play_from_start(&self) -> Result<(), AudioError> {
            let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
            let sender = guard
                .as_ref()
                .ok_or_else(|| AudioError::Playback("audio thread shut down".to_string()))?;
            sender
                .send(AudioCommand::Play)
                .map_err(|_| AudioError::Playback("audio thread is gone".to_string()))
        }

        fn shutdown(&self) {
            if let Some(sender) = self.sender.lock().unwrap_or_else(|e| e.into_inner()).take() {
                let _ = sender.send(AudioCommand::Shutdown);
            }
            if let Some(handle) = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take() {
                if handle.join().is_err() {
                    warn!("Audio thread panicked");
                }
            }
        }
    }
}
