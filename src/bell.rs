use std::{
    io::Write,
    sync::atomic::{AtomicU32, AtomicU8, Ordering},
};

use log::info;

/// Where the alarm signal goes. `ring` is called once per repeat while the
/// alarm is ringing; `silence` once when the ring cycle ends.
pub trait AlarmBell: Send + Sync {
    fn ring(&self);
    fn silence(&self);
    /// 0-100, applied from the next signal on.
    fn set_volume(&self, volume: u8);
}

/// Terminal bell plus a log line. Used when no audio device is wanted.
pub struct ConsoleBell;

impl AlarmBell for ConsoleBell {
    fn ring(&self) {
        info!("ALARM SOUND PLAYING");
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }

    fn silence(&self) {
        info!("Alarm sound stopped");
    }

    fn set_volume(&self, volume: u8) {
        info!("Console bell has no volume control (asked for {volume})");
    }
}

/// Counts signals and makes no noise.
#[derive(Default)]
pub struct SilentBell {
    rings: AtomicU32,
    silences: AtomicU32,
    volume: AtomicU8,
}

impl SilentBell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rings(&self) -> u32 {
        self.rings.load(Ordering::SeqCst)
    }

    pub fn silences(&self) -> u32 {
        self.silences.load(Ordering::SeqCst)
    }

    /// Last volume handed to [`AlarmBell::set_volume`].
    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::SeqCst)
    }
}

impl AlarmBell for SilentBell {
    fn ring(&self) {
        self.rings.fetch_add(1, Ordering::SeqCst);
    }

    fn silence(&self) {
        self.silences.fetch_add(1, Ordering::SeqCst);
    }

    fn set_volume(&self, volume: u8) {
        self.volume.store(volume.min(100), Ordering::SeqCst);
    }
}

#[cfg(feature = "audio")]
pub use audio_bell::AudioBell;

#[cfg(feature = "audio")]
mod audio_bell {
    use log::error;

    use super::AlarmBell;
    use crate::audio::AudioEngineHandle;

    /// Plays a chime through the default output device on every signal.
    pub struct AudioBell {
        engine: AudioEngineHandle,
    }

    impl AudioBell {
        /// `volume` is the 0-100 settings value.
        pub fn new(volume: u8) -> Self {
            let bell = Self {
                engine: AudioEngineHandle::new(),
            };
            bell.set_volume(volume);
            bell
        }
    }

    impl AlarmBell for AudioBell {
        fn ring(&self) {
            if let Err(err) = self.engine.chime() {
                error!("Failed to play alarm chime: {err}");
            }
        }

        fn silence(&self) {
            let _ = self.engine.stop();
        }

        fn set_volume(&self, volume: u8) {
            if let Err(err) = self.engine.set_volume(f32::from(volume.min(100)) / 100.0) {
                error!("Failed to set alarm volume: {err}");
            }
        }
    }
}
