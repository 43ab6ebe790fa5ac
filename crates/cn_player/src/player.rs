use cn_core::{Episode, Result};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::session::{Effect, PlaybackSession, PlayerEvent};

/// Opens audio resources. One handle is alive at a time per player.
pub trait AudioOutput {
    type Handle: AudioHandle;

    fn open(&mut self, url: &str) -> Result<Self::Handle>;
}

/// A loaded audio resource. Dropping it releases the resource.
pub trait AudioHandle {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek(&mut self, seconds: f64) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// An output that accepts every command and produces no sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

#[derive(Debug, Default)]
pub struct SilentHandle;

impl AudioOutput for SilentOutput {
    type Handle = SilentHandle;

    fn open(&mut self, _url: &str) -> Result<SilentHandle> {
        Ok(SilentHandle)
    }
}

impl AudioHandle for SilentHandle {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn seek(&mut self, _seconds: f64) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Owns the playback session and the single audio handle it drives.
pub struct MediaPlayer<O: AudioOutput> {
    output: O,
    handle: Option<O::Handle>,
    session: PlaybackSession,
    premium: Option<watch::Receiver<bool>>,
}

impl<O: AudioOutput> MediaPlayer<O> {
    pub fn new(output: O, premium: bool) -> Self {
        Self {
            output,
            handle: None,
            session: PlaybackSession::new(premium),
            premium: None,
        }
    }

    /// Follow a premium status subscription; the current value applies immediately.
    pub fn with_premium(output: O, mut premium: watch::Receiver<bool>) -> Self {
        let initial = *premium.borrow_and_update();
        let mut player = Self::new(output, initial);
        player.premium = Some(premium);
        player
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn has_audio(&self) -> bool {
        self.handle.is_some()
    }

    pub fn select_episode(&mut self, episode: Option<Episode>) -> Vec<Effect> {
        self.dispatch(PlayerEvent::Select(episode))
    }

    pub fn audio_ready(&mut self) -> Vec<Effect> {
        self.dispatch(PlayerEvent::AudioReady)
    }

    pub fn toggle_playback(&mut self) -> Vec<Effect> {
        self.dispatch(PlayerEvent::Toggle)
    }

    pub fn time_update(&mut self, position: f64) -> Vec<Effect> {
        self.dispatch(PlayerEvent::Tick(position))
    }

    pub fn seek(&mut self, fraction: f64) -> Vec<Effect> {
        self.dispatch(PlayerEvent::Seek(fraction))
    }

    pub fn dismiss_prompt(&mut self) -> Vec<Effect> {
        self.dispatch(PlayerEvent::DismissPrompt)
    }

    pub fn close(&mut self) -> Vec<Effect> {
        self.dispatch(PlayerEvent::Close)
    }

    /// Run one event through the session and carry out its effects.
    /// Returns every effect, including those caused by a premium change.
    pub fn dispatch(&mut self, event: PlayerEvent) -> Vec<Effect> {
        let mut effects = self.sync_premium();
        effects.extend(self.session.handle(event));
        for effect in &effects {
            self.apply(effect);
        }
        effects
    }

    fn sync_premium(&mut self) -> Vec<Effect> {
        let Some(rx) = self.premium.as_mut() else {
            return Vec::new();
        };
        match rx.has_changed() {
            Ok(true) => {
                let premium = *rx.borrow_and_update();
                debug!("Player sees premium = {}", premium);
                self.session.handle(PlayerEvent::PremiumChanged(premium))
            }
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, effect: &Effect) {
        let result = match effect {
            Effect::Stop => match self.handle.take() {
                Some(mut handle) => handle.stop(),
                None => Ok(()),
            },
            // Load failures leave the session waiting in Loading.
            Effect::Load { url } => self.output.open(url).map(|handle| {
                self.handle = Some(handle);
            }),
            Effect::Play => self.with_handle(|h| h.play()),
            Effect::Pause => self.with_handle(|h| h.pause()),
            Effect::SeekTo(seconds) => self.with_handle(|h| h.seek(*seconds)),
            Effect::ShowUpgradePrompt | Effect::HideUpgradePrompt => Ok(()),
        };
        if let Err(e) = result {
            warn!("Audio command {:?} failed: {}", effect, e);
        }
    }

    fn with_handle<F>(&mut self, command: F) -> Result<()>
    where
        F: FnOnce(&mut O::Handle) -> Result<()>,
    {
        match self.handle.as_mut() {
            Some(handle) => command(handle),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::premium::{PremiumSignal, PremiumStatus};
    use crate::session::{PlaybackState, FREE_PREVIEW_SECONDS};
    use chrono::Utc;
    use cn_core::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct RecordingOutput {
        log: Log,
        fail: bool,
    }

    struct RecordingHandle {
        url: String,
        log: Log,
    }

    impl AudioOutput for RecordingOutput {
        type Handle = RecordingHandle;

        fn open(&mut self, url: &str) -> Result<RecordingHandle> {
            if self.fail {
                return Err(Error::Playback(format!("cannot load {}", url)));
            }
            self.log.borrow_mut().push(format!("open {}", url));
            Ok(RecordingHandle {
                url: url.to_string(),
                log: self.log.clone(),
            })
        }
    }

    impl AudioHandle for RecordingHandle {
        fn play(&mut self) -> Result<()> {
            self.log.borrow_mut().push("play".to_string());
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            self.log.borrow_mut().push("pause".to_string());
            Ok(())
        }

        fn seek(&mut self, seconds: f64) -> Result<()> {
            self.log.borrow_mut().push(format!("seek {}", seconds));
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.log.borrow_mut().push(format!("stop {}", self.url));
            Ok(())
        }
    }

    fn output(fail: bool) -> (RecordingOutput, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        (RecordingOutput { log: log.clone(), fail }, log)
    }

    fn episode(id: &str, duration: u64) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("Episode {}", id),
            duration,
            audio_url: format!("https://audio.example.com/{}.mp3", id),
            image_url: String::new(),
            published_at: Utc::now(),
        }
    }

    #[test]
    fn test_handle_is_replaced_on_new_selection() {
        let (out, log) = output(false);
        let mut player = MediaPlayer::new(out, false);

        player.select_episode(Some(episode("a", 754)));
        player.audio_ready();
        player.select_episode(Some(episode("b", 754)));
        player.close();

        assert_eq!(
            *log.borrow(),
            vec![
                "open https://audio.example.com/a.mp3",
                "play",
                "stop https://audio.example.com/a.mp3",
                "open https://audio.example.com/b.mp3",
                "stop https://audio.example.com/b.mp3",
            ]
        );
        assert!(!player.has_audio());
        assert_eq!(player.session().state(), PlaybackState::Idle);
    }

    #[test]
    fn test_preview_gate_pauses_audio() {
        let (out, log) = output(false);
        let mut player = MediaPlayer::new(out, false);
        player.select_episode(Some(episode("a", 754)));
        player.audio_ready();

        let effects = player.time_update(61.0);
        assert!(effects.contains(&Effect::ShowUpgradePrompt));
        assert_eq!(player.session().position(), FREE_PREVIEW_SECONDS);
        assert!(log.borrow().ends_with(&["pause".to_string(), "seek 60".to_string()]));
    }

    #[test]
    fn test_load_failure_stalls_in_loading() {
        let (out, _log) = output(true);
        let mut player = MediaPlayer::new(out, false);
        player.select_episode(Some(episode("a", 754)));

        assert!(!player.has_audio());
        assert_eq!(player.session().state(), PlaybackState::Loading);
    }

    #[test]
    fn test_follows_premium_subscription() {
        let status = PremiumStatus::new();
        let (out, _log) = output(false);
        let mut player = MediaPlayer::with_premium(out, status.subscribe());
        assert!(!player.session().is_premium());

        player.select_episode(Some(episode("a", 754)));
        player.audio_ready();
        player.time_update(60.0);
        assert_eq!(player.session().state(), PlaybackState::PreviewExhausted);

        status.notify(PremiumSignal::Upgraded);
        let effects = player.toggle_playback();
        assert!(effects.contains(&Effect::HideUpgradePrompt));
        assert!(effects.contains(&Effect::Play));
        assert_eq!(player.session().state(), PlaybackState::Playing);

        player.time_update(300.0);
        assert_eq!(player.session().position(), 300.0);
    }

    #[test]
    fn test_seek_half_of_long_episode_without_premium() {
        let mut player = MediaPlayer::new(SilentOutput, false);
        player.select_episode(Some(episode("a", 754)));
        player.audio_ready();
        player.seek(0.5);
        assert_eq!(player.session().position(), 30.0);
    }
}
