//! Playback session state machine.
//!
//! Every transition is a plain function of the current session and an event. It
//! yields the next session and the side effects the caller must carry out
//! (start audio, show the upgrade prompt, ...). Nothing here touches audio.

use cn_core::Episode;
use serde::Serialize;

use crate::format::progress_percent;

/// Seconds a non-premium listener may play of any episode.
pub const FREE_PREVIEW_SECONDS: f64 = 60.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    PreviewExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// `None` closes the session.
    Select(Option<Episode>),
    AudioReady,
    Toggle,
    /// Position report from the audio resource, in seconds.
    Tick(f64),
    /// Fraction of the addressable range, within `[0, 1]`.
    Seek(f64),
    DismissPrompt,
    PremiumChanged(bool),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Stop,
    Load { url: String },
    Play,
    Pause,
    SeekTo(f64),
    ShowUpgradePrompt,
    HideUpgradePrompt,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    episode: Option<Episode>,
    state: PlaybackState,
    position: f64,
    upgrade_prompt: bool,
    premium: bool,
}

impl PlaybackSession {
    pub fn new(premium: bool) -> Self {
        Self {
            premium,
            ..Default::default()
        }
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_upgrade_prompt_visible(&self) -> bool {
        self.upgrade_prompt
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    pub fn duration(&self) -> f64 {
        self.episode.as_ref().map(|e| e.duration as f64).unwrap_or(0.0)
    }

    /// Full duration for premium listeners, the preview window otherwise.
    pub fn effective_max(&self) -> f64 {
        if self.premium {
            self.duration()
        } else {
            FREE_PREVIEW_SECONDS
        }
    }

    pub fn progress(&self) -> f64 {
        progress_percent(self.position, self.effective_max())
    }

    fn preview_blocked(&self) -> bool {
        !self.premium && self.position >= FREE_PREVIEW_SECONDS
    }

    /// Consume the session and return its successor plus the effects to run.
    pub fn transition(mut self, event: PlayerEvent) -> (Self, Vec<Effect>) {
        let effects = self.handle(event);
        (self, effects)
    }

    /// In-place form of [`PlaybackSession::transition`].
    pub fn handle(&mut self, event: PlayerEvent) -> Vec<Effect> {
        match event {
            PlayerEvent::Select(Some(episode)) => self.select(episode),
            PlayerEvent::Select(None) | PlayerEvent::Close => self.close(),
            PlayerEvent::AudioReady => self.audio_ready(),
            PlayerEvent::Toggle => self.toggle(),
            PlayerEvent::Tick(position) => self.tick(position),
            PlayerEvent::Seek(fraction) => self.seek(fraction),
            PlayerEvent::DismissPrompt => self.dismiss_prompt(),
            PlayerEvent::PremiumChanged(premium) => self.premium_changed(premium),
        }
    }

    fn select(&mut self, episode: Episode) -> Vec<Effect> {
        let mut effects = self.close();
        effects.push(Effect::Load {
            url: episode.audio_url.clone(),
        });
        self.episode = Some(episode);
        self.state = PlaybackState::Loading;
        effects
    }

    fn close(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.episode.is_some() {
            effects.push(Effect::Stop);
        }
        if self.upgrade_prompt {
            effects.push(Effect::HideUpgradePrompt);
        }
        *self = Self::new(self.premium);
        effects
    }

    fn audio_ready(&mut self) -> Vec<Effect> {
        if self.state != PlaybackState::Loading {
            return Vec::new();
        }
        self.state = PlaybackState::Playing;
        vec![Effect::Play]
    }

    fn toggle(&mut self) -> Vec<Effect> {
        if self.episode.is_none() {
            return Vec::new();
        }
        match self.state {
            PlaybackState::Playing | PlaybackState::Loading => {
                self.state = PlaybackState::Paused;
                vec![Effect::Pause]
            }
            PlaybackState::PreviewExhausted => {
                // Only a dismissal or an upgrade leaves this state.
                if self.upgrade_prompt {
                    return Vec::new();
                }
                self.upgrade_prompt = true;
                vec![Effect::ShowUpgradePrompt]
            }
            PlaybackState::Paused => {
                if self.preview_blocked() {
                    return self.exhaust(false);
                }
                let mut effects = Vec::new();
                if self.upgrade_prompt {
                    self.upgrade_prompt = false;
                    effects.push(Effect::HideUpgradePrompt);
                }
                self.state = PlaybackState::Playing;
                effects.push(Effect::Play);
                effects
            }
            PlaybackState::Idle => Vec::new(),
        }
    }

    fn tick(&mut self, position: f64) -> Vec<Effect> {
        if self.state != PlaybackState::Playing || !position.is_finite() {
            return Vec::new();
        }
        self.position = position.max(0.0);
        if self.preview_blocked() {
            return self.exhaust(true);
        }
        let duration = self.duration();
        if self.position >= duration {
            self.position = duration;
            self.state = PlaybackState::Paused;
            return vec![Effect::Pause];
        }
        Vec::new()
    }

    fn seek(&mut self, fraction: f64) -> Vec<Effect> {
        if self.episode.is_none() || !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Vec::new();
        }
        let target = (fraction * self.effective_max()).min(self.duration());
        if !self.premium && target > FREE_PREVIEW_SECONDS {
            return Vec::new();
        }
        self.position = target;
        vec![Effect::SeekTo(target)]
    }

    fn dismiss_prompt(&mut self) -> Vec<Effect> {
        if self.state != PlaybackState::PreviewExhausted {
            return Vec::new();
        }
        self.state = PlaybackState::Paused;
        self.upgrade_prompt = false;
        vec![Effect::HideUpgradePrompt]
    }

    fn premium_changed(&mut self, premium: bool) -> Vec<Effect> {
        if self.premium == premium {
            return Vec::new();
        }
        self.premium = premium;

        if premium {
            return self.dismiss_prompt();
        }
        match self.state {
            PlaybackState::Playing if self.preview_blocked() => self.exhaust(true),
            _ if self.position > FREE_PREVIEW_SECONDS => {
                self.position = FREE_PREVIEW_SECONDS;
                vec![Effect::SeekTo(FREE_PREVIEW_SECONDS)]
            }
            _ => Vec::new(),
        }
    }

    /// Clamp to the preview limit, hold playback and raise the prompt.
    fn exhaust(&mut self, playing: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        if playing {
            effects.push(Effect::Pause);
        }
        if self.position > FREE_PREVIEW_SECONDS || playing {
            self.position = FREE_PREVIEW_SECONDS;
            effects.push(Effect::SeekTo(FREE_PREVIEW_SECONDS));
        }
        if !self.upgrade_prompt {
            self.upgrade_prompt = true;
            effects.push(Effect::ShowUpgradePrompt);
        }
        self.state = PlaybackState::PreviewExhausted;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn episode(duration: u64) -> Episode {
        Episode {
            id: "ep-1".to_string(),
            title: "Morning briefing".to_string(),
            duration,
            audio_url: "https://audio.example.com/ep-1.mp3".to_string(),
            image_url: "https://cdn.example.com/ep-1.jpg".to_string(),
            published_at: Utc::now(),
        }
    }

    fn playing(premium: bool, duration: u64) -> PlaybackSession {
        let mut session = PlaybackSession::new(premium);
        session.handle(PlayerEvent::Select(Some(episode(duration))));
        session.handle(PlayerEvent::AudioReady);
        assert_eq!(session.state(), PlaybackState::Playing);
        session
    }

    #[test]
    fn test_select_loads_and_autostarts() {
        let session = PlaybackSession::new(false);
        let (session, effects) = session.transition(PlayerEvent::Select(Some(episode(754))));
        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(
            effects,
            vec![Effect::Load {
                url: "https://audio.example.com/ep-1.mp3".to_string()
            }]
        );

        let (session, effects) = session.transition(PlayerEvent::AudioReady);
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(effects, vec![Effect::Play]);
    }

    #[test]
    fn test_new_selection_replaces_old() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Tick(42.0));

        let effects = session.handle(PlayerEvent::Select(Some(episode(100))));
        assert_eq!(effects[0], Effect::Stop);
        assert_eq!(session.position(), 0.0);
        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(session.duration(), 100.0);
    }

    #[test]
    fn test_select_none_closes() {
        let mut session = playing(false, 754);
        let effects = session.handle(PlayerEvent::Select(None));
        assert_eq!(effects, vec![Effect::Stop]);
        assert_eq!(session.state(), PlaybackState::Idle);
        assert!(session.episode().is_none());
    }

    #[test]
    fn test_preview_limit_exhausts_and_pauses() {
        let mut session = playing(false, 754);
        assert!(session.handle(PlayerEvent::Tick(59.9)).is_empty());

        let effects = session.handle(PlayerEvent::Tick(60.4));
        assert_eq!(session.state(), PlaybackState::PreviewExhausted);
        assert_eq!(session.position(), FREE_PREVIEW_SECONDS);
        assert!(session.is_upgrade_prompt_visible());
        assert!(effects.contains(&Effect::Pause));
        assert!(effects.contains(&Effect::ShowUpgradePrompt));
        assert_eq!(session.progress(), 100.0);
    }

    #[test]
    fn test_non_premium_position_never_exceeds_limit() {
        let ticks = [0.0, 12.5, 33.0, 59.99, 61.0, 75.0, 300.0, 754.0];
        let mut session = playing(false, 754);
        for (i, t) in ticks.iter().enumerate() {
            session.handle(PlayerEvent::Tick(*t));
            session.handle(PlayerEvent::Seek(i as f64 / ticks.len() as f64));
            session.handle(PlayerEvent::Toggle);
            assert!(session.position() <= FREE_PREVIEW_SECONDS);
        }
    }

    #[test]
    fn test_premium_never_hits_limit() {
        let mut session = playing(true, 754);
        for t in [30.0, 60.0, 61.0, 200.0, 753.0] {
            let effects = session.handle(PlayerEvent::Tick(t));
            assert!(!effects.contains(&Effect::ShowUpgradePrompt));
            assert_eq!(session.state(), PlaybackState::Playing);
            assert_eq!(session.position(), t);
        }
    }

    #[test]
    fn test_toggle_after_limit_reenters_exhausted() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Tick(60.0));
        let effects = session.handle(PlayerEvent::DismissPrompt);
        assert_eq!(effects, vec![Effect::HideUpgradePrompt]);
        assert_eq!(session.state(), PlaybackState::Paused);

        let effects = session.handle(PlayerEvent::Toggle);
        assert_eq!(session.state(), PlaybackState::PreviewExhausted);
        assert_eq!(effects, vec![Effect::ShowUpgradePrompt]);
        assert!(!effects.contains(&Effect::Play));
    }

    #[test]
    fn test_toggle_cannot_leave_exhausted_after_seek_back() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Tick(60.0));
        assert_eq!(session.handle(PlayerEvent::Seek(0.5)), vec![Effect::SeekTo(30.0)]);
        assert_eq!(session.state(), PlaybackState::PreviewExhausted);

        let effects = session.handle(PlayerEvent::Toggle);
        assert!(effects.is_empty());
        assert_eq!(session.state(), PlaybackState::PreviewExhausted);
        assert!(session.is_upgrade_prompt_visible());

        session.handle(PlayerEvent::DismissPrompt);
        assert_eq!(session.state(), PlaybackState::Paused);
        assert_eq!(session.handle(PlayerEvent::Toggle), vec![Effect::Play]);
        assert_eq!(session.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_toggle_pauses_and_resumes() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Tick(10.0));
        assert_eq!(session.handle(PlayerEvent::Toggle), vec![Effect::Pause]);
        assert_eq!(session.state(), PlaybackState::Paused);
        assert_eq!(session.handle(PlayerEvent::Toggle), vec![Effect::Play]);
        assert_eq!(session.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_toggle_without_episode_is_noop() {
        let mut session = PlaybackSession::new(false);
        assert!(session.handle(PlayerEvent::Toggle).is_empty());
        assert_eq!(session.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_seek_maps_to_preview_window() {
        let mut session = playing(false, 754);
        assert_eq!(session.handle(PlayerEvent::Seek(0.5)), vec![Effect::SeekTo(30.0)]);
        assert_eq!(session.position(), 30.0);
        assert_eq!(session.progress(), 50.0);

        let mut premium = playing(true, 754);
        premium.handle(PlayerEvent::Seek(0.5));
        assert_eq!(premium.position(), 377.0);
    }

    #[test]
    fn test_seek_rejects_out_of_range() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Seek(0.25));
        assert!(session.handle(PlayerEvent::Seek(1.5)).is_empty());
        assert!(session.handle(PlayerEvent::Seek(-0.1)).is_empty());
        assert!(session.handle(PlayerEvent::Seek(f64::NAN)).is_empty());
        assert_eq!(session.position(), 15.0);
    }

    #[test]
    fn test_seek_capped_by_short_episode() {
        let mut session = playing(false, 40);
        session.handle(PlayerEvent::Seek(1.0));
        assert_eq!(session.position(), 40.0);
    }

    #[test]
    fn test_upgrade_leaves_exhausted_for_paused() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Tick(60.0));
        let effects = session.handle(PlayerEvent::PremiumChanged(true));
        assert_eq!(effects, vec![Effect::HideUpgradePrompt]);
        assert_eq!(session.state(), PlaybackState::Paused);

        session.handle(PlayerEvent::Toggle);
        assert_eq!(session.state(), PlaybackState::Playing);
        session.handle(PlayerEvent::Tick(120.0));
        assert_eq!(session.position(), 120.0);
    }

    #[test]
    fn test_downgrade_while_past_limit() {
        let mut session = playing(true, 754);
        session.handle(PlayerEvent::Tick(200.0));
        let effects = session.handle(PlayerEvent::PremiumChanged(false));
        assert_eq!(session.state(), PlaybackState::PreviewExhausted);
        assert_eq!(session.position(), FREE_PREVIEW_SECONDS);
        assert!(effects.contains(&Effect::ShowUpgradePrompt));
    }

    #[test]
    fn test_short_free_episode_progress_is_against_preview_window() {
        let mut session = playing(false, 45);
        session.handle(PlayerEvent::Tick(50.0));
        assert_eq!(session.state(), PlaybackState::Paused);
        assert_eq!(session.position(), 45.0);
        assert_eq!(session.progress(), 75.0);

        let mut premium = playing(true, 45);
        premium.handle(PlayerEvent::Tick(50.0));
        assert_eq!(premium.progress(), 100.0);
    }

    #[test]
    fn test_episode_end_pauses() {
        let mut session = playing(true, 90);
        session.handle(PlayerEvent::Tick(95.0));
        assert_eq!(session.state(), PlaybackState::Paused);
        assert_eq!(session.position(), 90.0);
    }

    #[test]
    fn test_close_resets() {
        let mut session = playing(false, 754);
        session.handle(PlayerEvent::Tick(60.0));
        let effects = session.handle(PlayerEvent::Close);
        assert_eq!(effects, vec![Effect::Stop, Effect::HideUpgradePrompt]);
        assert_eq!(session, PlaybackSession::new(false));
    }
}
