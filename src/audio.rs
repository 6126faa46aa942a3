//! Fire-and-forget sound cues. Nothing here is allowed to fail loudly.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlAudioElement;

use crate::error::SiteError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Hover,
    Secret,
    Ambient,
}

impl AudioCue {
    pub const ALL: [AudioCue; 3] = [AudioCue::Hover, AudioCue::Secret, AudioCue::Ambient];

    /// Id of the `<audio>` element carrying this cue.
    pub fn element_id(self) -> &'static str {
        match self {
            AudioCue::Hover => "hoverSound",
            AudioCue::Secret => "secretSound",
            AudioCue::Ambient => "ambientSound",
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), SiteError>;

    /// Play and swallow the failure after logging it.
    fn cue(&mut self, cue: AudioCue) {
        if let Err(e) = self.play(cue) {
            log::warn!("{cue:?} sound failed to play: {e}");
        }
    }
}

/// Plays the page's `<audio>` elements.
pub struct HtmlAudioSink {
    document: web_sys::Document,
}

impl HtmlAudioSink {
    pub const AMBIENT_VOLUME: f64 = 0.15;

    pub fn new(document: web_sys::Document) -> Self {
        if let Some(ambient) = find(&document, AudioCue::Ambient) {
            ambient.set_volume(Self::AMBIENT_VOLUME);
        }
        Self { document }
    }
}

fn find(document: &web_sys::Document, cue: AudioCue) -> Option<HtmlAudioElement> {
    document.get_element_by_id(cue.element_id())?.dyn_into().ok()
}

impl AudioSink for HtmlAudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), SiteError> {
        let el = find(&self.document, cue).ok_or(SiteError::MissingElement(cue.element_id()))?;
        match cue {
            // HAVE_CURRENT_DATA or better, otherwise the tick would lag the hover.
            AudioCue::Hover if el.ready_state() < 2 => return Ok(()),
            AudioCue::Hover => el.set_current_time(0.0),
            AudioCue::Ambient if !el.paused() => return Ok(()),
            _ => {}
        }
        // Autoplay and decode failures arrive later as a rejected promise.
        let playing = el.play()?;
        spawn_local(async move {
            if let Err(e) = JsFuture::from(playing).await {
                log::warn!("{cue:?} sound failed to play: {}", SiteError::from(e));
            }
        });
        Ok(())
    }
}

/// Collects cues instead of playing them.
#[derive(Default, Debug)]
pub struct RecordingAudio {
    pub played: Vec<AudioCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), SiteError> {
        self.played.push(cue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl AudioSink for Broken {
        fn play(&mut self, cue: AudioCue) -> Result<(), SiteError> {
            Err(SiteError::MissingElement(cue.element_id()))
        }
    }

    #[test]
    fn failures_are_swallowed() {
        let mut sink = Broken;
        sink.cue(AudioCue::Secret);
    }

    #[test]
    fn every_cue_has_its_own_element() {
        let ids: Vec<&str> = AudioCue::ALL.iter().map(|c| c.element_id()).collect();
        assert_eq!(ids, ["hoverSound", "secretSound", "ambientSound"]);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingAudio::default();
        sink.cue(AudioCue::Hover);
        sink.cue(AudioCue::Secret);
        assert_eq!(sink.played, vec![AudioCue::Hover, AudioCue::Secret]);
    }
}
