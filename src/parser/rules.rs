//! Keyword heuristics for natural-language input.

use serde::{Deserialize, Serialize};

use crate::command::Command;

/// Verb emitted for emergency phrases.
pub const SOS_VERB: &str = "sos_send";
/// Verb emitted for music phrases.
pub const MUSIC_VERB: &str = "music_play";
/// Verb emitted for note phrases, and the default fallback.
pub const NOTE_VERB: &str = "save_note";

/// Keyword sets used to classify natural-language input.
///
/// Rules are checked in a fixed order and the first match wins:
/// SOS, then music, then note, then the fallback verb.
/// All keywords are compared against the lower-cased input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlRules {
    pub sos_keywords: Vec<String>,
    /// Prefixes that mark a play request ("play ...").
    pub play_prefixes: Vec<String>,
    pub music_keywords: Vec<String>,
    pub note_keywords: Vec<String>,
    /// Verb for input no keyword matched. Receives the text under `text`.
    pub fallback_verb: String,
}

impl Default for NlRules {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            sos_keywords: owned(&["sos", "emergency", "help me", "救命", "紧急"]),
            play_prefixes: owned(&["play", "播放"]),
            music_keywords: owned(&["music", "song", "playlist", "音乐", "歌曲"]),
            note_keywords: owned(&["note", "memo", "jot down", "笔记", "备忘", "メモ"]),
            fallback_verb: NOTE_VERB.to_string(),
        }
    }
}

impl NlRules {
    /// Classify already-trimmed input into a single command.
    pub fn interpret(&self, trimmed: &str) -> Command {
        let lower = trimmed.to_lowercase();

        if self.sos_keywords.iter().any(|k| contains_word(&lower, k)) {
            log::debug!("Keyword rule: sos");
            return Command::new(SOS_VERB).with_arg("message", trimmed);
        }

        if self.play_prefixes.iter().any(|p| starts_with_word(&lower, p))
            || contains_any(&lower, &self.music_keywords)
        {
            log::debug!("Keyword rule: music");
            return Command::new(MUSIC_VERB).with_arg("query", trimmed);
        }

        if contains_any(&lower, &self.note_keywords) {
            log::debug!("Keyword rule: note");
            return Command::new(NOTE_VERB).with_arg("text", trimmed);
        }

        log::debug!("Keyword rule: fallback '{}'", self.fallback_verb);
        Command::new(self.fallback_verb.clone()).with_arg("text", trimmed)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(n.to_lowercase().as_str()))
}

/// `needle` occurs in `text` with no ASCII letter or digit on either side,
/// so "help me" matches "please help me!" but not "help mend the fence".
/// Non-Latin keywords have no such neighbours and match as substrings.
fn contains_word(text: &str, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    text.match_indices(needle.as_str()).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + needle.len()..].chars().next();
        !before.map_or(false, |c| c.is_ascii_alphanumeric())
            && !after.map_or(false, |c| c.is_ascii_alphanumeric())
    })
}

/// `prefix` at the start of `text`, not followed by an ASCII letter or digit,
/// so "play jazz" matches and "playground" does not.
fn starts_with_word(text: &str, prefix: &str) -> bool {
    let prefix = prefix.to_lowercase();
    if prefix.is_empty() {
        return false;
    }
    match text.strip_prefix(prefix.as_str()) {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_alphanumeric()),
        None => false,
    }
}
