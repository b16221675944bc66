//! Note capture.
//!
//! Notes are stored as a JSON array under the `notes` key of a [`KvStore`],
//! oldest first.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::skills::{require_str, Skill, SkillResult};
use crate::store::{run_blocking, KvStore, StoreError};

/// Store key of the note list.
pub const NOTES_KEY: &str = "notes";

/// One saved note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Handles `save_note`, `read_notes` and `clear_notes`.
///
/// Store access runs on the blocking pool; the lock serializes the
/// load-append-store cycle of `save_note`.
pub struct NoteSkill {
    store: Arc<dyn KvStore>,
    write_lock: Arc<Mutex<()>>,
}

impl NoteSkill {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All saved notes, oldest first.
    pub async fn notes(&self) -> Result<Vec<Note>, StoreError> {
        run_blocking(&self.store, &self.write_lock, load_notes).await
    }
}

fn load_notes(store: &dyn KvStore) -> Result<Vec<Note>, StoreError> {
    match store.get(NOTES_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

fn append_note(store: &dyn KvStore, text: String) -> Result<usize, StoreError> {
    let mut notes = load_notes(store)?;
    notes.push(Note {
        text,
        created_at: Utc::now(),
    });
    store.set(NOTES_KEY, &serde_json::to_string(&notes)?)?;
    Ok(notes.len())
}

impl std::fmt::Debug for NoteSkill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteSkill").finish_non_exhaustive()
    }
}

#[async_trait]
impl Skill for NoteSkill {
    fn name(&self) -> &str {
        "notes"
    }

    fn verbs(&self) -> &[&'static str] {
        &["save_note", "read_notes", "clear_notes"]
    }

    async fn handle(&self, command: &Command) -> SkillResult {
        match command.verb().as_str() {
            "read_notes" => {
                let notes = self.notes().await?;
                if notes.is_empty() {
                    return Ok(Some("no notes".to_string()));
                }
                let lines: Vec<&str> = notes.iter().map(|n| n.text.as_str()).collect();
                Ok(Some(lines.join("\n")))
            }
            "clear_notes" => {
                run_blocking(&self.store, &self.write_lock, |store| store.remove(NOTES_KEY))
                    .await?;
                Ok(None)
            }
            _ => {
                let text = require_str(command, "text")?.to_string();
                let saved = text.clone();
                let total = run_blocking(&self.store, &self.write_lock, move |store| {
                    append_note(store, saved)
                })
                .await?;
                log::debug!("Notes: saved note #{}", total);
                Ok(Some(format!("Saved note: {}", text)))
            }
        }
    }
}
