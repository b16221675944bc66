//! Skills shipped with the crate.
//!
//! Platform collaborators (audio output, speech, pickers) are out of reach
//! here; these skills keep to what can be done in-process or over HTTP.

pub mod echo;
pub mod fetch;
pub mod music;
pub mod notes;
pub mod sos;

pub use echo::EchoSkill;
pub use fetch::HttpFetchSkill;
pub use music::MusicSkill;
pub use notes::NoteSkill;
pub use sos::SosSkill;
