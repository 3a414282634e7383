//! In-memory stores: time-limited session registry and identity profiles.

mod profile;
mod session;

pub use profile::{Profile, ProfileStore};
pub use session::{
    EventIn, EventPayload, EventRecord, SessionDetail, SessionStore, SessionSummary,
};
