pub mod clock;
pub mod model;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{CommandState, MAX_ANGLE, MOTOR_COUNT, Note, Role, SensorSample, Vector3};

/// Durable, append-only destination for every accepted sample.
pub trait SampleSink: Send + Sync {
    fn append(
        &self,
        sample: &SensorSample,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Durable store of therapist notes.
pub trait NoteStore: Send + Sync {
    fn append(&self, note: &Note) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Up to `limit` notes, newest first.
    fn recent(
        &self,
        limit: usize,
    ) -> Result<Vec<Note>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Durable copy of the single command record.
pub trait CommandPersistence: Send + Sync {
    fn load(&self) -> Result<Option<CommandState>, Box<dyn std::error::Error + Send + Sync>>;
    fn save(
        &self,
        state: &CommandState,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// View of the current caller's session, owned by the auth collaborator.
pub trait Authorizer {
    fn is_authenticated(&self) -> bool;
    fn role(&self) -> Option<Role>;
    fn username(&self) -> Option<&str>;

    fn is_therapist(&self) -> bool {
        self.is_authenticated() && self.role() == Some(Role::Therapist)
    }
}
