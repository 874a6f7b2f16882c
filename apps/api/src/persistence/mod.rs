// Persistence bridge: keeps remote storage eventually consistent with the in-memory
// editing state. Saves are debounced, fire-and-forget, last write wins.

pub mod debounce;
pub mod handlers;
pub mod session;
pub mod store;

pub use session::{SessionDeps, SessionRegistry, SyncStatus};
pub use store::{PgResumeStore, ResumeStore, StoreError};
