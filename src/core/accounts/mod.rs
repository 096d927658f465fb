pub mod model;
pub mod store;

pub use model::{Credential, SaveOutcome};
pub use store::{active_index_after_removal, clamp_active_index, AccountStore};
