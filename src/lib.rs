// Library side of the client: data, search, selection and state updates.
// The terminal front-end lives in the binary.
pub mod models;
pub mod directory;  // Built-in sample contacts, chats and messages
pub mod filter;
pub mod selection;
pub mod dialog;
pub mod forms;
pub mod settings;
pub mod state;

// Re-export main types for convenience
pub use models::*;
pub use state::{Action, AppState, Effect};
