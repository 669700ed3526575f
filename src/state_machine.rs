//! Conversation state machines
//!
//! Pure transitions for menu traversal and form collection. Nothing in here
//! performs I/O: transitions return drafts to send and effects to persist,
//! and the runtime carries them out.

mod effect;
pub mod form;
pub mod state;
pub mod traversal;


pub use effect::{Effect, OptionsPatch};
pub use state::{
    upsert_profile, ConversationFormState, ConversationState, Draft, ProfileEntry, RoomOptions,
    Routing,
};
pub use traversal::{resolve_next, NavigationCommands, TraversalError};
