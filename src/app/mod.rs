//! Application layer: page state, operations and their follow-ups.
//!
//! # Architecture
//!
//! Data flows one way:
//!
//! ```text
//! Page call → Operation → request body → KbService → retcode
//!                                                      │
//!                  state ← patches ← Actions ← handler ┘
//!                    │
//!                    └──→ watch subscribers / ListViewModel
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Follow-up effects of a successful operation
//! - [`handler`]: Operation catalogue, request shaping and response handling
//! - [`modals`]: Dialog visibility flags
//! - [`refresh`]: Throttled and polling list refresh
//! - [`state`]: Page state and patches
//! - [`store`]: The store tying state, service and notifier together
//! - [`viewmodel`]: Renderable view of the list

pub mod actions;
pub mod handler;
pub mod modals;
pub mod refresh;
pub mod state;
pub mod store;
pub mod viewmodel;

pub use actions::Action;
pub use handler::Operation;
pub use modals::{Modal, ModalFlags};
pub use refresh::{start_poll, PollHandle, Throttle, ThrottledRefresh};
pub use state::{DocumentListing, PageState, Pagination, PaginationPatch, StatePatch, Thumbnails};
pub use store::ListStateStore;
pub use viewmodel::{DocumentRow, ListViewModel};
