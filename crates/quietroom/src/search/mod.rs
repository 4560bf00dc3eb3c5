//! Search state: loading states and the availability search reducer.
mod reducer;
mod session;
mod state;

pub use reducer::{AvailabilitySearch, AvailableRoom, BuildingFailure, SearchEvent, SearchView};
pub use session::{SearchGuard, SearchSessions, SessionKey, ABANDONED_REASON, DEFAULT_SESSION_TTL};
pub use state::LoadState;
