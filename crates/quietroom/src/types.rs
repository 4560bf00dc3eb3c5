use crate::config::Config;
use crate::schedule::LayoutOptions;
use crate::search::SearchSessions;
use crate::upstream::{QuietRoomClient, QuietRoomError};

/// State shared by every request handler.
pub struct RoomFinderState {
    pub config: Config,
    /// Client for the QuietRoom API
    pub client: QuietRoomClient,
    /// Latest availability search of every session
    pub sessions: SearchSessions,
    /// Week grid geometry, resolved from the config once
    pub layout: LayoutOptions,
}

impl RoomFinderState {
    pub fn new(config: Config) -> Result<Self, QuietRoomError> {
        let client = QuietRoomClient::with_config(config.client_config())?;
        let layout = config.layout_options();
        let sessions = SearchSessions::with_ttl(config.session_ttl());

        Ok(Self {
            config,
            client,
            sessions,
            layout,
        })
    }
}
