//! Loading state of a search result.

use serde::Serialize;

use crate::upstream::QuietRoomError;

/// Where a search result currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum LoadState<T> {
    /// Nothing has been searched yet
    Empty,
    /// A request is in flight
    Loading,
    /// The request finished with data
    Loaded(T),
    /// The requested room or building does not exist
    NotFound,
    /// The request failed for any other reason
    Error(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Empty
    }
}

impl<T> LoadState<T> {
    /// A new request was sent. Valid from every state.
    pub fn begin(&mut self) {
        *self = LoadState::Loading;
    }

    /// The request finished. Valid from every state.
    pub fn resolve(&mut self, result: Result<T, QuietRoomError>) {
        *self = LoadState::from(result);
    }

    /// Forget the current result. Valid from every state.
    pub fn reset(&mut self) {
        *self = LoadState::Empty;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> LoadState<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            LoadState::Empty => LoadState::Empty,
            LoadState::Loading => LoadState::Loading,
            LoadState::Loaded(data) => LoadState::Loaded(f(data)),
            LoadState::NotFound => LoadState::NotFound,
            LoadState::Error(reason) => LoadState::Error(reason),
        }
    }
}

impl<T> From<Result<T, QuietRoomError>> for LoadState<T> {
    fn from(result: Result<T, QuietRoomError>) -> Self {
        match result {
            Ok(data) => LoadState::Loaded(data),
            Err(e) if e.is_not_found() => LoadState::NotFound,
            Err(e) => LoadState::Error(e.to_string()),
        }
    }
}
