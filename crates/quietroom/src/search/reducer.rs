//! Folding per-building availability responses into one search result.
//!
//! Each search is tagged with a generation. Responses are applied as
//! [`SearchEvent`]s; anything tagged with a generation other than the
//! current one belongs to a superseded search and is dropped, so a late
//! response can never leak into a newer result.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::state::LoadState;
use crate::upstream::AvailabilityQuery;

/// A free room row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableRoom {
    #[serde(rename = "Building")]
    pub building: String,

    #[serde(rename = "RoomNumber")]
    pub room_number: String,

    /// Row key only
    pub id: Uuid,
}

/// A building whose availability request failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingFailure {
    pub building: String,
    pub reason: String,
}

/// Something that happened to an availability search.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A new search was submitted
    Started {
        generation: u64,
        query: AvailabilityQuery,
        buildings: Vec<String>,
    },
    /// One building answered
    BuildingResolved {
        generation: u64,
        building: String,
        rooms: Vec<String>,
    },
    /// One building's request failed
    BuildingFailed {
        generation: u64,
        building: String,
        reason: String,
    },
}

impl SearchEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SearchEvent::Started { generation, .. }
            | SearchEvent::BuildingResolved { generation, .. }
            | SearchEvent::BuildingFailed { generation, .. } => *generation,
        }
    }
}

/// Accumulated result of the latest availability search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySearch {
    generation: u64,
    query: Option<AvailabilityQuery>,
    building_count: usize,
    pending: BTreeSet<String>,
    /// Sorted by building, then room number
    rooms: Vec<AvailableRoom>,
    failures: Vec<BuildingFailure>,
}

impl AvailabilitySearch {
    /// Applies one event and returns the new result.
    pub fn apply(mut self, event: SearchEvent) -> Self {
        match event {
            SearchEvent::Started {
                generation,
                query,
                buildings,
            } => {
                if generation <= self.generation {
                    debug!(generation, current = self.generation, "Dropping stale search start");
                    return self;
                }
                let pending: BTreeSet<String> = buildings.into_iter().collect();
                Self {
                    generation,
                    query: Some(query),
                    building_count: pending.len(),
                    pending,
                    rooms: Vec::new(),
                    failures: Vec::new(),
                }
            }
            SearchEvent::BuildingResolved {
                generation,
                building,
                rooms,
            } => {
                if generation != self.generation || !self.pending.remove(&building) {
                    debug!(generation, building = %building, "Dropping stale availability response");
                    return self;
                }
                for room_number in rooms {
                    self.insert_room(AvailableRoom {
                        building: building.clone(),
                        room_number,
                        id: Uuid::new_v4(),
                    });
                }
                self
            }
            SearchEvent::BuildingFailed {
                generation,
                building,
                reason,
            } => {
                if generation != self.generation || !self.pending.remove(&building) {
                    debug!(generation, building = %building, "Dropping stale availability failure");
                    return self;
                }
                self.failures.push(BuildingFailure { building, reason });
                self.failures.sort_by(|a, b| a.building.cmp(&b.building));
                self
            }
        }
    }

    fn insert_room(&mut self, room: AvailableRoom) {
        let at = self.rooms.partition_point(|r| {
            (r.building.as_str(), r.room_number.as_str())
                <= (room.building.as_str(), room.room_number.as_str())
        });
        self.rooms.insert(at, room);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> Option<&AvailabilityQuery> {
        self.query.as_ref()
    }

    pub fn rooms(&self) -> &[AvailableRoom] {
        &self.rooms
    }

    pub fn failures(&self) -> &[BuildingFailure] {
        &self.failures
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Buildings that have not answered yet, in name order.
    pub fn pending_buildings(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.generation > 0 && self.pending.is_empty()
    }

    /// The result as a loading state.
    ///
    /// A search where every building failed is an error; partial failures
    /// still load whatever the other buildings returned.
    pub fn status(&self) -> LoadState<Vec<AvailableRoom>> {
        if self.generation == 0 {
            LoadState::Empty
        } else if !self.pending.is_empty() {
            LoadState::Loading
        } else if self.building_count > 0 && self.failures.len() == self.building_count {
            LoadState::Error(format!(
                "All {} availability requests failed",
                self.building_count
            ))
        } else {
            LoadState::Loaded(self.rooms.clone())
        }
    }

    /// Serializable view for API responses.
    pub fn view(&self) -> SearchView<'_> {
        SearchView {
            generation: self.generation,
            query: self.query.as_ref(),
            pending: self.pending.len(),
            state: self.status(),
            failures: &self.failures,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView<'a> {
    pub generation: u64,
    pub query: Option<&'a AvailabilityQuery>,
    pub pending: usize,
    pub state: LoadState<Vec<AvailableRoom>>,
    pub failures: &'a [BuildingFailure],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> AvailabilityQuery {
        AvailabilityQuery {
            day: "M".to_string(),
            start_time: "1000".to_string(),
            end_time: "1200".to_string(),
        }
    }

    fn started(generation: u64, buildings: &[&str]) -> SearchEvent {
        SearchEvent::Started {
            generation,
            query: query(),
            buildings: buildings.iter().map(|b| b.to_string()).collect(),
        }
    }

    fn resolved(generation: u64, building: &str, rooms: &[&str]) -> SearchEvent {
        SearchEvent::BuildingResolved {
            generation,
            building: building.to_string(),
            rooms: rooms.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn pairs(search: &AvailabilitySearch) -> Vec<(String, String)> {
        search
            .rooms()
            .iter()
            .map(|r| (r.building.clone(), r.room_number.clone()))
            .collect()
    }

    #[test]
    fn test_results_sorted_regardless_of_arrival() {
        let search = AvailabilitySearch::default()
            .apply(started(1, &["SST", "OKT"]))
            .apply(resolved(1, "SST", &["201", "105"]))
            .apply(resolved(1, "OKT", &["N155"]));

        assert!(search.is_complete());
        assert_eq!(
            pairs(&search),
            vec![
                ("OKT".to_string(), "N155".to_string()),
                ("SST".to_string(), "105".to_string()),
                ("SST".to_string(), "201".to_string()),
            ]
        );
        assert!(search.status().is_loaded());
    }

    #[test]
    fn test_loading_until_all_buildings_answer() {
        let search = AvailabilitySearch::default()
            .apply(started(1, &["SST", "OKT"]))
            .apply(resolved(1, "OKT", &[]));

        assert_eq!(search.pending(), 1);
        assert_eq!(search.status(), LoadState::Loading);
        assert_eq!(AvailabilitySearch::default().status(), LoadState::Empty);
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let search = AvailabilitySearch::default()
            .apply(started(1, &["OKT"]))
            .apply(started(2, &["OKT"]))
            .apply(resolved(1, "OKT", &["N155"]))
            .apply(resolved(2, "OKT", &["N160"]));

        assert_eq!(search.generation(), 2);
        assert_eq!(pairs(&search), vec![("OKT".to_string(), "N160".to_string())]);

        // An old start cannot roll the search back
        let search = search.apply(started(1, &["SST"]));
        assert_eq!(search.generation(), 2);
    }

    #[test]
    fn test_duplicate_response_is_ignored() {
        let search = AvailabilitySearch::default()
            .apply(started(1, &["OKT", "SST"]))
            .apply(resolved(1, "OKT", &["N155"]))
            .apply(resolved(1, "OKT", &["N155"]));

        assert_eq!(search.rooms().len(), 1);
        assert_eq!(search.pending(), 1);
    }

    #[test]
    fn test_failures() {
        let failed = |building: &str| SearchEvent::BuildingFailed {
            generation: 1,
            building: building.to_string(),
            reason: "Network error: timed out".to_string(),
        };

        let partial = AvailabilitySearch::default()
            .apply(started(1, &["OKT", "SST"]))
            .apply(failed("SST"))
            .apply(resolved(1, "OKT", &["N155"]));
        assert_eq!(partial.failures().len(), 1);
        assert_eq!(partial.status().data().map(|r| r.len()), Some(1));

        let total = AvailabilitySearch::default()
            .apply(started(1, &["OKT", "SST"]))
            .apply(failed("SST"))
            .apply(failed("OKT"));
        assert!(matches!(total.status(), LoadState::Error(_)));
        assert_eq!(total.failures()[0].building, "OKT");
    }

    #[test]
    fn test_no_buildings_loads_empty() {
        let search = AvailabilitySearch::default().apply(started(1, &[]));
        assert_eq!(search.status(), LoadState::Loaded(vec![]));
    }
}
