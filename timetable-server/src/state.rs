use std::sync::Arc;

use timetable_core::Timetable;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    timetable: Arc<Timetable>,
}

impl AppState {
    pub fn new(timetable: Timetable) -> Self {
        AppState {
            timetable: Arc::new(timetable),
        }
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }
}
