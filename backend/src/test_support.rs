//! Doubles shared by unit tests across the crate.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{BuildEvent, BuildEvents};

/// Hand-cranked clock starting at 2026-03-01 12:00 UTC.
pub struct MutableClock {
    now: Mutex<DateTime<Utc>>,
}

impl MutableClock {
    pub fn at_reference_time() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let step = TimeDelta::from_std(by).expect("step fits in a TimeDelta");
        *self.now.lock().expect("clock lock") += step;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().into()
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Sink keeping every event in arrival order.
#[derive(Default)]
pub struct RecordingEvents {
    seen: Mutex<Vec<BuildEvent>>,
}

impl RecordingEvents {
    pub fn recorded(&self) -> Vec<BuildEvent> {
        self.seen.lock().expect("events lock").clone()
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.seen
            .lock()
            .expect("events lock")
            .iter()
            .map(BuildEvent::tag)
            .collect()
    }
}

impl BuildEvents for RecordingEvents {
    fn record(&self, event: &BuildEvent) {
        self.seen.lock().expect("events lock").push(event.clone());
    }
}
