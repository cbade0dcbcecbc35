//! Shared doubles for the HTTP integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use gw2_build::domain::ports::{BuildEvent, BuildEvents, GameDataSource, GameDataSourceError};
use gw2_build::domain::{ApiCredential, ResourceId, ResourceKind};

/// Clock that only moves when a test advances it.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    pub fn at_reference_time() -> Self {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid reference time");
        Self(Mutex::new(now))
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).expect("duration fits");
        *self.0.lock().expect("clock mutex") += delta;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// Character record referencing one resource of every kind.
pub fn alice_record() -> Value {
    json!({
        "name": "Alice",
        "profession": "Guardian",
        "equipment": [{ "id": 100, "skin": 900, "upgrades": [24836] }],
        "equipment_pvp": { "amulet": 5, "rune": null },
        "skills": { "pve": { "heal": 9102, "utilities": [9084], "elite": 30273 } },
        "specializations": { "pve": [{ "id": 42, "traits": [1686] }] },
        "recipes": [1, 2, 3],
        "bags": []
    })
}

/// Scripted game-data API.
///
/// Every bulk lookup echoes `{ "id": n }` for each requested identifier. A
/// configurable delay applies to the character list, and a rejection status
/// makes that call fail instead.
pub struct ScriptedGameData {
    characters: Vec<Value>,
    delay: Mutex<Duration>,
    reject_with: Mutex<Option<u16>>,
    character_calls: AtomicUsize,
}

impl ScriptedGameData {
    pub fn new(characters: Vec<Value>) -> Self {
        Self {
            characters,
            delay: Mutex::new(Duration::ZERO),
            reject_with: Mutex::new(None),
            character_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("delay mutex") = delay;
    }

    pub fn reject_with(&self, status: u16) {
        *self.reject_with.lock().expect("reject mutex") = Some(status);
    }

    pub fn character_calls(&self) -> usize {
        self.character_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameDataSource for ScriptedGameData {
    async fn fetch_characters(
        &self,
        _credential: &ApiCredential,
    ) -> Result<Vec<Value>, GameDataSourceError> {
        self.character_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().expect("delay mutex");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let rejection = *self.reject_with.lock().expect("reject mutex");
        match rejection {
            Some(status) => Err(GameDataSourceError::rejected(status, "scripted rejection")),
            None => Ok(self.characters.clone()),
        }
    }

    async fn fetch_many(
        &self,
        _kind: ResourceKind,
        ids: &[ResourceId],
        _credential: &ApiCredential,
    ) -> Result<Vec<Value>, GameDataSourceError> {
        Ok(ids.iter().map(|id| json!({ "id": id })).collect())
    }

    async fn fetch_one(
        &self,
        _kind: ResourceKind,
        id: ResourceId,
        _credential: &ApiCredential,
    ) -> Result<Value, GameDataSourceError> {
        Ok(json!({ "id": id, "name": "Amulet" }))
    }
}

/// Sink remembering event tags in order.
#[derive(Default)]
pub struct RecordedEvents(Mutex<Vec<&'static str>>);

impl RecordedEvents {
    pub fn tags(&self) -> Vec<&'static str> {
        self.0.lock().expect("events mutex").clone()
    }
}

impl BuildEvents for RecordedEvents {
    fn record(&self, event: &BuildEvent) {
        self.0.lock().expect("events mutex").push(event.tag());
    }
}

/// Shared handle pairing a scripted source with the recorded events.
pub struct Harness {
    pub source: Arc<ScriptedGameData>,
    pub events: Arc<RecordedEvents>,
    pub clock: Arc<SteppingClock>,
}

impl Harness {
    pub fn new(characters: Vec<Value>) -> Self {
        Self {
            source: Arc::new(ScriptedGameData::new(characters)),
            events: Arc::new(RecordedEvents::default()),
            clock: Arc::new(SteppingClock::at_reference_time()),
        }
    }
}
