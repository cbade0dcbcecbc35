//! Reference extraction from a character record.
//!
//! The scan is pure: it reads a sanitised record and reports which resource
//! identifiers the build view needs, plus any blocks the credential's scope
//! left out. Absent blocks and null slots are normal (a narrow token or an
//! empty slot); a block of the wrong shape is a malformed record.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::ResourceId;

/// Record blocks that narrow-scoped credentials may omit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeAnomaly {
    MissingEquipment,
    MissingSkills,
    MissingSpecializations,
}

impl ScopeAnomaly {
    /// Name of the absent record block.
    pub const fn block(self) -> &'static str {
        match self {
            Self::MissingEquipment => "equipment",
            Self::MissingSkills => "skills",
            Self::MissingSpecializations => "specializations",
        }
    }
}

/// Raised when a character record does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed character record: {message}")]
pub struct ReferenceExtractionError {
    message: String,
}

impl ReferenceExtractionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Identifiers referenced by one character record.
///
/// Lists keep first-seen order and may contain duplicates; the fetcher
/// de-duplicates before calling upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterReferences {
    /// Equipped items, their upgrades and infusions, and the PvP rune.
    pub equipment_ids: Vec<ResourceId>,
    pub skin_ids: Vec<ResourceId>,
    /// Heal, utility and elite skills across every game mode.
    pub skill_ids: Vec<ResourceId>,
    pub trait_ids: Vec<ResourceId>,
    pub specialization_ids: Vec<ResourceId>,
    pub amulet_id: Option<ResourceId>,
    pub anomalies: Vec<ScopeAnomaly>,
}

#[derive(Debug, Deserialize)]
struct CharacterView {
    equipment: Option<Vec<Option<EquipmentView>>>,
    equipment_pvp: Option<PvpEquipmentView>,
    skills: Option<BTreeMap<String, Option<SkillBarView>>>,
    specializations: Option<BTreeMap<String, Option<Vec<Option<SpecializationView>>>>>,
}

#[derive(Debug, Deserialize)]
struct EquipmentView {
    id: Option<ResourceId>,
    skin: Option<ResourceId>,
    upgrades: Option<Vec<Option<ResourceId>>>,
    infusions: Option<Vec<Option<ResourceId>>>,
}

#[derive(Debug, Deserialize)]
struct PvpEquipmentView {
    amulet: Option<ResourceId>,
    rune: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
struct SkillBarView {
    heal: Option<ResourceId>,
    utilities: Option<Vec<Option<ResourceId>>>,
    elite: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
struct SpecializationView {
    id: Option<ResourceId>,
    traits: Option<Vec<Option<ResourceId>>>,
}

/// Collect every resource identifier a character record refers to.
///
/// # Examples
/// ```
/// use gw2_build::domain::{ScopeAnomaly, extract_references};
/// use serde_json::json;
///
/// let refs = extract_references(&json!({ "name": "Bob" })).expect("object record");
/// assert!(refs.equipment_ids.is_empty());
/// assert!(refs.anomalies.contains(&ScopeAnomaly::MissingEquipment));
/// ```
pub fn extract_references(record: &Value) -> Result<CharacterReferences, ReferenceExtractionError> {
    if !record.is_object() {
        return Err(ReferenceExtractionError::new("record is not an object"));
    }
    let view = CharacterView::deserialize(record)
        .map_err(|err| ReferenceExtractionError::new(err.to_string()))?;

    let mut refs = CharacterReferences::default();
    collect_equipment(view.equipment, &mut refs);
    if let Some(pvp) = view.equipment_pvp {
        refs.equipment_ids.extend(pvp.rune);
        refs.amulet_id = pvp.amulet;
    }
    collect_skills(view.skills, &mut refs);
    collect_specializations(view.specializations, &mut refs);
    Ok(refs)
}

fn collect_equipment(equipment: Option<Vec<Option<EquipmentView>>>, refs: &mut CharacterReferences) {
    let Some(slots) = equipment else {
        refs.anomalies.push(ScopeAnomaly::MissingEquipment);
        return;
    };
    for item in slots.into_iter().flatten() {
        refs.equipment_ids.extend(item.id);
        refs.equipment_ids
            .extend(item.upgrades.into_iter().flatten().flatten());
        refs.equipment_ids
            .extend(item.infusions.into_iter().flatten().flatten());
        refs.skin_ids.extend(item.skin);
    }
}

fn collect_skills(
    skills: Option<BTreeMap<String, Option<SkillBarView>>>,
    refs: &mut CharacterReferences,
) {
    let Some(modes) = skills else {
        refs.anomalies.push(ScopeAnomaly::MissingSkills);
        return;
    };
    for bar in modes.into_values().flatten() {
        refs.skill_ids.extend(bar.heal);
        refs.skill_ids
            .extend(bar.utilities.into_iter().flatten().flatten());
        refs.skill_ids.extend(bar.elite);
    }
}

fn collect_specializations(
    specializations: Option<BTreeMap<String, Option<Vec<Option<SpecializationView>>>>>,
    refs: &mut CharacterReferences,
) {
    let Some(modes) = specializations else {
        refs.anomalies.push(ScopeAnomaly::MissingSpecializations);
        return;
    };
    for line in modes.into_values().flatten().flatten().flatten() {
        refs.specialization_ids.extend(line.id);
        refs.trait_ids
            .extend(line.traits.into_iter().flatten().flatten());
    }
}
