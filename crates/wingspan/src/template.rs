//! Built-in catalog and checklist templates.
//!
//! Templates are read-only inputs: the catalog store copies the aircraft list
//! on first run, and checklist handles synthesize a fresh section sequence
//! from a [`ChecklistTemplate`] whenever a checklist is created or reset.

use crate::model::{Aircraft, ChecklistItem, ChecklistSection};

/// Source of default checklist content.
///
/// Every call must return a new sequence with fresh section and item
/// identifiers, all items not completed.
pub trait ChecklistTemplate: std::fmt::Debug + Send + Sync {
    /// Build a fresh default checklist.
    fn sections(&self) -> Vec<ChecklistSection>;
}

/// The standard pre-flight checklist shared by every aircraft.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreflightTemplate;

impl ChecklistTemplate for PreflightTemplate {
    fn sections(&self) -> Vec<ChecklistSection> {
        PREFLIGHT
            .iter()
            .map(|(title, items)| {
                ChecklistSection::new(
                    *title,
                    items
                        .iter()
                        .map(|(item, description)| ChecklistItem::new(*item, *description))
                        .collect(),
                )
            })
            .collect()
    }
}

type SectionTemplate = (&'static str, &'static [(&'static str, &'static str)]);

const PREFLIGHT: &[SectionTemplate] = &[
    (
        "Preflight Preparation",
        &[
            (
                "Weather Check",
                "Verify current and forecasted weather conditions, including wind, visibility, and precipitation.",
            ),
            (
                "Flight Plan",
                "Ensure the flight plan is filed, reviewed, and includes all necessary waypoints and alternates.",
            ),
            (
                "Aircraft Documents",
                "Check that required documents (Airworthiness Certificate, Registration, POH) are on board.",
            ),
            (
                "Weight & Balance",
                "Calculate and confirm that the aircraft's weight and balance are within limits for the flight.",
            ),
        ],
    ),
    (
        "Cabin Check",
        &[
            (
                "Seat Belts",
                "Inspect seat belts for condition and ensure they are securely fastened and operational.",
            ),
            (
                "Control Movements",
                "Verify free and correct movement of the yoke and rudder pedals, checking for any binding or issues.",
            ),
            (
                "Fuel Selector",
                "Ensure the fuel selector is set to \"Both\" and functioning properly.",
            ),
            (
                "Circuit Breakers",
                "Check that all circuit breakers are in and none are popped; investigate any anomalies.",
            ),
        ],
    ),
    (
        "External Checks",
        &[
            (
                "Left Wing",
                "Inspect the left wing for damage, ice, or debris; check flaps, aileron, and lights for condition.",
            ),
            (
                "Right Wing",
                "Inspect the right wing for damage, ice, or debris; check flaps, aileron, and lights for condition.",
            ),
            (
                "Fuel Levels",
                "Visually check fuel levels in both tanks, ensure caps are secure, and verify no contamination.",
            ),
            (
                "Oil Level",
                "Check the engine oil level via the dipstick, ensuring it's within the recommended range (6-8 qts).",
            ),
            (
                "Tire Condition",
                "Inspect tires for proper inflation, wear, and any visible damage; ensure no flat spots or cuts.",
            ),
        ],
    ),
];

/// (model name, manufacturer, image)
const CATALOG: &[(&str, &str, &str)] = &[
    ("172 Skyhawk", "Cessna", "cessna172"),
    ("152", "Cessna", "cessna152"),
    ("182 Skylane", "Cessna", "cessna182"),
    ("206 Stationair", "Cessna", "cessna206"),
    ("Citation M2", "Cessna", "cessnam2"),
    ("TBM 930", "Daher", "dahertbm930"),
    ("TBM 910", "Daher", "dahertbm910"),
    ("Bonanza V35", "Beechcraft", "beechcraftv35"),
    ("Baron G58", "Beechcraft", "beechcraftg58"),
    ("King Air C90", "Beechcraft", "beechcraftc90"),
    ("T-34 Mentor", "Beechcraft", "beechcraftt34"),
    ("DA62", "Diamond", "diamondda62"),
    ("DA40 NG", "Diamond", "diamondda40"),
    ("DA20 Eclipse", "Diamond", "diamondda20"),
    ("Archer TX", "Piper", "piperarcher"),
    ("Seneca V", "Piper", "piperseneca"),
    ("M350", "Piper", "piperm350"),
    ("Warrior III", "Piper", "piperwarrior"),
    ("SR22 G6", "Cirrus", "cirrussr22"),
    ("SR20", "Cirrus", "cirrussr20"),
    ("PC-12 NGX", "Pilatus", "pilatuspc12"),
    ("M20V Acclaim", "Mooney", "mooneym20"),
    ("RV-10", "Vans", "vansrv10"),
    ("G120A", "Grob", "grobg120"),
    ("EA 400", "Extra", "extra400"),
];

/// The fixed aircraft catalog used on first run and on catalog reset.
#[must_use]
pub fn default_aircraft() -> Vec<Aircraft> {
    CATALOG
        .iter()
        .map(|(model, manufacturer, image)| Aircraft::new(*model, *manufacturer, *image))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::ItemStatus;

    #[test]
    fn test_preflight_shape() {
        let sections = PreflightTemplate.sections();
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Preflight Preparation", "Cabin Check", "External Checks"]
        );

        let counts: Vec<_> = sections.iter().map(|s| s.items.len()).collect();
        assert_eq!(counts, [4, 4, 5]);
    }

    #[test]
    fn test_preflight_items_start_not_completed() {
        let sections = PreflightTemplate.sections();
        assert!(sections
            .iter()
            .flat_map(|s| &s.items)
            .all(|i| i.status == ItemStatus::NotCompleted));
    }

    #[test]
    fn test_preflight_ids_are_fresh_per_call() {
        let first = PreflightTemplate.sections();
        let second = PreflightTemplate.sections();
        for (a, b) in first.iter().zip(&second) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.title, b.title);
        }
    }

    #[test]
    fn test_default_aircraft_ids_unique() {
        let aircraft = default_aircraft();
        assert_eq!(aircraft.len(), 25);

        let ids: HashSet<_> = aircraft.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), aircraft.len());
    }

    #[test]
    fn test_default_aircraft_stable_across_calls() {
        assert_eq!(default_aircraft(), default_aircraft());
    }
}
