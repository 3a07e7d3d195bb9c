//! Snapshot comparison.
//!
//! [`analyze_diff`] pairs entities of two snapshots and lists the properties
//! that differ. Pairing is by `id` first; entities left over on the `to` side
//! then claim the first unclaimed `from` entity with the same `name`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::color::colors_equal;
use crate::scene::{SceneEntity, COLOR_PROPERTIES, NUMERIC_PROPERTIES};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffValue {
    Number(f64),
    Color(String),
}

impl DiffValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DiffValue::Number(n) => Some(*n),
            DiffValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<&str> {
        match self {
            DiffValue::Color(c) => Some(c.as_str()),
            DiffValue::Number(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDiff {
    pub property: String,
    pub from: DiffValue,
    pub to: DiffValue,
    pub is_color: bool,
}

/// A `from`/`to` pair with at least one differing property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedEntity {
    pub from_index: usize,
    pub to_index: usize,
    /// Id of the `to` entity.
    pub id: String,
    pub diffs: Vec<PropertyDiff>,
}

impl MatchedEntity {
    pub fn numeric(&self) -> impl Iterator<Item = &PropertyDiff> {
        self.diffs.iter().filter(|d| !d.is_color)
    }

    pub fn colors(&self) -> impl Iterator<Item = &PropertyDiff> {
        self.diffs.iter().filter(|d| d.is_color)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDiff {
    pub matched: Vec<MatchedEntity>,
    /// Indices into `to` of entities without a counterpart.
    pub added: Vec<usize>,
    /// Indices into `from` of entities without a counterpart.
    pub removed: Vec<usize>,
}

impl SceneDiff {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// Total number of differing properties across matched entities.
    pub fn property_count(&self) -> usize {
        self.matched.iter().map(|m| m.diffs.len()).sum()
    }
}

pub fn analyze_diff(from: &[SceneEntity], to: &[SceneEntity]) -> SceneDiff {
    let mut claimed = vec![false; from.len()];
    let mut pairs: Vec<Option<usize>> = vec![None; to.len()];

    let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(from.len());
    for (i, entity) in from.iter().enumerate() {
        if !entity.id.is_empty() {
            by_id.entry(entity.id.as_str()).or_insert(i);
        }
    }
    for (j, entity) in to.iter().enumerate() {
        if let Some(&i) = by_id.get(entity.id.as_str()) {
            if !claimed[i] {
                claimed[i] = true;
                pairs[j] = Some(i);
            }
        }
    }

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, entity) in from.iter().enumerate() {
        if !claimed[i] && !entity.name.is_empty() {
            by_name.entry(entity.name.as_str()).or_default().push(i);
        }
    }
    for (j, entity) in to.iter().enumerate() {
        if pairs[j].is_some() {
            continue;
        }
        let Some(candidates) = by_name.get(entity.name.as_str()) else {
            continue;
        };
        if let Some(&i) = candidates.iter().find(|&&i| !claimed[i]) {
            claimed[i] = true;
            pairs[j] = Some(i);
        }
    }

    let mut diff = SceneDiff::default();
    for (j, pair) in pairs.iter().enumerate() {
        match pair {
            Some(i) => {
                let diffs = diff_entities(&from[*i], &to[j]);
                if !diffs.is_empty() {
                    diff.matched.push(MatchedEntity {
                        from_index: *i,
                        to_index: j,
                        id: to[j].id.clone(),
                        diffs,
                    });
                }
            }
            None => diff.added.push(j),
        }
    }
    diff.removed = (0..from.len()).filter(|&i| !claimed[i]).collect();

    log::trace!(
        "scene diff: {} matched ({} properties), {} added, {} removed",
        diff.matched.len(),
        diff.property_count(),
        diff.added.len(),
        diff.removed.len()
    );
    diff
}

/// Differing allow-listed properties of one pair. A numeric property missing
/// on one side compares against its default; a color must exist on both.
pub fn diff_entities(from: &SceneEntity, to: &SceneEntity) -> Vec<PropertyDiff> {
    let mut diffs = Vec::new();
    for property in NUMERIC_PROPERTIES {
        if from.number(property).is_none() && to.number(property).is_none() {
            continue;
        }
        let (a, b) = (from.number_or_default(property), to.number_or_default(property));
        if a != b {
            diffs.push(PropertyDiff {
                property: property.to_string(),
                from: DiffValue::Number(a),
                to: DiffValue::Number(b),
                is_color: false,
            });
        }
    }
    for property in COLOR_PROPERTIES {
        let (Some(a), Some(b)) = (from.color(property), to.color(property)) else {
            continue;
        };
        if !colors_equal(a, b) {
            diffs.push(PropertyDiff {
                property: property.to_string(),
                from: DiffValue::Color(a.to_string()),
                to: DiffValue::Color(b.to_string()),
                is_color: true,
            });
        }
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str) -> SceneEntity {
        SceneEntity::new(id)
            .with_name("Card")
            .with_size(100.0, 50.0)
    }

    #[test]
    fn identical_snapshots_have_no_diff() {
        let scene = vec![card("a").with_color("fill", "#fff"), card("b")];
        assert!(analyze_diff(&scene, &scene).is_empty());
    }

    #[test]
    fn single_property_change() {
        let from = vec![card("a"), card("b")];
        let to = vec![card("a"), card("b").with_position(30.0, 0.0)];
        let diff = analyze_diff(&from, &to);
        assert_eq!(diff.matched.len(), 1);
        let m = &diff.matched[0];
        assert_eq!((m.from_index, m.to_index), (1, 1));
        assert_eq!(
            m.diffs,
            vec![PropertyDiff {
                property: "x".into(),
                from: DiffValue::Number(0.0),
                to: DiffValue::Number(30.0),
                is_color: false,
            }]
        );
    }

    #[test]
    fn missing_numeric_side_uses_default() {
        let from = vec![card("a")];
        let to = vec![card("a").with_number("opacity", 0.25).with_number("rotation", 0.0)];
        let diff = analyze_diff(&from, &to);
        let props: Vec<_> = diff.matched[0].diffs.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(props, vec!["opacity"]);
        assert_eq!(diff.matched[0].diffs[0].from, DiffValue::Number(1.0));
    }

    #[test]
    fn one_sided_color_is_not_diffed() {
        let from = vec![card("a")];
        let to = vec![card("a").with_color("stroke", "#123")];
        assert!(analyze_diff(&from, &to).is_empty());
    }

    #[test]
    fn id_beats_name() {
        let from = vec![card("x").with_position(1.0, 0.0), card("y")];
        let to = vec![card("y").with_position(2.0, 0.0)];
        let diff = analyze_diff(&from, &to);
        assert_eq!(diff.matched[0].from_index, 1);
        assert_eq!(diff.removed, vec![0]);
        assert!(diff.added.is_empty());
    }

    #[test]
    fn name_fallback_takes_first_unclaimed() {
        let from = vec![card("a"), card("b"), card("c")];
        let to = vec![card("b"), card("n1"), card("n2")];
        let diff = analyze_diff(&from, &to);
        // b by id, then n1 -> a and n2 -> c by name, all identical.
        assert!(diff.matched.is_empty());
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());

        let to = vec![card("n1").with_position(5.0, 0.0)];
        let diff = analyze_diff(&from, &to);
        assert_eq!(diff.matched[0].from_index, 0);
        assert_eq!(diff.matched[0].id, "n1");
        assert_eq!(diff.removed, vec![1, 2]);
    }

    #[test]
    fn duplicate_names_claim_one_source_each() {
        let from = vec![card("a")];
        let to = vec![
            card("n1").with_position(10.0, 0.0),
            card("n2").with_position(20.0, 0.0),
        ];
        let diff = analyze_diff(&from, &to);
        assert_eq!(diff.matched.len(), 1);
        assert_eq!((diff.matched[0].from_index, diff.matched[0].to_index), (0, 0));
        assert_eq!(diff.added, vec![1]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn unmatched_entities_are_added_or_removed() {
        let from = vec![card("a").with_name("A"), card("b").with_name("B")];
        let to = vec![card("c").with_name("C"), card("a").with_name("A")];
        let diff = analyze_diff(&from, &to);
        assert_eq!(diff.added, vec![0]);
        assert_eq!(diff.removed, vec![1]);
    }
}
