//! Rigging data: an immutable skeleton snapshot plus the naming tools that run on it.
//!
//! The host hands over its bone hierarchy as a flat list of `{ name, parent, selected }`
//! entries. [`Skeleton`] turns that into an arena with index-based parent/child links so
//! nothing here borrows into host memory, and rejects inputs that are not a forest.

pub mod chain;
pub mod names;
pub mod presets;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BoneToolsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    pub children: Vec<BoneId>,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSnapshot {
    pub bones: Vec<BoneEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

impl SkeletonSnapshot {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| BoneToolsError::InvalidSnapshot(e.to_string()))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoneToolsError::InvalidSnapshot(e.to_string()))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnPath,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Build the arena. Children keep snapshot order, which is the order the host
    /// iterates them in.
    pub fn from_snapshot(snapshot: &SkeletonSnapshot) -> Result<Self> {
        let mut ids: HashMap<&str, BoneId> = HashMap::with_capacity(snapshot.bones.len());
        for (i, entry) in snapshot.bones.iter().enumerate() {
            if ids.insert(entry.name.as_str(), BoneId(i)).is_some() {
                return Err(BoneToolsError::InvalidSkeleton(format!("duplicate bone name '{}'", entry.name)));
            }
        }

        let mut bones: Vec<Bone> = snapshot
            .bones
            .iter()
            .map(|e| Bone { name: e.name.clone(), parent: None, children: Vec::new(), selected: e.selected })
            .collect();

        for (i, entry) in snapshot.bones.iter().enumerate() {
            let Some(parent_name) = entry.parent.as_deref() else { continue; };
            let parent = *ids.get(parent_name).ok_or_else(|| {
                BoneToolsError::InvalidSkeleton(format!("bone '{}' has unknown parent '{}'", entry.name, parent_name))
            })?;
            bones[i].parent = Some(parent);
            bones[parent.0].children.push(BoneId(i));
        }

        let skeleton = Self { bones };
        skeleton.check_acyclic()?;
        Ok(skeleton)
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut state = vec![Visit::New; self.bones.len()];
        for start in 0..self.bones.len() {
            let mut path = Vec::new();
            let mut cur = Some(BoneId(start));
            while let Some(id) = cur {
                match state[id.0] {
                    Visit::Done => break,
                    Visit::OnPath => {
                        return Err(BoneToolsError::InvalidSkeleton(format!(
                            "parent cycle through bone '{}'",
                            self.bones[id.0].name
                        )));
                    }
                    Visit::New => {
                        state[id.0] = Visit::OnPath;
                        path.push(id);
                        cur = self.bones[id.0].parent;
                    }
                }
            }
            for id in path {
                state[id.0] = Visit::Done;
            }
        }
        Ok(())
    }

    pub fn to_snapshot(&self) -> SkeletonSnapshot {
        let bones = self
            .bones
            .iter()
            .map(|b| BoneEntry {
                name: b.name.clone(),
                parent: b.parent.map(|p| self.bones[p.0].name.clone()),
                selected: b.selected,
            })
            .collect();
        SkeletonSnapshot { bones }
    }

    pub fn len(&self) -> usize { self.bones.len() }

    pub fn is_empty(&self) -> bool { self.bones.is_empty() }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> { self.bones.get(id.0) }

    pub fn bones(&self) -> &[Bone] { &self.bones }

    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.bones.iter().position(|b| b.name == name).map(BoneId)
    }

    /// Selected bones in snapshot order.
    pub fn selection(&self) -> Vec<BoneId> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.selected)
            .map(|(i, _)| BoneId(i))
            .collect()
    }

    /// Write names back as one batch. Ids and the resulting name set are checked before
    /// the first rename, so an invalid or colliding batch leaves every bone untouched.
    pub fn apply_names(&mut self, assignments: &[chain::NameAssignment]) -> Result<usize> {
        let mut final_names: Vec<&str> = self.bones.iter().map(|b| b.name.as_str()).collect();
        for a in assignments {
            let slot = final_names
                .get_mut(a.bone.0)
                .ok_or_else(|| BoneToolsError::InvalidSkeleton(format!("no bone with id {}", a.bone.0)))?;
            *slot = a.name.as_str();
        }
        let mut seen = HashSet::with_capacity(final_names.len());
        if let Some(dup) = final_names.iter().find(|n| !seen.insert(**n)) {
            return Err(BoneToolsError::NameCollision(dup.to_string()));
        }

        for a in assignments {
            self.bones[a.bone.0].name = a.name.clone();
        }
        Ok(assignments.len())
    }

    /// Convert bone names through a preset mapping, with the same batch checks as
    /// [`Skeleton::apply_names`].
    pub fn apply_mapping(&mut self, mapping: &names::NameMapping) -> Result<usize> {
        let assignments: Vec<chain::NameAssignment> = names::plan_mapping(&self.bones, mapping)
            .into_iter()
            .map(|(i, name)| chain::NameAssignment { bone: BoneId(i), name })
            .collect();
        let renamed = self.apply_names(&assignments)?;
        names::log_renamed(renamed);
        Ok(renamed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entry(name: &str, parent: Option<&str>, selected: bool) -> BoneEntry {
        BoneEntry { name: name.to_string(), parent: parent.map(str::to_string), selected }
    }

    #[test]
    fn children_follow_snapshot_order() {
        let snap = SkeletonSnapshot {
            bones: vec![
                entry("Head", None, false),
                entry("Hair_B", Some("Head"), true),
                entry("Hair_A", Some("Head"), true),
            ],
        };
        let sk = Skeleton::from_snapshot(&snap).expect("valid skeleton");
        let head = sk.find("Head").unwrap();
        assert_eq!(sk.bone(head).unwrap().children, vec![BoneId(1), BoneId(2)]);
        assert_eq!(sk.bone(BoneId(2)).unwrap().parent, Some(head));
        assert_eq!(sk.selection(), vec![BoneId(1), BoneId(2)]);
    }

    #[test]
    fn rejects_unknown_parent_and_duplicates() {
        let snap = SkeletonSnapshot { bones: vec![entry("A", Some("Missing"), true)] };
        assert!(matches!(Skeleton::from_snapshot(&snap), Err(BoneToolsError::InvalidSkeleton(_))));

        let snap = SkeletonSnapshot { bones: vec![entry("A", None, true), entry("A", None, true)] };
        assert!(matches!(Skeleton::from_snapshot(&snap), Err(BoneToolsError::InvalidSkeleton(_))));
    }

    #[test]
    fn ring_of_bones_is_rejected_before_naming() {
        let snap = SkeletonSnapshot {
            bones: vec![entry("A", Some("C"), true), entry("B", Some("A"), true), entry("C", Some("B"), true)],
        };
        let err = Skeleton::from_snapshot(&snap).unwrap_err();
        assert!(err.to_string().contains("parent cycle"), "{err}");

        let snap = SkeletonSnapshot { bones: vec![entry("Self", Some("Self"), true)] };
        assert!(Skeleton::from_snapshot(&snap).is_err());
    }

    #[test]
    fn snapshot_json_round_trip_keeps_hierarchy() {
        let json = r#"{ "bones": [
            { "name": "Root" },
            { "name": "Tail", "parent": "Root", "selected": true }
        ] }"#;
        let snap = SkeletonSnapshot::from_json_str(json).expect("parse");
        let sk = Skeleton::from_snapshot(&snap).expect("skeleton");
        assert_eq!(sk.to_snapshot(), snap);
        assert!(!sk.bones()[0].selected);
    }

    #[test]
    fn apply_names_is_all_or_nothing() {
        let snap = SkeletonSnapshot { bones: vec![entry("A", None, true)] };
        let mut sk = Skeleton::from_snapshot(&snap).unwrap();
        let bad = vec![
            chain::NameAssignment { bone: BoneId(0), name: "X".into() },
            chain::NameAssignment { bone: BoneId(5), name: "Y".into() },
        ];
        assert!(sk.apply_names(&bad).is_err());
        assert_eq!(sk.bones()[0].name, "A");
    }

    #[test]
    fn apply_names_allows_swaps_but_not_duplicates() {
        let snap = SkeletonSnapshot { bones: vec![entry("A", None, true), entry("B", Some("A"), true)] };
        let mut sk = Skeleton::from_snapshot(&snap).unwrap();
        let swap = vec![
            chain::NameAssignment { bone: BoneId(0), name: "B".into() },
            chain::NameAssignment { bone: BoneId(1), name: "A".into() },
        ];
        assert_eq!(sk.apply_names(&swap).unwrap(), 2);
        assert_eq!(sk.to_snapshot().bones[1].parent.as_deref(), Some("B"));

        let clash = vec![chain::NameAssignment { bone: BoneId(1), name: "B".into() }];
        let err = sk.apply_names(&clash).unwrap_err();
        assert!(matches!(err, BoneToolsError::NameCollision(ref n) if n == "B"), "{err}");
        assert_eq!(sk.bones()[1].name, "A");
    }
}
