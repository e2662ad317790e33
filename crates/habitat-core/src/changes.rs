use serde::{Deserialize, Serialize};
use std::fmt;

const NOT_SPECIFIED: &str = "Not specified";
const UNASSIGNED: &str = "Unassigned";

/// A group of housing units ("manzana") inside a project, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub total_units: u32,
}

impl Block {
    pub fn new(name: impl Into<String>, total_units: u32) -> Self {
        Self {
            name: name.into(),
            total_units,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InPlanning,
    InConstruction,
    Completed,
    Paused,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::InPlanning => "In Planning",
            Self::InConstruction => "In Construction",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Original or edited state of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub name: String,
    pub description: String,
    pub location: String,
    pub status: Option<ProjectStatus>,
    /// ISO date or datetime; only the date part is compared.
    pub start_date: Option<String>,
    pub estimated_end_date: Option<String>,
    pub manager: Option<String>,
    pub blocks: Vec<Block>,
}

impl ProjectSnapshot {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub label: String,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockChangeKind {
    Added,
    Removed,
    Modified,
}

/// Kind-specific details of a block change.
///
/// `Added` carries `new_unit_count`; `Removed` carries nothing; `Modified`
/// carries unit counts and, for a rename, `old_name`/`new_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChangeDetails {
    pub old_name: Option<String>,
    pub new_name: Option<String>,
    pub old_unit_count: Option<u32>,
    pub new_unit_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChange {
    pub kind: BlockChangeKind,
    pub block_name: String,
    pub details: BlockChangeDetails,
}

impl BlockChange {
    fn added(block: &Block) -> Self {
        Self {
            kind: BlockChangeKind::Added,
            block_name: block.name.clone(),
            details: BlockChangeDetails {
                new_unit_count: Some(block.total_units),
                ..BlockChangeDetails::default()
            },
        }
    }

    fn removed(block: &Block) -> Self {
        Self {
            kind: BlockChangeKind::Removed,
            block_name: block.name.clone(),
            details: BlockChangeDetails::default(),
        }
    }

    fn resized(original: &Block, candidate: &Block) -> Self {
        Self {
            kind: BlockChangeKind::Modified,
            block_name: candidate.name.clone(),
            details: BlockChangeDetails {
                old_unit_count: Some(original.total_units),
                new_unit_count: Some(candidate.total_units),
                ..BlockChangeDetails::default()
            },
        }
    }

    fn renamed(original: &Block, candidate: &Block) -> Self {
        Self {
            kind: BlockChangeKind::Modified,
            block_name: candidate.name.clone(),
            details: BlockChangeDetails {
                old_name: Some(original.name.clone()),
                new_name: Some(candidate.name.clone()),
                old_unit_count: Some(original.total_units),
                new_unit_count: Some(candidate.total_units),
            },
        }
    }

    fn is(&self, kind: BlockChangeKind, name: &str) -> bool {
        self.kind == kind && self.block_name == name
    }
}

/// Structured summary shown before an edited project is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub field_changes: Vec<FieldChange>,
    pub block_changes: Vec<BlockChange>,
    pub total_changes: usize,
    pub has_changes: bool,
}

impl ChangeSet {
    fn from_parts(field_changes: Vec<FieldChange>, block_changes: Vec<BlockChange>) -> Self {
        let total_changes = field_changes.len() + block_changes.len();
        Self {
            field_changes,
            block_changes,
            total_changes,
            has_changes: total_changes > 0,
        }
    }
}

/// Diffs project snapshots.
///
/// Blocks are matched by name; repeated names pair up by occurrence. A second
/// pass walks both block lists by index and reports a same-position rename as
/// a single modification.
///
/// Limitation: the rename pass relies on position. Reordering blocks and
/// renaming one of them in the same edit is reported as a removal plus an
/// addition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn diff(
        &self,
        original: Option<&ProjectSnapshot>,
        candidate: Option<&ProjectSnapshot>,
    ) -> ChangeSet {
        match (original, candidate) {
            (Some(original), Some(candidate)) => ChangeSet::from_parts(
                field_changes(original, candidate),
                block_changes(&original.blocks, &candidate.blocks),
            ),
            _ => ChangeSet::default(),
        }
    }
}

fn field_changes(original: &ProjectSnapshot, candidate: &ProjectSnapshot) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    let mut push = |field: &str, label: &str, old_value: String, new_value: String| {
        changes.push(FieldChange {
            field: field.to_string(),
            label: label.to_string(),
            old_value,
            new_value,
        });
    };

    if original.name != candidate.name {
        push(
            "name",
            "Project Name",
            original.name.clone(),
            candidate.name.clone(),
        );
    }
    if original.description != candidate.description {
        push(
            "description",
            "Description",
            original.description.clone(),
            candidate.description.clone(),
        );
    }
    if original.location != candidate.location {
        push(
            "location",
            "Location",
            original.location.clone(),
            candidate.location.clone(),
        );
    }
    if original.status != candidate.status {
        push(
            "status",
            "Status",
            status_label(original.status),
            status_label(candidate.status),
        );
    }

    let old_start = normalize_date(original.start_date.as_deref());
    let new_start = normalize_date(candidate.start_date.as_deref());
    if old_start != new_start {
        push(
            "start_date",
            "Start Date",
            or_placeholder(old_start, NOT_SPECIFIED),
            or_placeholder(new_start, NOT_SPECIFIED),
        );
    }

    let old_end = normalize_date(original.estimated_end_date.as_deref());
    let new_end = normalize_date(candidate.estimated_end_date.as_deref());
    if old_end != new_end {
        push(
            "estimated_end_date",
            "Estimated Completion Date",
            or_placeholder(old_end, NOT_SPECIFIED),
            or_placeholder(new_end, NOT_SPECIFIED),
        );
    }

    let old_manager = original.manager.as_deref().unwrap_or_default();
    let new_manager = candidate.manager.as_deref().unwrap_or_default();
    if old_manager != new_manager {
        push(
            "manager",
            "Project Manager",
            or_placeholder(old_manager, UNASSIGNED),
            or_placeholder(new_manager, UNASSIGNED),
        );
    }

    changes
}

fn block_changes(original: &[Block], candidate: &[Block]) -> Vec<BlockChange> {
    let mut changes = Vec::new();

    for (index, block) in original.iter().enumerate() {
        if nth_named(candidate, &block.name, occurrence(original, index)).is_none() {
            changes.push(BlockChange::removed(block));
        }
    }

    for (index, block) in candidate.iter().enumerate() {
        match nth_named(original, &block.name, occurrence(candidate, index)) {
            None => changes.push(BlockChange::added(block)),
            Some(previous) if previous.total_units != block.total_units => {
                changes.push(BlockChange::resized(previous, block));
            }
            Some(_) => {}
        }
    }

    for (previous, block) in original.iter().zip(candidate) {
        if previous.name == block.name {
            continue;
        }

        let removed = changes
            .iter()
            .position(|c| c.is(BlockChangeKind::Removed, &previous.name));
        let added = changes
            .iter()
            .position(|c| c.is(BlockChangeKind::Added, &block.name));

        match (removed, added) {
            // Both names vanished/appeared at the same position: a plain rename.
            (Some(removed), Some(added)) => {
                changes[added] = BlockChange::renamed(previous, block);
                changes.remove(removed);
            }
            (None, None) => {
                if let Some(existing) = changes
                    .iter_mut()
                    .find(|c| c.is(BlockChangeKind::Modified, &block.name))
                {
                    existing.details.old_name = Some(previous.name.clone());
                    existing.details.new_name = Some(block.name.clone());
                } else {
                    changes.push(BlockChange::renamed(previous, block));
                }
            }
            // One side is a genuine removal or addition elsewhere in the list.
            _ => {}
        }
    }

    changes
}

/// How many blocks before `index` share its name.
fn occurrence(blocks: &[Block], index: usize) -> usize {
    let name = &blocks[index].name;
    blocks[..index].iter().filter(|b| b.name == *name).count()
}

/// Same-name blocks pair up by occurrence: the second `A` matches the second `A`.
fn nth_named<'a>(blocks: &'a [Block], name: &str, n: usize) -> Option<&'a Block> {
    blocks.iter().filter(|b| b.name == name).nth(n)
}

fn status_label(status: Option<ProjectStatus>) -> String {
    status
        .map(|status| status.label().to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// `2024-03-01T00:00:00Z` and `2024-03-01` compare equal.
fn normalize_date(value: Option<&str>) -> &str {
    value
        .and_then(|date| date.split('T').next())
        .unwrap_or_default()
        .trim()
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, blocks: Vec<Block>) -> ProjectSnapshot {
        ProjectSnapshot::new(name, "Vivienda de interés social", "Cúcuta").with_blocks(blocks)
    }

    fn diff(original: &ProjectSnapshot, candidate: &ProjectSnapshot) -> ChangeSet {
        ChangeDetector::new().diff(Some(original), Some(candidate))
    }

    #[test]
    fn absent_input_yields_empty_change_set() {
        let snapshot = project("Tower One", vec![Block::new("M1", 20)]);
        let detector = ChangeDetector::new();

        for result in [
            detector.diff(None, Some(&snapshot)),
            detector.diff(Some(&snapshot), None),
            detector.diff(None, None),
        ] {
            assert_eq!(result.total_changes, 0);
            assert!(!result.has_changes);
        }
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let mut snapshot = project("Tower One", vec![Block::new("A", 10), Block::new("B", 4)]);
        snapshot.status = Some(ProjectStatus::InConstruction);
        snapshot.start_date = Some("2024-01-15".into());
        snapshot.manager = Some("Laura Díaz".into());

        let result = diff(&snapshot, &snapshot.clone());
        assert_eq!(result.total_changes, 0);
        assert!(!result.has_changes);
    }

    #[test]
    fn name_only_edit_yields_one_field_change() {
        let original = project("Tower One", vec![Block::new("A", 10)]);
        let mut candidate = original.clone();
        candidate.name = "Tower Two".into();

        let result = diff(&original, &candidate);
        assert_eq!(result.field_changes.len(), 1);
        assert!(result.block_changes.is_empty());
        let change = &result.field_changes[0];
        assert_eq!(change.field, "name");
        assert_eq!(change.label, "Project Name");
        assert_eq!(change.old_value, "Tower One");
        assert_eq!(change.new_value, "Tower Two");
    }

    #[test]
    fn field_changes_keep_presentation_order() {
        let original = ProjectSnapshot::new("a", "b", "c");
        let candidate = ProjectSnapshot::new("x", "y", "z");

        let fields: Vec<_> = diff(&original, &candidate)
            .field_changes
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(fields, ["name", "description", "location"]);
    }

    #[test]
    fn simple_rename_is_a_single_modification() {
        let original = project("P", vec![Block::new("A", 10)]);
        let candidate = project("P", vec![Block::new("B", 10)]);

        let result = diff(&original, &candidate);
        assert_eq!(result.total_changes, 1);
        let change = &result.block_changes[0];
        assert_eq!(change.kind, BlockChangeKind::Modified);
        assert_eq!(change.block_name, "B");
        assert_eq!(change.details.old_name.as_deref(), Some("A"));
        assert_eq!(change.details.new_name.as_deref(), Some("B"));
        assert!(!result
            .block_changes
            .iter()
            .any(|c| c.kind != BlockChangeKind::Modified));
    }

    #[test]
    fn rename_with_resize_carries_both_counts() {
        let original = project("P", vec![Block::new("A", 10), Block::new("C", 3)]);
        let candidate = project("P", vec![Block::new("B", 12), Block::new("C", 3)]);

        let result = diff(&original, &candidate);
        assert_eq!(result.block_changes.len(), 1);
        let details = &result.block_changes[0].details;
        assert_eq!(details.old_unit_count, Some(10));
        assert_eq!(details.new_unit_count, Some(12));
        assert_eq!(details.old_name.as_deref(), Some("A"));
    }

    #[test]
    fn true_removal_is_reported_once() {
        let original = project("P", vec![Block::new("A", 10), Block::new("B", 5)]);
        let candidate = project("P", vec![Block::new("B", 5)]);

        let result = diff(&original, &candidate);
        assert_eq!(result.block_changes.len(), 1);
        assert_eq!(result.block_changes[0].kind, BlockChangeKind::Removed);
        assert_eq!(result.block_changes[0].block_name, "A");
    }

    #[test]
    fn resize_and_addition_scenario() {
        let original = project("Tower One", vec![Block::new("M1", 20)]);
        let candidate = project("Tower One", vec![Block::new("M1", 25), Block::new("M2", 10)]);

        let result = diff(&original, &candidate);
        assert!(result.field_changes.is_empty());
        assert_eq!(result.total_changes, 2);
        assert_eq!(
            result.block_changes,
            vec![
                BlockChange {
                    kind: BlockChangeKind::Modified,
                    block_name: "M1".into(),
                    details: BlockChangeDetails {
                        old_unit_count: Some(20),
                        new_unit_count: Some(25),
                        ..BlockChangeDetails::default()
                    },
                },
                BlockChange {
                    kind: BlockChangeKind::Added,
                    block_name: "M2".into(),
                    details: BlockChangeDetails {
                        new_unit_count: Some(10),
                        ..BlockChangeDetails::default()
                    },
                },
            ]
        );
    }

    // A pure swap also reports A->B as a rename: the index pass only sees
    // positions. Same limitation as reorder_plus_rename_falls_back_to_remove_and_add.
    #[test]
    fn swapped_positions_merge_rename_into_resize() {
        let original = project("P", vec![Block::new("A", 10), Block::new("B", 5)]);
        let candidate = project("P", vec![Block::new("B", 6), Block::new("A", 10)]);

        let result = diff(&original, &candidate);
        let b = result
            .block_changes
            .iter()
            .find(|c| c.block_name == "B")
            .unwrap();
        assert_eq!(b.kind, BlockChangeKind::Modified);
        assert_eq!(b.details.old_unit_count, Some(5));
        assert_eq!(b.details.new_unit_count, Some(6));
        assert_eq!(b.details.old_name.as_deref(), Some("A"));
        assert_eq!(b.details.new_name.as_deref(), Some("B"));
    }

    #[test]
    fn reorder_plus_rename_falls_back_to_remove_and_add() {
        let original = project("P", vec![Block::new("A", 10), Block::new("B", 5)]);
        let candidate = project("P", vec![Block::new("B2", 5), Block::new("A", 10)]);

        let kinds: Vec<_> = diff(&original, &candidate)
            .block_changes
            .into_iter()
            .map(|c| (c.kind, c.block_name))
            .collect();
        assert_eq!(
            kinds,
            [
                (BlockChangeKind::Removed, "B".to_string()),
                (BlockChangeKind::Added, "B2".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_block_names_pair_by_occurrence() {
        let snapshot = project("P", vec![Block::new("A", 1), Block::new("A", 2)]);
        assert_eq!(diff(&snapshot, &snapshot.clone()).total_changes, 0);

        let candidate = project("P", vec![Block::new("A", 1), Block::new("A", 3)]);
        let result = diff(&snapshot, &candidate);
        assert_eq!(result.block_changes.len(), 1);
        assert_eq!(result.block_changes[0].kind, BlockChangeKind::Modified);
        assert_eq!(result.block_changes[0].details.old_unit_count, Some(2));
        assert_eq!(result.block_changes[0].details.new_unit_count, Some(3));

        let dropped = project("P", vec![Block::new("A", 1)]);
        let result = diff(&snapshot, &dropped);
        assert_eq!(result.block_changes.len(), 1);
        assert_eq!(result.block_changes[0].kind, BlockChangeKind::Removed);
    }

    #[test]
    fn dates_compare_by_day_only() {
        let mut original = project("P", vec![]);
        original.start_date = Some("2024-03-01T05:00:00Z".into());
        let mut candidate = original.clone();
        candidate.start_date = Some("2024-03-01".into());
        assert!(!diff(&original, &candidate).has_changes);

        candidate.estimated_end_date = Some("2025-12-31".into());
        let result = diff(&original, &candidate);
        assert_eq!(result.field_changes.len(), 1);
        assert_eq!(result.field_changes[0].field, "estimated_end_date");
        assert_eq!(result.field_changes[0].old_value, "Not specified");
        assert_eq!(result.field_changes[0].new_value, "2025-12-31");
    }

    #[test]
    fn unset_and_empty_values_compare_equal() {
        let mut original = project("P", vec![]);
        original.start_date = Some("2024-05-02".into());
        let mut candidate = original.clone();
        candidate.manager = Some(String::new());
        candidate.start_date = Some(" 2024-05-02".into());

        assert!(!diff(&original, &candidate).has_changes);
    }

    #[test]
    fn status_and_manager_render_labels() {
        let original = project("P", vec![]);
        let mut candidate = original.clone();
        candidate.status = Some(ProjectStatus::Paused);
        candidate.manager = Some("Carlos Pérez".into());

        let result = diff(&original, &candidate);
        let fields: Vec<_> = result
            .field_changes
            .iter()
            .map(|c| (c.field.as_str(), c.old_value.as_str(), c.new_value.as_str()))
            .collect();
        assert_eq!(
            fields,
            [
                ("status", "Not specified", "Paused"),
                ("manager", "Unassigned", "Carlos Pérez"),
            ]
        );
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let original = project("P", vec![Block::new("A", 1), Block::new("B", 2)]);
        let candidate = project("Q", vec![Block::new("C", 1)]);
        let detector = ChangeDetector::new();

        let first = detector.diff(Some(&original), Some(&candidate));
        let second = detector.diff(Some(&original), Some(&candidate));
        assert_eq!(first, second);
        assert_eq!(first.total_changes, first.field_changes.len() + first.block_changes.len());
    }
}
