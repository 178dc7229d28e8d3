//! Random selection
//!
//! Pure functions over supplied collections: nothing here touches disk or
//! shared state. Only active students (`active == true`) and active groups
//! (`is_active == true`) take part in a draw.
//!
//! Each `*_with` function takes the random source explicitly; the plain
//! variants draw from `rand::thread_rng()`, which is reseeded from the OS so
//! successive calls are independent.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{PickerError, PickerResult};
use crate::types::{Group, Student};

/// Uniform pick among active students
pub fn pick_uniform(students: &[Student]) -> Option<&Student> {
    pick_uniform_with(students, &mut rand::thread_rng())
}

pub fn pick_uniform_with<'a, R: Rng + ?Sized>(
    students: &'a [Student],
    rng: &mut R,
) -> Option<&'a Student> {
    let active: Vec<&Student> = students.iter().filter(|s| s.active).collect();
    active.choose(rng).copied()
}

/// Weight-proportional pick among active students
pub fn pick_weighted(students: &[Student]) -> Option<&Student> {
    pick_weighted_with(students, &mut rand::thread_rng())
}

/// Draws `r` in `[0, total_weight)` and returns the first student whose
/// cumulative weight exceeds it. Weights below 1 count as 1.
pub fn pick_weighted_with<'a, R: Rng + ?Sized>(
    students: &'a [Student],
    rng: &mut R,
) -> Option<&'a Student> {
    let active: Vec<&Student> = students.iter().filter(|s| s.active).collect();
    let total_weight: u64 = active.iter().map(|s| s.effective_weight()).sum();
    if total_weight == 0 {
        return None;
    }

    let draw = rng.gen_range(0..total_weight);
    let mut cumulative = 0u64;
    for student in active.iter().copied() {
        cumulative += student.effective_weight();
        if draw < cumulative {
            return Some(student);
        }
    }
    active.last().copied()
}

/// Uniform pick among active groups
pub fn pick_group(groups: &[Group]) -> Option<&Group> {
    pick_group_with(groups, &mut rand::thread_rng())
}

pub fn pick_group_with<'a, R: Rng + ?Sized>(groups: &'a [Group], rng: &mut R) -> Option<&'a Group> {
    let active: Vec<&Group> = groups.iter().filter(|g| g.is_active).collect();
    active.choose(rng).copied()
}

/// Split active students into `group_count` groups of near-equal size
pub fn partition_balanced(students: &[Student], group_count: usize) -> PickerResult<Vec<Group>> {
    partition_balanced_with(students, group_count, &mut rand::thread_rng())
}

/// Shuffles the active students, then hands out contiguous blocks: the first
/// `n % k` groups get `n / k + 1` members and the rest get `n / k`. Groups
/// are numbered from 1 and named `Group 1`, `Group 2`, ...
pub fn partition_balanced_with<R: Rng + ?Sized>(
    students: &[Student],
    group_count: usize,
    rng: &mut R,
) -> PickerResult<Vec<Group>> {
    let mut ids: Vec<u32> = students.iter().filter(|s| s.active).map(|s| s.id).collect();

    if group_count == 0 {
        return Err(PickerError::InvalidArgument(
            "group count must be greater than zero".into(),
        ));
    }
    if group_count > ids.len() {
        return Err(PickerError::InvalidArgument(format!(
            "cannot make {} groups from {} active students",
            group_count,
            ids.len()
        )));
    }

    ids.shuffle(rng);

    let base = ids.len() / group_count;
    let extra = ids.len() % group_count;
    let mut remaining = ids.as_slice();
    let mut groups = Vec::with_capacity(group_count);

    for index in 0..group_count {
        let size = base + usize::from(index < extra);
        let (members, rest) = remaining.split_at(size);
        remaining = rest;

        let number = index as u32 + 1;
        groups.push(Group::new(number, format!("Group {}", number)).with_members(members.to_vec()));
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn roster(n: u32) -> Vec<Student> {
        (1..=n).map(|i| Student::new(i, format!("S{}", i))).collect()
    }

    #[test]
    fn test_uniform_empty_and_inactive() {
        assert!(pick_uniform(&[]).is_none());
        let inactive = vec![Student::new(1, "A").with_active(false)];
        assert!(pick_uniform(&inactive).is_none());
        assert!(pick_weighted(&inactive).is_none());
    }

    #[test]
    fn test_uniform_returns_active_member() {
        let mut students = roster(5);
        students[0].active = false;
        students[3].active = false;
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let picked = pick_uniform_with(&students, &mut rng).unwrap();
            assert!(picked.active);
            assert!(students.contains(picked));
        }
    }

    #[test]
    fn test_uniform_reaches_every_active_student() {
        let students = roster(4);
        let mut rng = StdRng::seed_from_u64(11);
        let seen: HashSet<u32> = (0..400)
            .map(|_| pick_uniform_with(&students, &mut rng).unwrap().id)
            .collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_weighted_frequency_tracks_weight() {
        let students = vec![
            Student::new(1, "A").with_weight(3),
            Student::new(2, "B").with_weight(1),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;
        let a_hits = (0..trials)
            .filter(|_| pick_weighted_with(&students, &mut rng).unwrap().id == 1)
            .count();

        let freq = a_hits as f64 / trials as f64;
        assert!((0.72..=0.78).contains(&freq), "frequency of A was {}", freq);
    }

    #[test]
    fn test_weighted_floors_non_positive_weights() {
        let mut students = roster(2);
        students[0].weight = 0;
        students[1].weight = -5;
        let mut rng = StdRng::seed_from_u64(3);

        let mut counts: HashMap<u32, usize> = HashMap::new();
        for _ in 0..2000 {
            *counts.entry(pick_weighted_with(&students, &mut rng).unwrap().id).or_default() += 1;
        }
        assert_eq!(counts.len(), 2);
        assert!(counts.values().all(|&c| c > 800));
    }

    #[test]
    fn test_weighted_skips_inactive() {
        let students = vec![
            Student::new(1, "A").with_weight(100).with_active(false),
            Student::new(2, "B"),
        ];
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(pick_weighted_with(&students, &mut rng).unwrap().id, 2);
        }
    }

    #[test]
    fn test_pick_group_only_active() {
        assert!(pick_group(&[]).is_none());
        let mut closed = Group::new(1, "Closed");
        closed.is_active = false;
        let groups = vec![closed, Group::new(2, "Open")];
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(pick_group_with(&groups, &mut rng).unwrap().id, 2);
        }
    }

    #[test]
    fn test_partition_seven_into_three() {
        let students = roster(7);
        let mut rng = StdRng::seed_from_u64(1);
        let groups = partition_balanced_with(&students, 3, &mut rng).unwrap();

        let mut sizes: Vec<usize> = groups.iter().map(|g| g.member_count()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 2, 3]);

        let mut all: Vec<u32> = groups.iter().flat_map(|g| g.student_ids.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, (1..=7).collect::<Vec<u32>>());

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 2", "Group 3"]);
        assert_eq!(groups.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_partition_balance_holds_for_all_counts() {
        let students = roster(23);
        let mut rng = StdRng::seed_from_u64(99);
        for k in 1..=23 {
            let groups = partition_balanced_with(&students, k, &mut rng).unwrap();
            assert_eq!(groups.len(), k);
            let min = groups.iter().map(|g| g.member_count()).min().unwrap();
            let max = groups.iter().map(|g| g.member_count()).max().unwrap();
            assert!(max - min <= 1, "k={} sizes {}..{}", k, min, max);

            let ids: HashSet<u32> = groups.iter().flat_map(|g| g.student_ids.clone()).collect();
            let total: usize = groups.iter().map(|g| g.member_count()).sum();
            assert_eq!(ids.len(), 23);
            assert_eq!(total, 23);
        }
    }

    #[test]
    fn test_partition_uses_only_active_students() {
        let mut students = roster(6);
        students[5].active = false;
        let groups = partition_balanced(&students, 2).unwrap();
        assert!(groups.iter().all(|g| !g.contains(6)));
        assert_eq!(groups.iter().map(|g| g.member_count()).sum::<usize>(), 5);
    }

    #[test]
    fn test_partition_rejects_impossible_counts() {
        let students = roster(3);
        assert!(matches!(
            partition_balanced(&students, 0),
            Err(PickerError::InvalidArgument(_))
        ));
        assert!(matches!(
            partition_balanced(&students, 4),
            Err(PickerError::InvalidArgument(_))
        ));
        assert!(partition_balanced(&[], 1).is_err());
    }
}
