//! Reproducible stratified train/test split.
//!
//! Allocation: the test partition gets `ceil(n * test_size)` rows in total.
//! Each class first receives `floor(n_c * test_size)`, then the remaining
//! slots go to the classes with the largest fractional parts (ties by class
//! id). A class never gives up its last row, so every class keeps at least
//! one training example. Which rows of a class go to test is decided by a
//! shuffle seeded from `seed`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Row indices, ascending.
    pub train: Vec<usize>,
    /// Row indices, ascending.
    pub test: Vec<usize>,
}

pub fn stratified_split(labels: &[usize], n_classes: usize, test_size: f64, seed: u64) -> Split {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &label) in labels.iter().enumerate() {
        members[label].push(row);
    }

    let allocation = allocate_test_counts(&members, labels.len(), test_size);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for (rows, n_test) in members.iter_mut().zip(allocation) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();

    Split { train, test }
}

fn allocate_test_counts(members: &[Vec<usize>], n_rows: usize, test_size: f64) -> Vec<usize> {
    let capacity: Vec<usize> = members.iter().map(|m| m.len().saturating_sub(1)).collect();
    let target = ((n_rows as f64 * test_size).ceil() as usize).min(capacity.iter().sum());

    let mut counts = Vec::with_capacity(members.len());
    let mut remainders = Vec::with_capacity(members.len());
    for (class, rows) in members.iter().enumerate() {
        let exact = rows.len() as f64 * test_size;
        let base = (exact.floor() as usize).min(capacity[class]);
        counts.push(base);
        remainders.push((class, exact - exact.floor()));
    }

    // Largest remainder first; stable sort keeps class order on ties.
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut assigned: usize = counts.iter().sum();
    while assigned < target {
        let before = assigned;
        for &(class, _) in &remainders {
            if assigned == target {
                break;
            }
            if counts[class] < capacity[class] {
                counts[class] += 1;
                assigned += 1;
            }
        }
        if assigned == before {
            break;
        }
    }
    counts
}
