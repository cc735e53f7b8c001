/// Selects the `k` highest-probability classes.
///
/// Bounded insertion: classes are visited in ascending id order and each one
/// is inserted after every kept entry with a probability greater than or
/// equal to its own, so equal probabilities keep ascending id order. The
/// buffer never grows past `k`. Output is `(class_id, probability)`, sorted
/// by probability descending then class id ascending.
pub fn top_k(probabilities: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut kept: Vec<(usize, f64)> = Vec::with_capacity(k.min(probabilities.len()) + 1);
    if k == 0 {
        return kept;
    }

    for (class_id, &p) in probabilities.iter().enumerate() {
        let position = kept.partition_point(|&(_, q)| q.total_cmp(&p).is_ge());
        if position < k {
            kept.insert(position, (class_id, p));
            kept.truncate(k);
        }
    }
    kept
}
