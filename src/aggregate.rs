// Grouping primitives shared by every chart view.
//
// All functions are pure: they read the filtered slice in its held order
// and return fresh rows. Ties in counts keep first-encountered order.
use crate::types::{BucketCount, Complaint, CountRow, MatrixRow};
use crate::util::format_pct;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Bucket for inner values not named by the caller.
pub const OTHER_BUCKET: &str = "Other";

/// Group by `key` and count. Sorted by count descending, ties in
/// first-seen order.
pub fn group_count<K, F>(records: &[Complaint], mut key: F) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&Complaint) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, usize)> = Vec::new();
    for r in records {
        let k = key(r);
        match index.get(&k) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, 1));
            }
        }
    }
    // `sort_by` is stable, so equal counts stay in insertion order.
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

/// The `k` largest groups, plus one `other_label` row summing the rest
/// when there are more than `k` groups.
pub fn top_k_with_overflow<F>(
    records: &[Complaint],
    k: usize,
    key: F,
    other_label: &str,
) -> Vec<CountRow>
where
    F: FnMut(&Complaint) -> String,
{
    let groups = group_count(records, key);
    let mut rows: Vec<CountRow> = groups
        .iter()
        .take(k)
        .map(|(label, count)| CountRow::new(label.clone(), *count))
        .collect();
    if groups.len() > k {
        let rest: usize = groups[k..].iter().map(|(_, c)| *c).sum();
        rows.push(CountRow::new(other_label, rest));
    }
    rows
}

/// Two-level grouping. Each outer key gets one row with a tally per named
/// bucket (unnamed inner values land in [`OTHER_BUCKET`]), the row total
/// and the share of `success` as a one-decimal percentage.
pub fn matrix<O, I>(
    records: &[Complaint],
    mut outer: O,
    mut inner: I,
    buckets: &[&str],
    success: &str,
) -> Vec<MatrixRow>
where
    O: FnMut(&Complaint) -> String,
    I: FnMut(&Complaint) -> String,
{
    let mut names: Vec<String> = buckets.iter().map(|b| b.to_string()).collect();
    if !names.iter().any(|b| b == OTHER_BUCKET) {
        names.push(OTHER_BUCKET.to_string());
    }
    let other_slot = names
        .iter()
        .position(|b| b == OTHER_BUCKET)
        .unwrap_or(names.len() - 1);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<(String, Vec<usize>)> = Vec::new();
    for r in records {
        let key = outer(r);
        let row = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), tallies.len());
                tallies.push((key, vec![0; names.len()]));
                tallies.len() - 1
            }
        };
        let value = inner(r);
        let slot = names.iter().position(|b| *b == value).unwrap_or(other_slot);
        tallies[row].1[slot] += 1;
    }

    let mut rows: Vec<MatrixRow> = tallies
        .into_iter()
        .map(|(label, counts)| {
            let total: usize = counts.iter().sum();
            let hits = names
                .iter()
                .position(|b| b == success)
                .map(|i| counts[i])
                .unwrap_or(0);
            let (rate, rate_value) = format_pct(hits, total);
            MatrixRow {
                label,
                buckets: names
                    .iter()
                    .zip(counts)
                    .map(|(bucket, count)| BucketCount {
                        bucket: bucket.clone(),
                        count,
                    })
                    .collect(),
                total,
                rate,
                rate_value,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Same rows as [`matrix`], minus every row with fewer than `min_total`
/// records.
pub fn rate_with_min_sample<O, I>(
    records: &[Complaint],
    outer: O,
    inner: I,
    buckets: &[&str],
    success: &str,
    min_total: usize,
) -> Vec<MatrixRow>
where
    O: FnMut(&Complaint) -> String,
    I: FnMut(&Complaint) -> String,
{
    matrix(records, outer, inner, buckets, success)
        .into_iter()
        .filter(|row| row.total >= min_total)
        .collect()
}

/// Highest rates first, keeping the first `top_n`.
pub fn rank_by_rate(mut rows: Vec<MatrixRow>, top_n: usize) -> Vec<MatrixRow> {
    rows.sort_by(|a, b| {
        b.rate_value
            .partial_cmp(&a.rate_value)
            .unwrap_or(Ordering::Equal)
    });
    rows.truncate(top_n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize_with_fallback_year;
    use crate::types::{Direction, RawRecord};

    fn rec(state: &str, decision: &str) -> Complaint {
        let raw = RawRecord {
            state: Some(state.into()),
            decision_parent: Some(decision.into()),
            ..Default::default()
        };
        normalize_with_fallback_year(&raw, Direction::ByPress, 0, 2020)
    }

    fn sample() -> Vec<Complaint> {
        vec![
            rec("Kerala", "Upheld"),
            rec("Delhi", "Dismissed"),
            rec("Delhi", "Upheld"),
            rec("Goa", "Pending"),
            rec("Bihar", "Withdrawn"),
            rec("Kerala", "Dismissed"),
            rec("Delhi", "Upheld"),
        ]
    }

    #[test]
    fn group_count_orders_by_count_then_first_seen() {
        let groups = group_count(&sample(), |c| c.state.clone());
        assert_eq!(
            groups,
            vec![
                ("Delhi".to_string(), 3),
                ("Kerala".to_string(), 2),
                ("Goa".to_string(), 1),
                ("Bihar".to_string(), 1),
            ]
        );
        let total: usize = groups.iter().map(|(_, c)| c).sum();
        assert_eq!(total, sample().len());
    }

    #[test]
    fn group_count_of_nothing_is_empty() {
        assert!(group_count(&[], |c| c.year).is_empty());
        assert!(top_k_with_overflow(&[], 3, |c| c.state.clone(), "All Other").is_empty());
        assert!(matrix(&[], |c| c.state.clone(), |c| c.decision_parent.clone(), &["Upheld"], "Upheld").is_empty());
    }

    #[test]
    fn top_k_rolls_remainder_into_other() {
        let rows = top_k_with_overflow(&sample(), 2, |c| c.state.clone(), "All Other States");
        assert_eq!(
            rows,
            vec![
                CountRow::new("Delhi", 3),
                CountRow::new("Kerala", 2),
                CountRow::new("All Other States", 2),
            ]
        );
        let total: usize = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, sample().len());
    }

    #[test]
    fn top_k_omits_other_when_everything_fits() {
        let rows = top_k_with_overflow(&sample(), 4, |c| c.state.clone(), "All Other States");
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.label != "All Other States"));
    }

    #[test]
    fn matrix_tallies_buckets_and_rate() {
        let rows = matrix(
            &sample(),
            |c| c.state.clone(),
            |c| c.decision_parent.clone(),
            &["Upheld", "Dismissed", "Pending"],
            "Upheld",
        );
        let delhi = &rows[0];
        assert_eq!(delhi.label, "Delhi");
        assert_eq!(delhi.total, 3);
        assert_eq!(delhi.bucket("Upheld"), 2);
        assert_eq!(delhi.bucket("Dismissed"), 1);
        assert_eq!(delhi.rate, "66.7");

        let bihar = rows.iter().find(|r| r.label == "Bihar").unwrap();
        assert_eq!(bihar.bucket(OTHER_BUCKET), 1);
        assert_eq!(bihar.rate, "0.0");
        assert_eq!(bihar.buckets.len(), 4);
    }

    #[test]
    fn min_sample_drops_small_rows_only_from_rate_view() {
        let outer = |c: &Complaint| c.state.clone();
        let inner = |c: &Complaint| c.decision_parent.clone();
        let full = matrix(&sample(), outer, inner, &["Upheld"], "Upheld");
        let gated = rate_with_min_sample(&sample(), outer, inner, &["Upheld"], "Upheld", 2);
        assert!(full.iter().any(|r| r.label == "Goa"));
        assert!(gated.iter().all(|r| r.total >= 2));
        assert_eq!(gated.len(), 2);
    }

    #[test]
    fn rank_by_rate_sorts_and_truncates() {
        let rows = matrix(
            &sample(),
            |c| c.state.clone(),
            |c| c.decision_parent.clone(),
            &["Upheld"],
            "Upheld",
        );
        let ranked = rank_by_rate(rows, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "Delhi");
        assert_eq!(ranked[1].label, "Kerala");
    }
}
