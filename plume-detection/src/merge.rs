use crate::{Interval, Plume, PlumeCandidate};
use chrono::TimeDelta;
use plumeid_common::PlumeId;
use tracing::debug;

/// Combines candidates separated by no more than `buffer` into plumes.
///
/// `candidates` must be sorted by start time. A candidate is absorbed into the
/// plume being built when it starts no later than that plume's end plus
/// `buffer`; the plume then ends at the later of the two ends. Plumes are
/// identified `1..=N` in chronological order.
#[tracing::instrument(skip_all, fields(num_candidates = candidates.len(), num_plumes))]
pub fn merge(candidates: &[PlumeCandidate], buffer: TimeDelta) -> Vec<Plume> {
    let mut merged = Vec::<Interval>::new();
    let Some((first, rest)) = candidates.split_first() else {
        tracing::Span::current().record("num_plumes", 0);
        return Vec::new();
    };

    let mut current = *first;
    for candidate in rest {
        if candidate.start <= current.end + buffer {
            current.end = current.end.max(candidate.end);
        } else {
            merged.push(current);
            current = *candidate;
        }
    }
    merged.push(current);

    tracing::Span::current().record("num_plumes", merged.len());
    debug!(
        "Merged {0} candidates into {1} plumes",
        candidates.len(),
        merged.len()
    );

    (1..)
        .zip(merged)
        .map(|(id, interval): (PlumeId, _)| Plume { id, interval })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::timeseries::test_utils::time_at;

    fn interval(start: i64, end: i64) -> Interval {
        Interval::new(time_at(start), time_at(end))
    }

    fn intervals(plumes: &[Plume]) -> Vec<Interval> {
        plumes.iter().map(|p| p.interval).collect()
    }

    #[test]
    fn no_candidates() {
        assert!(merge(&[], TimeDelta::seconds(10)).is_empty());
    }

    #[test]
    fn single_candidate() {
        let plumes = merge(&[interval(5, 8)], TimeDelta::seconds(10));
        assert_eq!(
            plumes,
            vec![Plume {
                id: 1,
                interval: interval(5, 8)
            }]
        );
    }

    #[test]
    fn merge_within_buffer() {
        let candidates = [interval(0, 10), interval(15, 20), interval(40, 50)];
        let plumes = merge(&candidates, TimeDelta::seconds(10));
        assert_eq!(intervals(&plumes), vec![interval(0, 20), interval(40, 50)]);
        assert_eq!(plumes.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn no_merge_beyond_buffer() {
        let candidates = [interval(0, 10), interval(15, 20), interval(40, 50)];
        let plumes = merge(&candidates, TimeDelta::seconds(4));
        assert_eq!(intervals(&plumes), candidates.to_vec());
        assert_eq!(plumes.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        // One more second closes the gap exactly
        let plumes = merge(&candidates, TimeDelta::seconds(5));
        assert_eq!(intervals(&plumes), vec![interval(0, 20), interval(40, 50)]);
    }

    #[test]
    fn buffer_decides_merge() {
        let candidates = [interval(0, 5), interval(12, 20)];
        assert_eq!(
            intervals(&merge(&candidates, TimeDelta::seconds(10))),
            vec![interval(0, 20)]
        );
        assert_eq!(
            intervals(&merge(&candidates, TimeDelta::seconds(5))),
            candidates.to_vec()
        );
    }

    #[test]
    fn gap_equal_to_buffer_merges() {
        let plumes = merge(&[interval(0, 10), interval(20, 25)], TimeDelta::seconds(10));
        assert_eq!(intervals(&plumes), vec![interval(0, 25)]);
    }

    #[test]
    fn chained_merges() {
        let candidates = [interval(0, 2), interval(4, 6), interval(8, 10), interval(12, 14)];
        let plumes = merge(&candidates, TimeDelta::seconds(2));
        assert_eq!(intervals(&plumes), vec![interval(0, 14)]);
    }

    #[test]
    fn contained_candidate_keeps_later_end() {
        let plumes = merge(&[interval(0, 30), interval(5, 10)], TimeDelta::zero());
        assert_eq!(intervals(&plumes), vec![interval(0, 30)]);
    }

    #[test]
    fn zero_buffer_merges_touching() {
        let plumes = merge(&[interval(0, 5), interval(5, 8), interval(9, 10)], TimeDelta::zero());
        assert_eq!(intervals(&plumes), vec![interval(0, 8), interval(9, 10)]);
    }
}
