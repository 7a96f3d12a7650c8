use std::collections::BTreeSet;

use super::model::{MeasurementRecord, MeasurementSet};

// ---------------------------------------------------------------------------
// Filter predicate: which fibers / integration times are selected
// ---------------------------------------------------------------------------

/// Viewer selection state. An empty set hides every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub fibers: BTreeSet<Option<i32>>,
    pub integration_times: BTreeSet<Option<i64>>,
    /// Also list invalid records (they are never plotted).
    pub show_invalid: bool,
}

/// Initialise a [`FilterState`] with everything selected.
pub fn init_filter_state(set: &MeasurementSet) -> FilterState {
    FilterState {
        fibers: set.fibers.clone(),
        integration_times: set.integration_times.clone(),
        show_invalid: true,
    }
}

/// Whether a single record passes the filters.
pub fn passes(record: &MeasurementRecord, filters: &FilterState) -> bool {
    if !record.is_valid() && !filters.show_invalid {
        return false;
    }
    filters.fibers.contains(&record.fiber)
        && filters.integration_times.contains(&record.integration_time_us)
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(set: &MeasurementSet, filters: &FilterState) -> Vec<usize> {
    set.records
        .iter()
        .enumerate()
        .filter(|(_, r)| passes(r, filters))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    fn set() -> MeasurementSet {
        MeasurementSet::from_records(vec![
            MeasurementRecord::from_bytes("20260121T143000-F1-i100.txt", b"1 2 3 4 5 6 0 7 8 9", UTF_8),
            MeasurementRecord::from_bytes("20260121T143001-F2-i100.txt", b"1 2 3 4 5 6 0 7 8 9", UTF_8),
            MeasurementRecord::from_bytes("20260121T143002-F2-i200.txt", b"1 2", UTF_8),
        ])
    }

    #[test]
    fn everything_selected_initially() {
        let set = set();
        let filters = init_filter_state(&set);
        assert_eq!(filtered_indices(&set, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn deselecting_a_fiber_hides_its_records() {
        let set = set();
        let mut filters = init_filter_state(&set);
        filters.fibers.remove(&Some(2));
        assert_eq!(filtered_indices(&set, &filters), vec![0]);
    }

    #[test]
    fn invalid_records_can_be_hidden() {
        let set = set();
        let mut filters = init_filter_state(&set);
        filters.show_invalid = false;
        assert_eq!(filtered_indices(&set, &filters), vec![0, 1]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let set = set();
        let mut filters = init_filter_state(&set);
        filters.integration_times.clear();
        assert!(filtered_indices(&set, &filters).is_empty());
    }
}
