// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Folding small consumers into a single "Other" branch.

use std::collections::HashSet;

use tracing::debug;

use super::OTHER_ID;
use crate::{Route, RouteMap};

/// Groups `consumers` for display.
///
/// Consumers below `hide_below` are folded into an "Other" route first.  If
/// `max_branches` is non-zero and more than `max_branches - 1` consumers are
/// still shown, the `remaining + 2 - max_branches` smallest of them are
/// folded as well.
///
/// The result is ordered by descending rate, with "Other" last.  The
/// untracked consumer is not part of the grouping.
pub fn group_consumers(
    consumers: &RouteMap<Route>,
    hide_below: f64,
    max_branches: usize,
) -> RouteMap<Route> {
    let mut ascending: Vec<(&str, &Route)> = consumers.iter().collect();
    ascending.sort_by(|(_, a), (_, b)| a.rate_or_zero().total_cmp(&b.rate_or_zero()));

    let mut folded: HashSet<&str> = HashSet::new();
    let mut other_rate = 0.0;

    if hide_below > 0.0 {
        for (key, route) in &ascending {
            if route.rate_or_zero() < hide_below {
                folded.insert(*key);
                other_rate += route.rate_or_zero();
            }
        }
    }

    if max_branches > 0 {
        let remaining = consumers.len() - folded.len();
        if remaining > max_branches - 1 {
            let mut to_fold = remaining + 2 - max_branches;
            for (key, route) in &ascending {
                if to_fold == 0 {
                    break;
                }
                if folded.insert(*key) {
                    other_rate += route.rate_or_zero();
                    to_fold -= 1;
                }
            }
        }
    }

    if !folded.is_empty() {
        // A host route keyed like the bucket would be replaced by it.
        if let Some(route) = consumers.get(OTHER_ID) {
            if folded.insert(OTHER_ID) {
                other_rate += route.rate_or_zero();
            }
        }
        debug!("Folded {} consumers into {OTHER_ID}.", folded.len());
    }

    let mut descending: Vec<(&str, &Route)> = consumers.iter().collect();
    descending.sort_by(|(_, a), (_, b)| b.rate_or_zero().total_cmp(&a.rate_or_zero()));

    let mut grouped: RouteMap<Route> = descending
        .iter()
        .filter(|(key, _)| !folded.contains(key))
        .map(|(key, route)| (key.to_string(), (*route).clone()))
        .collect();
    if !folded.is_empty() {
        grouped.insert(OTHER_ID, Route::new(OTHER_ID, other_rate).with_text("Other"));
    }
    grouped
}
