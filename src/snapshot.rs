// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The per-cycle input to the engine.

use crate::flows::{OTHER_ID, UNTRACKED_ID};
use crate::route::{Route, RouteMap, RoutePair};
use crate::Error;

/// Everything the engine needs to know for one recompute cycle: the routes
/// and the policy to apply to them.
///
/// A snapshot is supplied wholesale by the host before each cycle and is only
/// ever read by the engine.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowSnapshot {
    pub generation_in_routes: RouteMap<Route>,
    pub grid_in_route: Option<Route>,
    pub grid_out_route: Option<Route>,
    pub consumer_routes: RouteMap<Route>,
    pub battery_routes: RouteMap<RoutePair>,

    /// The maximum number of consumer branches to draw, including the
    /// grouped and untracked buckets.  0 means unlimited.
    pub max_consumer_branches: usize,

    /// Consumers with a rate below this are grouped.  0 disables grouping
    /// by rate.
    pub hide_consumers_below: f64,

    /// Attribute all battery charging to generation.
    pub battery_charge_only_from_generation: bool,

    /// Whether the host meters grid import and export with two independent
    /// unsigned sensors.  Only consulted by
    /// [`with_grid_sensors`][FlowSnapshot::with_grid_sensors]: once both
    /// grid routes are set, each is authoritative for its own direction.
    pub independent_grid_in_out: bool,
}

fn next_key<T>(map: &RouteMap<T>, prefix: &str) -> String {
    let mut n = map.len();
    loop {
        let key = format!("{prefix}_{n}");
        if !map.contains_key(&key) {
            return key;
        }
        n += 1;
    }
}

/// Builder-style setters.
impl FlowSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a generation route, keyed by its id.  Routes without an id get a
    /// generated key.
    pub fn with_generation(mut self, route: Route) -> Self {
        let key = route
            .id
            .clone()
            .unwrap_or_else(|| next_key(&self.generation_in_routes, "generation"));
        self.generation_in_routes.insert(key, route);
        self
    }

    /// Adds a consumer route, keyed by its id.  Routes without an id get a
    /// generated key.
    pub fn with_consumer(mut self, route: Route) -> Self {
        let key = route
            .id
            .clone()
            .unwrap_or_else(|| next_key(&self.consumer_routes, "consumer"));
        self.consumer_routes.insert(key, route);
        self
    }

    pub fn with_battery(mut self, key: impl Into<String>, pair: RoutePair) -> Self {
        self.battery_routes.insert(key, pair);
        self
    }

    pub fn with_grid_in(mut self, route: Route) -> Self {
        self.grid_in_route = Some(route);
        self
    }

    pub fn with_grid_out(mut self, route: Route) -> Self {
        self.grid_out_route = Some(route);
        self
    }

    /// Sets the grid routes from the host's grid sensors.
    ///
    /// Without independent grid sensors, `grid_in` is a single signed
    /// reading and `grid_out` is dropped.
    pub fn with_grid_sensors(mut self, grid_in: Option<Route>, grid_out: Option<Route>) -> Self {
        self.grid_in_route = grid_in;
        self.grid_out_route = match grid_out {
            Some(grid_out) if !self.independent_grid_in_out => {
                tracing::debug!(
                    "Ignoring grid-out sensor {:?}, grid in/out are not independent.",
                    grid_out.id
                );
                None
            }
            grid_out => grid_out,
        };
        self
    }

    pub fn with_max_consumer_branches(mut self, max: usize) -> Self {
        self.max_consumer_branches = max;
        self
    }

    pub fn with_hide_consumers_below(mut self, threshold: f64) -> Self {
        self.hide_consumers_below = threshold;
        self
    }

    pub fn with_battery_charge_only_from_generation(mut self, enabled: bool) -> Self {
        self.battery_charge_only_from_generation = enabled;
        self
    }

    pub fn with_independent_grid_in_out(mut self, enabled: bool) -> Self {
        self.independent_grid_in_out = enabled;
        self
    }
}

/// Totals over the tracked routes.
impl FlowSnapshot {
    /// Checks the snapshot at the host boundary.
    ///
    /// The engine itself accepts any snapshot, but a host should refuse to
    /// render one without any routes configured at all.
    pub fn validate(&self) -> Result<(), Error> {
        if self.grid_in_route.is_none()
            && self.grid_out_route.is_none()
            && self.generation_in_routes.is_empty()
            && self.consumer_routes.is_empty()
        {
            return Err(Error::invalid_snapshot(
                "At least one grid, generation or consumer route must be specified.",
            ));
        }
        for (key, route) in self.consumer_routes.iter() {
            for reserved in [OTHER_ID, UNTRACKED_ID] {
                if key == reserved || route.id.as_deref() == Some(reserved) {
                    return Err(Error::invalid_snapshot(format!(
                        "Consumer route id {reserved} is reserved."
                    )));
                }
            }
        }
        if !self.hide_consumers_below.is_finite() || self.hide_consumers_below < 0.0 {
            return Err(Error::invalid_snapshot(format!(
                "hide_consumers_below must be a non-negative number, found {}.",
                self.hide_consumers_below
            )));
        }
        Ok(())
    }

    /// The grid routes that are authoritative for this snapshot.
    ///
    /// A lone grid route is a signed reading.  When both are present, each
    /// is an unsigned reading for its own direction.
    pub fn grid_routes(&self) -> (Option<&Route>, Option<&Route>) {
        (self.grid_in_route.as_ref(), self.grid_out_route.as_ref())
    }

    /// Returns true if any grid route is configured.
    pub fn has_grid(&self) -> bool {
        self.grid_in_route.is_some() || self.grid_out_route.is_some()
    }

    /// The rate imported from the grid.
    pub fn grid_import(&self) -> f64 {
        match self.grid_routes() {
            (Some(grid_in), _) => grid_in.rate_or_zero().max(0.0),
            (None, Some(grid_out)) => (-grid_out.rate_or_zero()).max(0.0),
            (None, None) => 0.0,
        }
    }

    /// The rate exported to the grid.
    pub fn grid_export(&self) -> f64 {
        match self.grid_routes() {
            (_, Some(grid_out)) => grid_out.rate_or_zero().max(0.0),
            (Some(grid_in), None) => (-grid_in.rate_or_zero()).max(0.0),
            (None, None) => 0.0,
        }
    }

    pub fn generation_tracked_total(&self) -> f64 {
        self.generation_in_routes
            .values()
            .map(Route::rate_or_zero)
            .sum()
    }

    pub fn consumer_tracked_total(&self) -> f64 {
        self.consumer_routes.values().map(Route::rate_or_zero).sum()
    }

    /// The total rate flowing out of batteries into the system.
    pub fn battery_discharge_total(&self) -> f64 {
        self.battery_routes
            .values()
            .map(RoutePair::discharge_rate)
            .sum()
    }

    /// The total rate flowing from the system into batteries.
    pub fn battery_charge_total(&self) -> f64 {
        self.battery_routes.values().map(RoutePair::charge_rate).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert_eq!(
            FlowSnapshot::new().validate(),
            Err(Error::invalid_snapshot(
                "At least one grid, generation or consumer route must be specified."
            ))
        );
        assert!(FlowSnapshot::new()
            .with_consumer(Route::new("fridge", 80.0))
            .validate()
            .is_ok());
        assert_eq!(
            FlowSnapshot::new()
                .with_grid_in(Route::new("grid", 10.0))
                .with_hide_consumers_below(-1.0)
                .validate(),
            Err(Error::invalid_snapshot(
                "hide_consumers_below must be a non-negative number, found -1."
            ))
        );
    }

    #[test]
    fn test_reserved_consumer_ids() {
        assert_eq!(
            FlowSnapshot::new()
                .with_consumer(Route::new("other", 500.0))
                .validate(),
            Err(Error::invalid_snapshot("Consumer route id other is reserved."))
        );
        assert_eq!(
            FlowSnapshot::new()
                .with_consumer(Route::new("lights", 20.0))
                .with_consumer(Route::new("untracked", 5.0))
                .validate(),
            Err(Error::invalid_snapshot(
                "Consumer route id untracked is reserved."
            ))
        );

        // Keyed under another id, but carrying a reserved one.
        let mut snapshot = FlowSnapshot::new();
        snapshot
            .consumer_routes
            .insert("heat_pump", Route::new("untracked", 5.0));
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_signed_grid() {
        let importing = FlowSnapshot::new().with_grid_in(Route::new("grid", 300.0));
        assert_eq!(importing.grid_import(), 300.0);
        assert_eq!(importing.grid_export(), 0.0);

        let exporting = FlowSnapshot::new().with_grid_in(Route::new("grid", -300.0));
        assert_eq!(exporting.grid_import(), 0.0);
        assert_eq!(exporting.grid_export(), 300.0);

        let exporting = FlowSnapshot::new().with_grid_out(Route::new("grid", 120.0));
        assert_eq!(exporting.grid_import(), 0.0);
        assert_eq!(exporting.grid_export(), 120.0);

        let importing = FlowSnapshot::new().with_grid_out(Route::new("grid", -120.0));
        assert_eq!(importing.grid_import(), 120.0);
        assert_eq!(importing.grid_export(), 0.0);

        assert_eq!(FlowSnapshot::new().grid_import(), 0.0);
        assert_eq!(FlowSnapshot::new().grid_export(), 0.0);
    }

    #[test]
    fn test_both_grid_routes() {
        // Both routes set: each is authoritative, whatever the sensor flag.
        let snapshot = FlowSnapshot::new()
            .with_grid_in(Route::new("grid_in", 2.5))
            .with_grid_out(Route::new("grid_out", 1.5));
        assert!(!snapshot.independent_grid_in_out);
        assert_eq!(snapshot.grid_import(), 2.5);
        assert_eq!(snapshot.grid_export(), 1.5);
        assert!(snapshot.has_grid());

        let snapshot = FlowSnapshot::new()
            .with_grid_in(Route::new("grid_in", 0.0))
            .with_grid_out(Route::new("grid_out", 150.0));
        assert_eq!(snapshot.grid_import(), 0.0);
        assert_eq!(snapshot.grid_export(), 150.0);
    }

    #[test]
    fn test_grid_sensors() {
        let sensors = || {
            (
                Some(Route::new("grid_in", -40.0)),
                Some(Route::new("grid_out", 60.0)),
            )
        };

        // One signed sensor: the export sensor is dropped.
        let (grid_in, grid_out) = sensors();
        let snapshot = FlowSnapshot::new().with_grid_sensors(grid_in, grid_out);
        assert_eq!(snapshot.grid_out_route, None);
        assert_eq!(snapshot.grid_import(), 0.0);
        assert_eq!(snapshot.grid_export(), 40.0);

        let (grid_in, grid_out) = sensors();
        let snapshot = FlowSnapshot::new()
            .with_independent_grid_in_out(true)
            .with_grid_sensors(grid_in, grid_out);
        assert_eq!(snapshot.grid_out_route, Some(Route::new("grid_out", 60.0)));
        assert_eq!(snapshot.grid_export(), 60.0);

        let snapshot = FlowSnapshot::new().with_grid_sensors(None, None);
        assert!(!snapshot.has_grid());
    }

    #[test]
    fn test_totals() {
        let snapshot = FlowSnapshot::new()
            .with_generation(Route::new("pv_east", 100.0))
            .with_generation(Route::new("pv_west", 50.0))
            .with_generation(Route::synthetic("broken", f64::NAN))
            .with_consumer(Route::new("oven", 1000.0))
            .with_consumer(Route::synthetic("lights", 30.0))
            .with_battery("a", RoutePair::from_signed("a", None, 200.0, false))
            .with_battery("b", RoutePair::from_signed("b", None, -70.0, false));

        assert_eq!(snapshot.generation_in_routes.len(), 3);
        assert!(snapshot.generation_in_routes.contains_key("generation_2"));
        assert!(snapshot.consumer_routes.contains_key("consumer_1"));

        assert_eq!(snapshot.generation_tracked_total(), 150.0);
        assert_eq!(snapshot.consumer_tracked_total(), 1030.0);
        assert_eq!(snapshot.battery_discharge_total(), 200.0);
        assert_eq!(snapshot.battery_charge_total(), 70.0);
        assert!(!snapshot.has_grid());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<(), serde_json::Error> {
        let json = r#"{
            "generation_in_routes": {
                "pv": {"id": "pv", "icon": "solar", "rate": 1200.0}
            },
            "grid_in_route": {"id": "grid", "rate": -300.0},
            "consumer_routes": {
                "oven": {"id": "oven", "text": "Oven", "rate": 700.0},
                "car": {"id": "car", "rate": 150.0}
            },
            "battery_routes": {
                "home": {
                    "in": {"id": "home", "rate": 0.0},
                    "out": {"rate": 50.0}
                }
            },
            "hide_consumers_below": 100.0
        }"#;
        let snapshot: FlowSnapshot = serde_json::from_str(json)?;

        assert_eq!(snapshot.grid_export(), 300.0);
        assert_eq!(snapshot.battery_charge_total(), 50.0);
        assert_eq!(snapshot.max_consumer_branches, 0);
        assert_eq!(
            snapshot.generation_in_routes.get("pv").and_then(|r| r.icon.clone()),
            Some(crate::Icon::Solar)
        );
        let keys: Vec<_> = snapshot.consumer_routes.keys().collect();
        assert_eq!(keys, vec!["oven", "car"]);

        let round_tripped: FlowSnapshot =
            serde_json::from_str(&serde_json::to_string(&snapshot)?)?;
        assert_eq!(round_tripped, snapshot);
        Ok(())
    }
}
