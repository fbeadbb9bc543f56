// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Routes are named flows carrying a single scalar rate.
//!
//! The engine never looks at units: a rate can be a power in W or an energy
//! in kWh, as long as all routes of a snapshot agree.

use std::fmt::Display;

use crate::Error;

/// The icon to show next to a route's label.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Icon {
    Solar,
    TransmissionTower,
    UnknownSource,
    Battery,
    BatteryCharging,
    Custom(String),
}

impl Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Icon::Solar => write!(f, "solar-power"),
            Icon::TransmissionTower => write!(f, "transmission-tower"),
            Icon::UnknownSource => write!(f, "help-rhombus"),
            Icon::Battery => write!(f, "battery"),
            Icon::BatteryCharging => write!(f, "battery-charging"),
            Icon::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A named flow.
///
/// `id` correlates the route with the external entity that produced it and
/// is `None` for synthetic routes.  `rate` may be zero, and for single-sensor
/// grid or battery readings its sign carries the direction.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub text: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub icon: Option<Icon>,
    pub rate: f64,
}

impl Route {
    /// Creates a route with the given id and rate.
    pub fn new(id: impl Into<String>, rate: f64) -> Self {
        Self {
            id: Some(id.into()),
            text: None,
            icon: None,
            rate,
        }
    }

    /// Creates a route without an id.
    pub fn synthetic(text: impl Into<String>, rate: f64) -> Self {
        Self {
            id: None,
            text: Some(text.into()),
            icon: None,
            rate,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// The rate, with NaN readings treated as zero.
    pub(crate) fn rate_or_zero(&self) -> f64 {
        if self.rate.is_nan() {
            0.0
        } else {
            self.rate
        }
    }
}

/// A battery's bidirectional behavior, as two routes.
///
/// `in` is the rate flowing *into the distribution system* (the battery is
/// discharging), `out` the rate flowing out of the system into the battery
/// (charging).  For power flows at most one of them is non-zero at a time;
/// accumulated energy over a period can have both.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePair {
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    pub in_route: Route,
    #[cfg_attr(feature = "serde", serde(rename = "out"))]
    pub out_route: Route,
}

impl RoutePair {
    pub fn new(in_route: Route, out_route: Route) -> Self {
        Self {
            in_route,
            out_route,
        }
    }

    /// Builds a pair from a single signed battery reading.
    ///
    /// A positive `rate` means the battery is discharging into the system.
    /// Set `invert` for sensors that report the opposite sign.
    pub fn from_signed(id: impl Into<String>, text: Option<String>, rate: f64, invert: bool) -> Self {
        let rate = if invert { -rate } else { rate };
        Self {
            in_route: Route {
                id: Some(id.into()),
                text,
                icon: None,
                rate: rate.max(0.0),
            },
            out_route: Route {
                id: None,
                text: None,
                icon: None,
                rate: (-rate).max(0.0),
            },
        }
    }

    /// The rate this battery discharges into the system.
    pub fn discharge_rate(&self) -> f64 {
        let in_rate = self.in_route.rate_or_zero();
        let out_rate = self.out_route.rate_or_zero();
        if in_rate > 0.0 {
            in_rate
        } else if out_rate < 0.0 {
            -out_rate
        } else {
            0.0
        }
    }

    /// The rate this battery draws from the system to charge.
    pub fn charge_rate(&self) -> f64 {
        let in_rate = self.in_route.rate_or_zero();
        let out_rate = self.out_route.rate_or_zero();
        if out_rate > 0.0 {
            out_rate
        } else if in_rate < 0.0 {
            -in_rate
        } else {
            0.0
        }
    }
}

/// An id → value map that remembers insertion order.
///
/// Fan-outs are laid out in this order, so it has to be deterministic and
/// under the caller's control.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for RouteMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> RouteMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one for the same key.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Inserts a value, failing if the key is already present.
    pub fn try_insert(&mut self, key: impl Into<String>, value: T) -> Result<(), Error> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(Error::duplicate_route(format!(
                "Route with id {key} already exists."
            )));
        }
        self.entries.push((key, value));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for RouteMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = RouteMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<T> IntoIterator for RouteMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::RouteMap;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::marker::PhantomData;

    impl<T: Serialize> Serialize for RouteMap<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (k, v) in self.iter() {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }

    struct RouteMapVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for RouteMapVisitor<T> {
        type Value = RouteMap<T>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a map of route ids to routes")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = RouteMap::new();
            while let Some((k, v)) = access.next_entry::<String, T>()? {
                map.insert(k, v);
            }
            Ok(map)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for RouteMap<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(RouteMapVisitor(PhantomData))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_map_order() -> Result<(), Error> {
        let mut map = RouteMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        map.insert("c", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a", "c"]);

        assert_eq!(map.insert("a", 10), Some(1));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(map.get("a"), Some(&10));

        assert_eq!(
            map.try_insert("c", 4),
            Err(Error::duplicate_route("Route with id c already exists."))
        );
        map.try_insert("d", 4)?;

        assert_eq!(map.remove("b"), Some(2));
        assert_eq!(map.remove("b"), None);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [10, 3, 4]);
        assert_eq!(map.len(), 3);
        Ok(())
    }

    #[test]
    fn test_battery_rates() {
        let discharging = RoutePair::from_signed("bat", None, 250.0, false);
        assert_eq!(discharging.discharge_rate(), 250.0);
        assert_eq!(discharging.charge_rate(), 0.0);
        assert_eq!(discharging.in_route.id.as_deref(), Some("bat"));
        assert_eq!(discharging.out_route.id, None);

        let charging = RoutePair::from_signed("bat", None, 250.0, true);
        assert_eq!(charging.discharge_rate(), 0.0);
        assert_eq!(charging.charge_rate(), 250.0);

        // Signed readings on either side are read symmetrically.
        let pair = RoutePair::new(Route::new("bat", -40.0), Route::synthetic("", 0.0));
        assert_eq!(pair.charge_rate(), 40.0);
        assert_eq!(pair.discharge_rate(), 0.0);
        let pair = RoutePair::new(Route::new("bat", 0.0), Route::synthetic("", -40.0));
        assert_eq!(pair.discharge_rate(), 40.0);
        assert_eq!(pair.charge_rate(), 0.0);

        // Accumulated energy can flow both ways in one period.
        let pair = RoutePair::new(Route::new("bat", 1.5), Route::new("bat_out", 2.0));
        assert_eq!(pair.discharge_rate(), 1.5);
        assert_eq!(pair.charge_rate(), 2.0);

        let pair = RoutePair::new(Route::new("bat", f64::NAN), Route::new("bat_out", 2.0));
        assert_eq!(pair.discharge_rate(), 0.0);
    }

    #[test]
    fn test_icon_display() {
        assert_eq!(Icon::UnknownSource.to_string(), "help-rhombus");
        assert_eq!(Icon::Custom("mdi:car".into()).to_string(), "mdi:car");
    }
}
