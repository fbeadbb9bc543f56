// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Placement hints for the labels around a diagram.

use crate::{
    render_traits::{round_to_tenth, LabelFormatter},
    Icon,
};

/// What a label describes, and which edge of the diagram it sits on.
///
/// Coordinates of a [`LabelHint`] are in pixels and relative to:
///
/// - `Generation`: the left pane; `x` is the source's center and `y` the
///   top edge.
/// - `Grid`: the column left of the left pane; `y` is the label's center.
/// - `Battery`: the mid pane; `y` is the label's center.
/// - `Consumer`: the column right of the `far_right` pane; `y` is the
///   label's center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Generation,
    Grid,
    Battery,
    Consumer,
}

/// A label for a text-layout collaborator to place.
///
/// For grid labels `value` is the import and `secondary` the export; for
/// battery labels `value` is the charge and `secondary` the discharge.
/// Values are rounded to one decimal.  `id` is `None` for synthetic routes.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelHint {
    pub kind: LabelKind,
    pub id: Option<String>,
    pub icon: Option<Icon>,
    pub text: Option<String>,
    pub value: f64,
    pub secondary: Option<f64>,
    pub value_text: String,
    pub secondary_text: Option<String>,
    pub x: f64,
    pub y: f64,
}

/// Builds [`LabelHint`]s with a common formatter and unit.
pub(crate) struct LabelMaker<'a> {
    pub(crate) formatter: &'a dyn LabelFormatter,
    pub(crate) unit: &'a str,
}

impl LabelMaker<'_> {
    pub(crate) fn hint(&self, kind: LabelKind, value: f64) -> LabelHint {
        LabelHint {
            kind,
            id: None,
            icon: None,
            text: None,
            value: round_to_tenth(value),
            secondary: None,
            value_text: self.formatter.format_rate(value, self.unit),
            secondary_text: None,
            x: 0.0,
            y: 0.0,
        }
    }

    pub(crate) fn with_secondary(&self, mut hint: LabelHint, secondary: f64) -> LabelHint {
        hint.secondary = Some(round_to_tenth(secondary));
        hint.secondary_text = Some(self.formatter.format_rate(secondary, self.unit));
        hint
    }
}

impl LabelHint {
    pub(crate) fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn with_icon(mut self, icon: Option<Icon>) -> Self {
        self.icon = icon;
        self
    }

    pub(crate) fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    pub(crate) fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}
