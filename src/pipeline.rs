// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The per-frame pipeline: reconcile, scale, group, lay out and draw.

use tracing::{debug, trace};

use crate::{
    config::ParsedPalette,
    flows::{group_consumers, reconcile, FlowWidths, ReconciledFlows},
    layout::{
        BlendColors, Diagram, LabelMaker, Landmarks, Painter, Pane, ARROW_HEAD_LENGTH,
        FAN_PANE_WIDTH,
    },
    render_traits::{DefaultLabelFormatter, ExtrasRenderer, LabelFormatter, NoExtras},
    Error, FlowSnapshot, SankeyConfig,
};

/// The diagram engine.
///
/// Holds only the configuration and the injected strategies; every call to
/// [`render`][Sankey::render] depends on nothing but the snapshot passed in.
pub struct Sankey {
    config: SankeyConfig,
    palette: ParsedPalette,
    extras: Box<dyn ExtrasRenderer>,
    formatter: Box<dyn LabelFormatter>,
}

impl Sankey {
    /// Creates an engine, after validating `config`.
    pub fn try_new(config: SankeyConfig) -> Result<Self, Error> {
        let palette = config.palette.parse()?;
        Ok(Self {
            config,
            palette,
            extras: Box::new(NoExtras),
            formatter: Box::new(DefaultLabelFormatter),
        })
    }

    /// Draws extras at the end of each consumer branch.
    pub fn with_extras(mut self, extras: impl ExtrasRenderer + 'static) -> Self {
        self.extras = Box::new(extras);
        self
    }

    /// Formats label values with `formatter`.
    pub fn with_label_formatter(mut self, formatter: impl LabelFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn config(&self) -> &SankeyConfig {
        &self.config
    }

    /// Reconciles the snapshot without laying it out.
    pub fn reconcile(&self, snapshot: &FlowSnapshot) -> ReconciledFlows {
        reconcile(snapshot)
    }

    /// Runs the whole pipeline on `snapshot`.
    pub fn render(&self, snapshot: &FlowSnapshot) -> Diagram {
        let flows = reconcile(snapshot);
        let scale = flows.scale();
        let widths = FlowWidths::new(&flows, &scale);
        let grouped = group_consumers(
            &snapshot.consumer_routes,
            snapshot.hide_consumers_below,
            snapshot.max_consumer_branches,
        );
        let landmarks = Landmarks::new(&widths);
        let colors = BlendColors::new(&widths, &self.palette);

        trace!("Laying out with multiplier {}: {landmarks:?}", scale.multiplier());

        let painted = Painter {
            snapshot,
            flows: &flows,
            scale,
            widths: &widths,
            landmarks: &landmarks,
            colors: &colors,
            palette: &self.palette,
            extras: self.extras.as_ref(),
            labels: LabelMaker {
                formatter: self.formatter.as_ref(),
                unit: &self.config.unit,
            },
        }
        .paint(&grouped);

        let height = painted.height;
        let far_right_width = ARROW_HEAD_LENGTH + self.extras.extras_length();
        let consumers = grouped
            .into_iter()
            .map(|(_, route)| route)
            .chain(std::iter::once(flows.untracked_consumer.clone()))
            .collect();

        let diagram = Diagram {
            left: Pane::new(landmarks.x1, height, painted.left),
            mid: Pane::new(FAN_PANE_WIDTH, height, painted.mid),
            right: Pane::new(FAN_PANE_WIDTH, height, painted.right),
            far_right: Pane::new(far_right_width, height, painted.far_right),
            labels: painted.labels,
            flows,
            scale,
            widths,
            landmarks,
            colors,
            consumers,
            height,
        };
        debug!(
            "Rendered {} shapes and {} labels.",
            diagram.panes().iter().map(|p| p.shapes.len()).sum::<usize>(),
            diagram.labels.len()
        );
        diagram
    }
}

/// A [`Sankey`] that remembers the last snapshot it rendered, and renders
/// again only when the snapshot changes.
pub struct CachedSankey {
    sankey: Sankey,
    cache: Option<(FlowSnapshot, Diagram)>,
}

impl CachedSankey {
    pub fn new(sankey: Sankey) -> Self {
        Self {
            sankey,
            cache: None,
        }
    }

    pub fn sankey(&self) -> &Sankey {
        &self.sankey
    }

    /// Returns the diagram for `snapshot`, rendering it if it differs from
    /// the last one.
    pub fn render(&mut self, snapshot: &FlowSnapshot) -> &Diagram {
        if matches!(&self.cache, Some((cached, _)) if cached != snapshot) {
            trace!("Snapshot changed, rendering again.");
            self.cache = None;
        }
        let sankey = &self.sankey;
        let (_, diagram) = self
            .cache
            .get_or_insert_with(|| (snapshot.clone(), sankey.render(snapshot)));
        diagram
    }

    /// Returns true if the next [`render`][CachedSankey::render] of
    /// `snapshot` would be served from the cache.
    pub fn is_cached(&self, snapshot: &FlowSnapshot) -> bool {
        matches!(&self.cache, Some((cached, _)) if cached == snapshot)
    }

    /// Forgets the cached diagram.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }
}
