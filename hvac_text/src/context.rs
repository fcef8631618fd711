// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Context for layout.

use alloc::string::String;

use hashbrown::HashMap;

use crate::lru_cache::{LookupKey, LruCache};
use crate::measure::{CharEdge, MeasurementProvider, RunPositions, StyleMetrics};
use crate::style::{BaselineOffset, MetricsKey, Style};

/// Maximum number of measured runs kept between layout passes.
const MAX_CACHED_RUNS: usize = 64;

/// Tunables of the line breaker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Width used when the constraints leave the width open.
    pub unconstrained_width: f32,
    /// Smallest indent reserved for a bullet.
    pub min_bullet_indent: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unconstrained_width: 32000.0,
            min_bullet_indent: 8.0,
        }
    }
}

/// Size limits for a layout pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConstraints {
    /// Width lines are wrapped to; `0` leaves the width open.
    pub max_width: f32,
    /// Smallest reported width, also the width lines are aligned in.
    pub min_width: f32,
    /// Smallest reported height.
    pub min_height: f32,
}

impl LayoutConstraints {
    /// Constraints that wrap at `max_width`.
    pub fn wrapped(max_width: f32) -> Self {
        Self {
            max_width,
            ..Self::default()
        }
    }

    /// Whether lines are wrapped.
    pub fn is_constrained(&self) -> bool {
        self.max_width > 0.0
    }
}

#[derive(Clone, Debug, PartialEq)]
struct PositionsKey {
    metrics: MetricsKey,
    text: String,
}

struct PositionsLookup<'a> {
    metrics: &'a MetricsKey,
    text: &'a str,
}

impl LookupKey<PositionsKey> for PositionsLookup<'_> {
    fn eq(&self, other: &PositionsKey) -> bool {
        *self.metrics == other.metrics && self.text == other.text
    }

    fn to_id(self) -> PositionsKey {
        PositionsKey {
            metrics: self.metrics.clone(),
            text: String::from(self.text),
        }
    }
}

/// Caches shared by the layout passes of one document.
///
/// Style metrics are keyed by the style attributes that affect measurement,
/// so any number of texts can share a context. Call [`clear`](Self::clear)
/// when the fonts behind the measurement provider change.
#[derive(Debug)]
pub struct LayoutContext {
    config: LayoutConfig,
    metrics: HashMap<MetricsKey, StyleMetrics>,
    positions: LruCache<PositionsKey, RunPositions>,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutContext {
    /// Creates a context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Creates a context with `config`.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            metrics: HashMap::new(),
            positions: LruCache::new(MAX_CACHED_RUNS),
        }
    }

    /// The line breaker configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Drops all cached measurements.
    pub fn clear(&mut self) {
        log::debug!(
            "dropping {} style metrics and {} measured runs",
            self.metrics.len(),
            self.positions.len()
        );
        self.metrics.clear();
        self.positions.clear();
    }

    /// Metrics of `style`, measured once per distinct set of font attributes.
    pub fn style_metrics(
        &mut self,
        style: &Style,
        provider: &mut dyn MeasurementProvider,
    ) -> StyleMetrics {
        let key = style.metrics_key();
        if let Some(metrics) = self.metrics.get(&key) {
            return *metrics;
        }
        let space_width = provider.measure_char(" ", style, 0, CharEdge::Trailing);
        let raw = StyleMetrics::from_font(provider.measure_style(style), space_width);
        let metrics = if key.baseline == BaselineOffset::Normal {
            raw
        } else {
            let mut on_baseline = style.clone();
            on_baseline.baseline = BaselineOffset::Normal;
            let base = self.style_metrics(&on_baseline, provider);
            raw.offset_from(base, style.baseline)
        };
        log::trace!("measured {} {}px: {metrics:?}", style.font, style.size);
        self.metrics.insert(key, metrics);
        metrics
    }

    /// Character edges of `text` drawn in `style`.
    pub(crate) fn run_positions(
        &mut self,
        style: &Style,
        text: &str,
        provider: &mut dyn MeasurementProvider,
    ) -> &RunPositions {
        let key = style.metrics_key();
        self.positions.entry(
            PositionsLookup {
                metrics: &key,
                text,
            },
            || RunPositions::measure(text, style, provider),
        )
    }
}
