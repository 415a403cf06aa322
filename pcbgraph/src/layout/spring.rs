//! Force-directed layout (Fruchterman-Reingold).
//!
//! Every pair of nodes repels with k²/d and every edge attracts with d²/k.
//! Each step is capped by a temperature that decays geometrically, and the
//! loop never runs more than the configured number of iterations, so a call
//! always terminates. Stopping on the budget is not an error: the positions
//! reached so far are returned with `converged = false`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::graph::KnowledgeGraph;
use crate::layout::hierarchical::HierarchicalConfig;
use crate::layout::rng::XorShift64Star;
use crate::layout::{
    check_positive, LayerInfo, Layout, LayoutAlgorithm, LayoutEngine, LayoutError, Point,
};
use crate::model::NodeKind;

const MIN_DISTANCE: f64 = 0.01;
const SEPARATION_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Seed for the initial positions.
    pub seed: u64,
    /// Hard cap on simulation steps.
    pub iterations: usize,
    /// Temperature multiplier per step, in (0, 1].
    pub cooling: f64,
    /// Ideal edge length.
    pub k: f64,
    /// Stop early once no node moves further than this in one step.
    pub tolerance: f64,
    /// Distance below which two nodes are pushed apart after the simulation.
    pub min_separation: f64,
    /// Maximum sweeps of the separation pass.
    pub separation_passes: usize,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 200,
            cooling: 0.95,
            k: 1.0,
            tolerance: 1e-4,
            min_separation: 0.05,
            separation_passes: 10,
        }
    }
}

impl SpringConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.iterations == 0 {
            return Err(LayoutError::InvalidConfig(
                "spring.iterations must be at least 1".into(),
            ));
        }
        if !(self.cooling > 0.0 && self.cooling <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "spring.cooling must be in (0, 1], got {}",
                self.cooling
            )));
        }
        check_positive("spring.k", self.k)?;
        for (name, value) in [
            ("spring.tolerance", self.tolerance),
            ("spring.min_separation", self.min_separation),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpringLayout {
    config: SpringConfig,
}

impl SpringLayout {
    pub fn new(config: SpringConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Same settings with a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Push apart pairs closer than `min_separation`. Returns true when no pair is too close.
    fn separate(&self, pos: &mut [Point]) -> bool {
        let min_sep = self.config.min_separation;
        if min_sep <= 0.0 {
            return true;
        }
        for _ in 0..self.config.separation_passes {
            let mut clean = true;
            for i in 0..pos.len() {
                for j in (i + 1)..pos.len() {
                    let dx = pos[j].x - pos[i].x;
                    let dy = pos[j].y - pos[i].y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist >= min_sep - SEPARATION_SLACK {
                        continue;
                    }
                    clean = false;
                    // Coincident nodes get a direction derived from their indices.
                    let (ux, uy) = if dist > f64::EPSILON {
                        (dx / dist, dy / dist)
                    } else {
                        let angle = TAU * ((i * 31 + j * 17) % 360) as f64 / 360.0;
                        (angle.cos(), angle.sin())
                    };
                    let push = (min_sep - dist) / 2.0;
                    pos[i].x -= ux * push;
                    pos[i].y -= uy * push;
                    pos[j].x += ux * push;
                    pos[j].y += uy * push;
                }
            }
            if clean {
                return true;
            }
        }
        false
    }
}

impl LayoutEngine for SpringLayout {
    fn algorithm(&self) -> LayoutAlgorithm {
        LayoutAlgorithm::Spring
    }

    fn layout(&self, graph: &KnowledgeGraph) -> Layout {
        let mut layout = Layout::new(LayoutAlgorithm::Spring);
        let layers = HierarchicalConfig::default();
        for kind in NodeKind::ALL {
            layout
                .layers
                .insert(kind, LayerInfo::new(layers.layer_of(kind), None));
        }

        // Sorted ids and edges keep the result independent of insertion order.
        let mut ids: Vec<&str> = graph.nodes().map(|n| n.id()).collect();
        ids.sort_unstable();
        let n = ids.len();
        if n == 0 {
            layout.iterations = Some(0);
            return layout;
        }
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut edges: Vec<(usize, usize)> = graph
            .edges()
            .filter_map(|e| Some((*index.get(e.source)?, *index.get(e.target)?)))
            .collect();
        edges.sort_unstable();

        let k = self.config.k;
        let k_squared = k * k;
        let extent = k * (n as f64).sqrt();
        let mut temperature = extent / 10.0;

        let mut rng = XorShift64Star::new(self.config.seed);
        let mut pos: Vec<Point> = (0..n)
            .map(|_| Point::new(rng.next_f64_signed() * extent, rng.next_f64_signed() * extent))
            .collect();

        let mut converged = false;
        let mut steps = 0;
        let mut disp = vec![(0.0f64, 0.0f64); n];

        while steps < self.config.iterations {
            steps += 1;
            disp.iter_mut().for_each(|d| *d = (0.0, 0.0));

            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = pos[i].x - pos[j].x;
                    let dy = pos[i].y - pos[j].y;
                    let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let force = k_squared / dist;
                    let fx = dx / dist * force;
                    let fy = dy / dist * force;
                    disp[i].0 += fx;
                    disp[i].1 += fy;
                    disp[j].0 -= fx;
                    disp[j].1 -= fy;
                }
            }

            for &(s, t) in &edges {
                let dx = pos[t].x - pos[s].x;
                let dy = pos[t].y - pos[s].y;
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = dist * dist / k;
                let fx = dx / dist * force;
                let fy = dy / dist * force;
                disp[s].0 += fx;
                disp[s].1 += fy;
                disp[t].0 -= fx;
                disp[t].1 -= fy;
            }

            let mut max_step: f64 = 0.0;
            for (p, &(fx, fy)) in pos.iter_mut().zip(&disp) {
                let mag = (fx * fx + fy * fy).sqrt();
                if mag <= f64::EPSILON {
                    continue;
                }
                let step = mag.min(temperature);
                p.x += fx / mag * step;
                p.y += fy / mag * step;
                max_step = max_step.max(step);
            }

            temperature *= self.config.cooling;

            if max_step < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::debug!(
                "Spring layout stopped on its budget of {} iterations",
                self.config.iterations
            );
        }
        if !self.separate(&mut pos) {
            tracing::debug!(
                "Spring layout left nodes closer than {}",
                self.config.min_separation
            );
        }

        layout.positions = ids
            .iter()
            .zip(pos)
            .map(|(id, p)| (id.to_string(), p))
            .collect();
        layout.iterations = Some(steps);
        layout.converged = converged;
        layout
    }
}
