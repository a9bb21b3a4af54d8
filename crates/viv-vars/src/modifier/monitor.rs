//! Contributions derived live from other variables.

use std::fmt;
use std::rc::Rc;

use crate::cadence::Cadence;
use crate::error::{VarError, VarResult};
use crate::modifier::Modifier;
use crate::variable::Variable;

/// A contribution computed fresh from other variables' current values on
/// every query.
///
/// Monitoring modifiers never expire on their own — removal is always an
/// explicit decision of the owner. Sources are held by shared ownership
/// (`Rc`), so an observed variable cannot be freed while still watched, and
/// attaching a monitor runs a dependency-cycle check instead of recursing
/// silently at query time.
pub struct MonitorModifier {
    sources: Vec<Rc<Variable>>,
    eval: Eval,
    description: Option<String>,
}

enum Eval {
    Sum,
    Min,
    Max,
    Remap { lo: f64, hi: f64 },
    Custom(Box<dyn Fn(&[f64]) -> f64>),
}

impl fmt::Debug for MonitorModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let eval = match &self.eval {
            Eval::Sum => "sum",
            Eval::Min => "min",
            Eval::Max => "max",
            Eval::Remap { .. } => "remap",
            Eval::Custom(_) => "custom",
        };
        f.debug_struct("MonitorModifier")
            .field("sources", &self.sources.len())
            .field("eval", &eval)
            .field("description", &self.description)
            .finish()
    }
}

impl MonitorModifier {
    /// The sum of the sources' current values.
    pub fn sum_of(sources: Vec<Rc<Variable>>) -> VarResult<Self> {
        Self::build(sources, Eval::Sum)
    }

    /// The minimum of the sources' current values.
    pub fn min_of(sources: Vec<Rc<Variable>>) -> VarResult<Self> {
        Self::build(sources, Eval::Min)
    }

    /// The maximum of the sources' current values.
    pub fn max_of(sources: Vec<Rc<Variable>>) -> VarResult<Self> {
        Self::build(sources, Eval::Max)
    }

    /// A linear remap of `source`'s bounded range onto `[lo, hi]`.
    ///
    /// The source must have both bounds finite — the remap is anchored on
    /// its normalized ratio.
    pub fn remap(source: Rc<Variable>, lo: f64, hi: f64) -> VarResult<Self> {
        if !source.min().is_finite() || !source.max().is_finite() {
            return Err(VarError::UnboundedSource);
        }
        Self::build(vec![source], Eval::Remap { lo, hi })
    }

    /// A caller-supplied function of the sources' current values.
    pub fn custom(
        sources: Vec<Rc<Variable>>,
        eval: impl Fn(&[f64]) -> f64 + 'static,
    ) -> VarResult<Self> {
        Self::build(sources, Eval::Custom(Box::new(eval)))
    }

    /// Attach an inspector description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn build(sources: Vec<Rc<Variable>>, eval: Eval) -> VarResult<Self> {
        if sources.is_empty() {
            return Err(VarError::NoSources);
        }
        Ok(Self {
            sources,
            eval,
            description: None,
        })
    }
}

impl Modifier for MonitorModifier {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn value(&self) -> f64 {
        if let Eval::Remap { lo, hi } = self.eval {
            return self.sources[0]
                .fraction()
                .map_or(lo, |ratio| lo + ratio * (hi - lo));
        }
        let values: Vec<f64> = self.sources.iter().map(|source| source.value()).collect();
        match &self.eval {
            Eval::Sum => values.iter().sum(),
            Eval::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Eval::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Eval::Custom(eval) => eval(&values),
            Eval::Remap { lo, .. } => *lo,
        }
    }

    fn can_be_removed(&self) -> bool {
        false
    }

    fn cadence(&self) -> Cadence {
        Cadence::Always
    }

    fn depends_on(&self, variable: &Rc<Variable>) -> bool {
        self.sources
            .iter()
            .any(|source| Rc::ptr_eq(source, variable) || source.observes(variable))
    }
}
