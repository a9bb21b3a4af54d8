//! Fixed-delta contributions, optionally expiring.

use std::rc::Rc;

use viv_clock::{SimClock, SimTime};

use crate::cadence::Cadence;
use crate::error::{VarError, VarResult};
use crate::modifier::Modifier;

/// A fixed-delta contribution: a permanent bonus or malus, or one that
/// expires after a fixed duration from creation.
///
/// A non-expiring constant is the cheapest modifier there is — its owner
/// never recomputes until the modifier set changes.
#[derive(Debug)]
pub struct ConstantModifier {
    delta: f64,
    description: Option<String>,
    expiry: Option<Expiry>,
}

#[derive(Debug)]
struct Expiry {
    clock: Rc<SimClock>,
    expires_at: SimTime,
}

impl ConstantModifier {
    /// A constant contribution that never expires.
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            description: None,
            expiry: None,
        }
    }

    /// A constant contribution that becomes removable once `duration`
    /// virtual units have elapsed from creation.
    pub fn expiring(clock: Rc<SimClock>, delta: f64, duration: f64) -> VarResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VarError::NonPositiveDuration { duration });
        }
        let expires_at = clock.after(duration);
        Ok(Self {
            delta,
            description: None,
            expiry: Some(Expiry { clock, expires_at }),
        })
    }

    /// Attach an inspector description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Modifier for ConstantModifier {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn value(&self) -> f64 {
        self.delta
    }

    fn can_be_removed(&self) -> bool {
        match &self.expiry {
            Some(expiry) => expiry.clock.now() >= expiry.expires_at,
            None => false,
        }
    }

    fn cadence(&self) -> Cadence {
        if self.expiry.is_some() {
            Cadence::EachTick
        } else {
            Cadence::Never
        }
    }
}
