//! Named identities near the quarter turns, and the host-side tracker that
//! decides when the highlight card is shown and cleared.

use crate::error::ClassifyError;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::time::{Duration, Instant};

/// How close θ must be to a quarter turn to count as that identity
pub const THRESHOLD: f64 = 0.1;
/// A remote classifier is only asked once θ has stayed put this long
pub const REMOTE_SETTLE: Duration = Duration::from_millis(200);
/// A card that stops matching lingers this long before it is dropped
pub const CLEAR_DELAY: Duration = Duration::from_millis(300);

const KEY_ANGLES: [(f64, &str); 5] = [
    (0.0, "e^(i·0)=1"),
    (FRAC_PI_2, "e^(i·π/2)=i"),
    (PI, "e^(i·π)=-1"),
    (3.0 * FRAC_PI_2, "e^(i·3π/2)=-i"),
    (TAU, "e^(i·2π)=1"),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlight {
    pub identity: String,
    pub should_highlight: bool,
}

impl Highlight {
    pub fn none() -> Self {
        Highlight::default()
    }
}

/// Maps θ to the identity it sits on, if any
pub fn classify(theta: f64) -> Highlight {
    let wrapped = theta.rem_euclid(TAU);
    KEY_ANGLES
        .iter()
        .find(|(angle, _)| (wrapped - angle).abs() < THRESHOLD)
        .map(|(_, identity)| Highlight {
            identity: identity.to_string(),
            should_highlight: true,
        })
        .unwrap_or_default()
}

/// Anything that can answer the identity question, locally or remotely
pub trait IdentityClassifier {
    fn classify(&mut self, theta: f64) -> Result<Highlight, ClassifyError>;

    /// How long θ must be stable before asking
    fn settle_time(&self) -> Duration {
        REMOTE_SETTLE
    }
}

/// In-process threshold check; cheap enough to run on every change
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClassifier;

impl IdentityClassifier for LocalClassifier {
    fn classify(&mut self, theta: f64) -> Result<Highlight, ClassifyError> {
        Ok(classify(theta))
    }

    fn settle_time(&self) -> Duration {
        Duration::ZERO
    }
}

/// Debounces θ changes into classifier calls and manages the card lifetime
#[derive(Debug)]
pub struct HighlightTracker<C> {
    classifier: C,
    pending: Option<(f64, Instant)>,
    current: Option<Highlight>,
    visible: bool,
    clear_at: Option<Instant>,
}

impl<C: IdentityClassifier> HighlightTracker<C> {
    pub fn new(classifier: C) -> Self {
        HighlightTracker {
            classifier,
            pending: None,
            current: None,
            visible: false,
            clear_at: None,
        }
    }

    /// Records a new θ; the settle timer restarts whenever θ moves
    pub fn observe(&mut self, theta: f64, now: Instant) {
        match self.pending {
            Some((pending, _)) if pending == theta => {}
            _ => self.pending = Some((theta, now)),
        }
    }

    /// Runs whatever timers are due at `now`
    pub fn poll(&mut self, now: Instant) {
        if let Some((theta, since)) = self.pending {
            if now.saturating_duration_since(since) >= self.classifier.settle_time() {
                self.pending = None;
                let result = self.classifier.classify(theta).unwrap_or_else(|err| {
                    log::warn!("identity classification failed, not highlighting: {err}");
                    Highlight::none()
                });
                self.apply(result, now);
            }
        }

        if let Some(at) = self.clear_at {
            if now >= at {
                self.current = None;
                self.clear_at = None;
            }
        }
    }

    fn apply(&mut self, result: Highlight, now: Instant) {
        if result.should_highlight {
            self.current = Some(result);
            self.visible = true;
            self.clear_at = None;
        } else {
            self.visible = false;
            if self.current.is_some() && self.clear_at.is_none() {
                self.clear_at = Some(now + CLEAR_DELAY);
            }
        }
    }

    /// The card to draw, if any, and whether it is fully shown or fading
    pub fn card(&self) -> Option<(&Highlight, bool)> {
        self.current.as_ref().map(|h| (h, self.visible))
    }
}
