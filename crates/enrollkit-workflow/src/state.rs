//! Enrollment step state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Steps of one enrollment session.
///
/// Steps advance only through [`EnrollmentStep::can_transition_to`]-approved
/// edges. The two hardware steps allow a self-loop so an operator retry
/// re-enters the step without restarting the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStep {
    /// Collecting the account identity.
    Identity,

    /// Collecting the employment profile.
    Profile,

    /// Writing the proximity card credential.
    Proximity,

    /// Capturing the facial biometric credential.
    Biometric,

    /// Operator review of the completed enrollment.
    Review,

    /// Terminal: enrollment confirmed.
    Committed,

    /// Terminal: enrollment abandoned.
    Cancelled,
}

impl fmt::Display for EnrollmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            EnrollmentStep::Identity => "Identity",
            EnrollmentStep::Profile => "Profile",
            EnrollmentStep::Proximity => "Proximity",
            EnrollmentStep::Biometric => "Biometric",
            EnrollmentStep::Review => "Review",
            EnrollmentStep::Committed => "Committed",
            EnrollmentStep::Cancelled => "Cancelled",
        };
        write!(f, "{step}")
    }
}

impl EnrollmentStep {
    /// Whether a transition to `target` is allowed from this step.
    ///
    /// # Examples
    ///
    /// ```
    /// use enrollkit_workflow::EnrollmentStep;
    ///
    /// assert!(EnrollmentStep::Identity.can_transition_to(&EnrollmentStep::Profile));
    /// assert!(EnrollmentStep::Proximity.can_transition_to(&EnrollmentStep::Proximity));
    /// assert!(!EnrollmentStep::Identity.can_transition_to(&EnrollmentStep::Committed));
    /// ```
    pub fn can_transition_to(&self, target: &EnrollmentStep) -> bool {
        // Every non-terminal step may be cancelled.
        if *target == EnrollmentStep::Cancelled {
            return !self.is_terminal();
        }

        matches!(
            (self, target),
            (EnrollmentStep::Identity, EnrollmentStep::Profile)
                | (EnrollmentStep::Profile, EnrollmentStep::Proximity)
                // Self-loop: operator retry re-enters the step.
                | (EnrollmentStep::Proximity, EnrollmentStep::Proximity)
                | (EnrollmentStep::Proximity, EnrollmentStep::Biometric)
                | (EnrollmentStep::Biometric, EnrollmentStep::Biometric)
                // Completion and operator skip share the same edge.
                | (EnrollmentStep::Biometric, EnrollmentStep::Review)
                | (EnrollmentStep::Review, EnrollmentStep::Committed)
        )
    }

    /// Whether this step ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrollmentStep::Committed | EnrollmentStep::Cancelled)
    }
}

/// One recorded step transition.
///
/// # Serialization Note
///
/// The `timestamp` field is not serialized (`Instant` is process-specific);
/// deserialized transitions are stamped with the time of deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTransition {
    /// The step transitioned from.
    pub from: EnrollmentStep,

    /// The step transitioned to.
    pub to: EnrollmentStep,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StepTransition {
    /// Create a transition record stamped now.
    pub fn new(from: EnrollmentStep, to: EnrollmentStep) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time elapsed since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        assert!(EnrollmentStep::Identity.can_transition_to(&EnrollmentStep::Profile));
        assert!(EnrollmentStep::Profile.can_transition_to(&EnrollmentStep::Proximity));
        assert!(EnrollmentStep::Proximity.can_transition_to(&EnrollmentStep::Biometric));
        assert!(EnrollmentStep::Biometric.can_transition_to(&EnrollmentStep::Review));
        assert!(EnrollmentStep::Review.can_transition_to(&EnrollmentStep::Committed));
    }

    #[test]
    fn test_retry_self_loops() {
        assert!(EnrollmentStep::Proximity.can_transition_to(&EnrollmentStep::Proximity));
        assert!(EnrollmentStep::Biometric.can_transition_to(&EnrollmentStep::Biometric));

        // The data-entry and review steps have no retry loop.
        assert!(!EnrollmentStep::Identity.can_transition_to(&EnrollmentStep::Identity));
        assert!(!EnrollmentStep::Profile.can_transition_to(&EnrollmentStep::Profile));
        assert!(!EnrollmentStep::Review.can_transition_to(&EnrollmentStep::Review));
    }

    #[test]
    fn test_no_skipping_forward() {
        assert!(!EnrollmentStep::Identity.can_transition_to(&EnrollmentStep::Proximity));
        assert!(!EnrollmentStep::Identity.can_transition_to(&EnrollmentStep::Committed));
        assert!(!EnrollmentStep::Profile.can_transition_to(&EnrollmentStep::Review));
        assert!(!EnrollmentStep::Proximity.can_transition_to(&EnrollmentStep::Review));
    }

    #[test]
    fn test_no_going_back() {
        assert!(!EnrollmentStep::Profile.can_transition_to(&EnrollmentStep::Identity));
        assert!(!EnrollmentStep::Review.can_transition_to(&EnrollmentStep::Biometric));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        for step in [
            EnrollmentStep::Identity,
            EnrollmentStep::Profile,
            EnrollmentStep::Proximity,
            EnrollmentStep::Biometric,
            EnrollmentStep::Review,
        ] {
            assert!(step.can_transition_to(&EnrollmentStep::Cancelled), "{step}");
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for step in [EnrollmentStep::Committed, EnrollmentStep::Cancelled] {
            assert!(step.is_terminal());
            for target in [
                EnrollmentStep::Identity,
                EnrollmentStep::Profile,
                EnrollmentStep::Proximity,
                EnrollmentStep::Biometric,
                EnrollmentStep::Review,
                EnrollmentStep::Committed,
                EnrollmentStep::Cancelled,
            ] {
                assert!(!step.can_transition_to(&target), "{step} -> {target}");
            }
        }
    }

    #[test]
    fn test_step_serialization() {
        let json = serde_json::to_string(&EnrollmentStep::Proximity).unwrap();
        assert_eq!(json, "\"proximity\"");

        let step: EnrollmentStep = serde_json::from_str("\"biometric\"").unwrap();
        assert_eq!(step, EnrollmentStep::Biometric);
    }

    #[test]
    fn test_transition_record() {
        let transition = StepTransition::new(EnrollmentStep::Identity, EnrollmentStep::Profile);
        assert_eq!(transition.from, EnrollmentStep::Identity);
        assert_eq!(transition.to, EnrollmentStep::Profile);
        let _ = transition.elapsed();
    }
}
