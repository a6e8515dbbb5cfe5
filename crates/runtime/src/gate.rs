use serde::Deserialize;
use tracing::debug;

/// Whether land outlines must be loaded before the map is first drawn.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandPolicy {
    /// Stay on the placeholder until land is ready.
    #[default]
    Required,
    /// Draw as soon as the viewport is known; land fills in later.
    Optional,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Loading,
    Ready,
}

/// Snapshot of both readiness signals, taken in one evaluation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GateInputs {
    pub viewport_known: bool,
    pub land_ready: bool,
}

impl GateInputs {
    pub fn new(viewport_known: bool, land_ready: bool) -> Self {
        Self {
            viewport_known,
            land_ready,
        }
    }

    /// Pure gate condition.
    pub fn satisfied(&self, policy: LandPolicy) -> bool {
        self.viewport_known && (self.land_ready || policy == LandPolicy::Optional)
    }
}

/// Loading → Ready once both inputs hold together. Ready is sticky until
/// [`RenderGate::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderGate {
    policy: LandPolicy,
    state: GateState,
    evaluations: u64,
}

impl RenderGate {
    pub fn new(policy: LandPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> LandPolicy {
        self.policy
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn evaluate(&mut self, inputs: GateInputs) -> GateState {
        self.evaluations += 1;
        if self.state == GateState::Loading && inputs.satisfied(self.policy) {
            self.state = GateState::Ready;
            debug!(evaluation = self.evaluations, "render gate opened");
        }
        self.state
    }

    pub fn reset(&mut self) {
        if self.state == GateState::Ready {
            debug!("render gate reset");
        }
        self.state = GateState::Loading;
    }
}

#[cfg(test)]
mod tests {
    use super::{GateInputs, GateState, LandPolicy, RenderGate};

    #[test]
    fn needs_both_inputs_in_any_order() {
        let orders = [
            [GateInputs::new(true, false), GateInputs::new(true, true)],
            [GateInputs::new(false, true), GateInputs::new(true, true)],
        ];
        for order in orders {
            let mut gate = RenderGate::new(LandPolicy::Required);
            assert_eq!(gate.evaluate(GateInputs::default()), GateState::Loading);
            assert_eq!(gate.evaluate(order[0]), GateState::Loading);
            assert_eq!(gate.evaluate(order[1]), GateState::Ready);
        }
    }

    #[test]
    fn never_ready_while_an_input_is_false() {
        for viewport_known in [false, true] {
            for land_ready in [false, true] {
                let mut gate = RenderGate::new(LandPolicy::Required);
                let state = gate.evaluate(GateInputs::new(viewport_known, land_ready));
                assert_eq!(state == GateState::Ready, viewport_known && land_ready);
            }
        }
    }

    #[test]
    fn ready_is_sticky_until_reset() {
        let mut gate = RenderGate::new(LandPolicy::Required);
        gate.evaluate(GateInputs::new(true, true));
        assert_eq!(gate.evaluate(GateInputs::new(true, false)), GateState::Ready);
        gate.reset();
        assert_eq!(gate.state(), GateState::Loading);
        assert_eq!(gate.evaluate(GateInputs::new(true, false)), GateState::Loading);
    }

    #[test]
    fn optional_land_only_waits_for_viewport() {
        let mut gate = RenderGate::new(LandPolicy::Optional);
        assert_eq!(gate.evaluate(GateInputs::new(false, false)), GateState::Loading);
        assert_eq!(gate.evaluate(GateInputs::new(true, false)), GateState::Ready);
    }

    #[test]
    fn policy_parses_from_config() {
        let p: LandPolicy = serde_json::from_str("\"optional\"").unwrap();
        assert_eq!(p, LandPolicy::Optional);
        assert!(serde_json::from_str::<LandPolicy>("\"sometimes\"").is_err());
    }
}
