use crate::types::{Leg, PerLeg};

/// Umbrales de gradiente promediado para confirmar un heel-strike.
/// Asimétricos entre piernas; valores de calibración empíricos del sensor.
pub const DEFAULT_LEFT_THRESHOLD: f32 = 20_000.0;
pub const DEFAULT_RIGHT_THRESHOLD: f32 = 30_000.0;

/// Evento de marcha emitido una vez por ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitEvent {
    NoEvent,
    Confirmed(Leg),
}

/// Etapa de confirmación del detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    /// Primera etapa superada para esta pierna; falta la confirmación
    Provisional(Leg),
}

/// Detector de heel-strike con confirmación en dos etapas.
///
/// La pierna candidata la siembra un controlador de fase de swing externo
/// al inicio de cada paso. Un solo ciclo con gradiente sobre el umbral pasa
/// a `Provisional`; se necesita un segundo ciclo consecutivo que también lo
/// supere para emitir `Confirmed` (histéresis contra ruido). Al confirmar,
/// candidata y etapa se reinician; como máximo una confirmación por siembra.
#[derive(Debug, Clone, Copy)]
pub struct HeelStrikeDetector {
    thresholds: PerLeg<f32>,
    candidate: Option<Leg>,
    stage: Stage,
}

impl HeelStrikeDetector {
    pub fn new(thresholds: PerLeg<f32>) -> Self {
        Self {
            thresholds,
            candidate: None,
            stage: Stage::Idle,
        }
    }

    /// Siembra la pierna que se espera que aterrice a continuación.
    /// `None` deja el detector inactivo.
    pub fn set_candidate(&mut self, leg: Option<Leg>) {
        self.candidate = leg;
    }

    pub fn candidate(&self) -> Option<Leg> {
        self.candidate
    }

    /// `true` si hay una primera etapa pendiente de confirmación
    pub fn is_provisional(&self) -> bool {
        matches!(self.stage, Stage::Provisional(_))
    }

    /// Evalúa un ciclo con los gradientes promediados de ambas piernas.
    ///
    /// La etapa solo avanza hacia la pierna candidata, nunca directamente a
    /// la opuesta: Idle -> Provisional -> Confirmed -> Idle.
    pub fn evaluate(&mut self, averaged_gradients: PerLeg<f32>) -> GaitEvent {
        let Some(candidate) = self.candidate else {
            return GaitEvent::NoEvent;
        };

        let qualifies = averaged_gradients[candidate] > self.thresholds[candidate];

        match self.stage {
            Stage::Provisional(leg) if leg == candidate && qualifies => {
                self.candidate = None;
                self.stage = Stage::Idle;
                GaitEvent::Confirmed(candidate)
            }
            Stage::Idle if qualifies => {
                self.stage = Stage::Provisional(candidate);
                GaitEvent::NoEvent
            }
            _ => GaitEvent::NoEvent,
        }
    }

    /// Reinicio explícito de sesión
    pub fn reset(&mut self) {
        self.candidate = None;
        self.stage = Stage::Idle;
    }
}

impl Default for HeelStrikeDetector {
    fn default() -> Self {
        Self::new(PerLeg::new(DEFAULT_LEFT_THRESHOLD, DEFAULT_RIGHT_THRESHOLD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grads(left: f32, right: f32) -> PerLeg<f32> {
        PerLeg::new(left, right)
    }

    #[test]
    fn two_qualifying_cycles_confirm_right() {
        let mut detector = HeelStrikeDetector::default();
        detector.set_candidate(Some(Leg::Right));

        // Ciclo 1: sobre el umbral -> provisional, sin evento
        assert_eq!(detector.evaluate(grads(0.0, 35_000.0)), GaitEvent::NoEvent);
        assert!(detector.is_provisional());

        // Ciclo 2: de nuevo sobre el umbral -> confirmado y reinicio total
        assert_eq!(
            detector.evaluate(grads(0.0, 31_000.0)),
            GaitEvent::Confirmed(Leg::Right)
        );
        assert_eq!(detector.candidate(), None);
        assert!(!detector.is_provisional());
    }

    #[test]
    fn single_qualifying_cycle_never_confirms() {
        let mut detector = HeelStrikeDetector::default();
        detector.set_candidate(Some(Leg::Right));

        assert_eq!(detector.evaluate(grads(0.0, 40_000.0)), GaitEvent::NoEvent);
        // Ciclo siguiente por debajo del umbral: la etapa queda pendiente,
        // pero no hay confirmación
        assert_eq!(detector.evaluate(grads(0.0, 100.0)), GaitEvent::NoEvent);
        assert!(detector.is_provisional());
    }

    #[test]
    fn no_candidate_means_no_event() {
        let mut detector = HeelStrikeDetector::default();
        for _ in 0..5 {
            assert_eq!(
                detector.evaluate(grads(1e9, 1e9)),
                GaitEvent::NoEvent
            );
        }
        assert!(!detector.is_provisional());
    }

    #[test]
    fn left_threshold_is_asymmetric() {
        let mut detector = HeelStrikeDetector::default();
        detector.set_candidate(Some(Leg::Left));

        // 25000 supera el umbral izquierdo (20000) aunque no el derecho
        assert_eq!(detector.evaluate(grads(25_000.0, 0.0)), GaitEvent::NoEvent);
        assert_eq!(
            detector.evaluate(grads(25_000.0, 0.0)),
            GaitEvent::Confirmed(Leg::Left)
        );
    }

    #[test]
    fn stage_never_advances_to_opposite_leg() {
        let mut detector = HeelStrikeDetector::default();
        detector.set_candidate(Some(Leg::Left));
        assert_eq!(detector.evaluate(grads(25_000.0, 0.0)), GaitEvent::NoEvent);
        assert!(detector.is_provisional());

        // El controlador cambia la candidata con una etapa izquierda pendiente:
        // la pierna derecha no puede confirmar sobre esa etapa
        detector.set_candidate(Some(Leg::Right));
        assert_eq!(detector.evaluate(grads(0.0, 50_000.0)), GaitEvent::NoEvent);
        assert_eq!(detector.evaluate(grads(0.0, 50_000.0)), GaitEvent::NoEvent);
    }

    #[test]
    fn opposite_leg_gradient_is_ignored() {
        let mut detector = HeelStrikeDetector::default();
        detector.set_candidate(Some(Leg::Right));

        // Gradiente enorme en la pierna no candidata: nada ocurre
        assert_eq!(detector.evaluate(grads(1e9, 0.0)), GaitEvent::NoEvent);
        assert!(!detector.is_provisional());
    }
}
