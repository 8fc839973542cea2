use crate::config::PipelineConfig;
use crate::cop;
use crate::gradient::{GradientError, GradientTracker};
use crate::heel_strike::{GaitEvent, HeelStrikeDetector};
use crate::spike_filter::SpikeFilter;
use crate::types::{FootMetrics, Leg, PerLeg, PressureFrame};

/// Resultado de un ciclo completo del pipeline
#[derive(Debug, Clone, Copy)]
pub struct CycleOutput {
    pub metrics: PerLeg<FootMetrics>,
    pub event: GaitEvent,
}

/// Pipeline de detección de fase de marcha.
///
/// Secuencia por ciclo: matrices -> suma y COP -> gradiente crudo ->
/// filtro de picos -> suavizado exponencial -> gradiente promediado ->
/// máquina de estados de heel-strike. Todo el estado persistente entre
/// ciclos (cadenas de gradiente, banderas del filtro, etapa del detector)
/// tiene un único dueño: esta estructura, mutada solo por el ciclo que la
/// invoca.
pub struct Pipeline {
    smoothing_alpha: f32,
    tracker: GradientTracker,
    spike_filter: SpikeFilter,
    detector: HeelStrikeDetector,
    /// Promedio exponencial de las sumas corregidas; `None` hasta la primera trama
    averaged: Option<PerLeg<f32>>,
    metrics: PerLeg<FootMetrics>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            smoothing_alpha: config.smoothing_alpha,
            tracker: GradientTracker::new(),
            spike_filter: SpikeFilter::new(config.spike_threshold),
            detector: HeelStrikeDetector::new(PerLeg::new(
                config.left_threshold,
                config.right_threshold,
            )),
            averaged: None,
            metrics: PerLeg::default(),
        }
    }

    /// Siembra el estado con una lectura previa al bucle, para que el primer
    /// ciclo ya tenga referencia de suma anterior para el filtro de picos.
    pub fn init(&mut self, frame: &PressureFrame, t: f64) {
        let sums = PerLeg::from_fn(|leg| cop::estimate(frame.matrix(leg)).sum);
        self.tracker.seed_raw(sums, t);
        self.averaged = Some(sums);
    }

    /// Interfaz de siembra del controlador de swing: qué pierna se espera
    /// que aterrice a continuación.
    pub fn set_candidate(&mut self, leg: Option<Leg>) {
        self.detector.set_candidate(leg);
    }

    pub fn candidate(&self) -> Option<Leg> {
        self.detector.candidate()
    }

    /// Procesa la trama de un ciclo adquirida en el instante `t` (segundos).
    pub fn process(
        &mut self,
        frame: &PressureFrame,
        t: f64,
    ) -> Result<CycleOutput, GradientError> {
        let estimates = PerLeg::from_fn(|leg| cop::estimate(frame.matrix(leg)));
        let sums = estimates.map(|e| e.sum);

        // Sumas del ciclo anterior, capturadas antes de que la cadena las
        // sobreescriba: son el valor de reemplazo del filtro de picos
        let prev_sums = self.tracker.prev_raw_sums();
        let raw_gradients = self.tracker.update_raw(sums, t)?;
        let corrected = self.spike_filter.filter(sums, raw_gradients, prev_sums);

        // Promedio exponencial sobre las sumas ya corregidas
        let averaged = match self.averaged {
            Some(prev) => PerLeg::from_fn(|leg| {
                self.smoothing_alpha * corrected[leg]
                    + (1.0 - self.smoothing_alpha) * prev[leg]
            }),
            None => corrected,
        };
        self.averaged = Some(averaged);

        let averaged_gradients = self.tracker.update_averaged(averaged, t)?;
        let event = self.detector.evaluate(averaged_gradients);

        for leg in Leg::BOTH {
            self.metrics[leg] = FootMetrics {
                sum: corrected[leg],
                cop_x: estimates[leg].cop_x,
                cop_y: estimates[leg].cop_y,
                raw_gradient: raw_gradients[leg],
                averaged_sum: averaged[leg],
                averaged_gradient: averaged_gradients[leg],
            };
        }

        Ok(CycleOutput {
            metrics: self.metrics,
            event,
        })
    }

    pub fn metrics(&self) -> PerLeg<FootMetrics> {
        self.metrics
    }
}
