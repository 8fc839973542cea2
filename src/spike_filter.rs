use crate::types::{Leg, PerLeg};

/// Umbral de gradiente sobre el cual una lectura se considera pico espurio.
/// Valor de calibración empírico del sensor; se conserva tal cual.
pub const DEFAULT_SPIKE_THRESHOLD: f32 = 10_000_000.0;

/// Filtro de picos de un solo ciclo en la suma de presión.
///
/// Si el gradiente crudo de una pierna supera el umbral con el filtro
/// armado, la suma actual se descarta y se reemplaza por la suma anterior;
/// el filtro queda desarmado exactamente un ciclo. Así un gradiente alto
/// sostenido (un heel-strike real) no se recorta indefinidamente: como
/// máximo se suprime un pico en cada dos ciclos consecutivos por pierna.
#[derive(Debug, Clone, Copy)]
pub struct SpikeFilter {
    threshold: f32,
    armed: PerLeg<bool>,
}

impl SpikeFilter {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            armed: PerLeg::splat(true),
        }
    }

    /// Corrige las sumas del ciclo actual usando los gradientes crudos y
    /// las sumas del ciclo anterior. Devuelve las sumas corregidas.
    pub fn filter(
        &mut self,
        sums: PerLeg<f32>,
        raw_gradients: PerLeg<f32>,
        prev_sums: PerLeg<f32>,
    ) -> PerLeg<f32> {
        let mut corrected = sums;
        for leg in Leg::BOTH {
            if raw_gradients[leg] > self.threshold && self.armed[leg] {
                corrected[leg] = prev_sums[leg];
                self.armed[leg] = false;
            } else {
                self.armed[leg] = true;
            }
        }
        corrected
    }

    pub fn is_armed(&self, leg: Leg) -> bool {
        self.armed[leg]
    }
}

impl Default for SpikeFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SPIKE_THRESHOLD)
    }
}
