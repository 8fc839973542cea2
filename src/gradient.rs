use thiserror::Error;

use crate::types::PerLeg;

#[derive(Error, Debug, PartialEq)]
pub enum GradientError {
    #[error("Intervalo de tiempo no positivo entre lecturas: dt = {dt} s")]
    NonPositiveInterval { dt: f64 },
}

/// Cadena de diferencias finitas: valor anterior por pierna + marca de
/// tiempo anterior, compartida entre ambas piernas.
#[derive(Debug, Clone, Copy, Default)]
struct Chain {
    prev_t: Option<f64>,
    prev_sums: PerLeg<f32>,
}

impl Chain {
    /// Fija el estado anterior sin calcular gradiente
    fn seed(&mut self, sums: PerLeg<f32>, t: f64) {
        self.prev_sums = sums;
        self.prev_t = Some(t);
    }

    /// Calcula (actual - anterior) / dt por pierna y guarda el valor actual
    /// como anterior, incondicionalmente. La primera llamada siembra la
    /// cadena y devuelve gradiente cero.
    fn update(&mut self, sums: PerLeg<f32>, t: f64) -> Result<PerLeg<f32>, GradientError> {
        let grads = match self.prev_t {
            Some(prev_t) => {
                let dt = t - prev_t;
                if dt <= 0.0 {
                    return Err(GradientError::NonPositiveInterval { dt });
                }
                PerLeg::new(
                    (sums.left - self.prev_sums.left) / dt as f32,
                    (sums.right - self.prev_sums.right) / dt as f32,
                )
            }
            None => PerLeg::splat(0.0),
        };

        self.seed(sums, t);
        Ok(grads)
    }
}

/// Rastreador de gradientes de presión.
///
/// Mantiene dos cadenas independientes de marca de tiempo / valor anterior:
/// una para las sumas crudas y otra para las sumas ya suavizadas. Las marcas
/// de tiempo las inyecta quien llama (segundos desde el inicio de sesión),
/// lo que permite tests deterministas sin reloj de pared.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientTracker {
    raw: Chain,
    averaged: Chain,
}

impl GradientTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Siembra la cadena cruda con la primera lectura, antes del bucle de
    /// adquisición (equivale a la inicialización del filtro de picos).
    pub fn seed_raw(&mut self, sums: PerLeg<f32>, t: f64) {
        self.raw.seed(sums, t);
    }

    /// Sumas anteriores de la cadena cruda (lo que el filtro de picos usa
    /// como valor de reemplazo)
    pub fn prev_raw_sums(&self) -> PerLeg<f32> {
        self.raw.prev_sums
    }

    /// Gradiente de las sumas crudas en el instante `t`
    pub fn update_raw(&mut self, sums: PerLeg<f32>, t: f64) -> Result<PerLeg<f32>, GradientError> {
        self.raw.update(sums, t)
    }

    /// Gradiente de las sumas suavizadas en el instante `t`
    pub fn update_averaged(
        &mut self,
        sums: PerLeg<f32>,
        t: f64,
    ) -> Result<PerLeg<f32>, GradientError> {
        self.averaged.update(sums, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_is_delta_over_dt() {
        let mut tracker = GradientTracker::new();
        let first = tracker
            .update_raw(PerLeg::splat(10.0), 0.0)
            .unwrap();
        assert_eq!(first, PerLeg::splat(0.0));

        // 10 y luego 20 con un segundo de separación -> gradiente 10.0
        let grads = tracker.update_raw(PerLeg::splat(20.0), 1.0).unwrap();
        assert_eq!(grads.left, 10.0);
        assert_eq!(grads.right, 10.0);
    }

    #[test]
    fn chains_are_independent() {
        let mut tracker = GradientTracker::new();
        tracker.seed_raw(PerLeg::splat(0.0), 0.0);

        // La cadena suavizada no hereda la siembra de la cruda
        let avg = tracker.update_averaged(PerLeg::splat(50.0), 0.5).unwrap();
        assert_eq!(avg, PerLeg::splat(0.0));

        let raw = tracker.update_raw(PerLeg::splat(100.0), 2.0).unwrap();
        assert_eq!(raw.left, 50.0);

        let avg2 = tracker.update_averaged(PerLeg::splat(150.0), 1.0).unwrap();
        assert_eq!(avg2.left, 200.0);
    }

    #[test]
    fn non_positive_dt_is_fatal() {
        let mut tracker = GradientTracker::new();
        tracker.seed_raw(PerLeg::splat(10.0), 1.0);

        let same = tracker.update_raw(PerLeg::splat(20.0), 1.0).unwrap_err();
        assert_eq!(same, GradientError::NonPositiveInterval { dt: 0.0 });

        let backwards = tracker.update_raw(PerLeg::splat(20.0), 0.5).unwrap_err();
        assert_eq!(backwards, GradientError::NonPositiveInterval { dt: -0.5 });
    }

    #[test]
    fn prev_sums_update_unconditionally() {
        let mut tracker = GradientTracker::new();
        tracker.seed_raw(PerLeg::new(10.0, 30.0), 0.0);
        tracker.update_raw(PerLeg::new(20.0, 40.0), 1.0).unwrap();
        assert_eq!(tracker.prev_raw_sums(), PerLeg::new(20.0, 40.0));
    }
}
