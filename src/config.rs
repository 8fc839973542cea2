use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::heel_strike::{DEFAULT_LEFT_THRESHOLD, DEFAULT_RIGHT_THRESHOLD};
use crate::spike_filter::DEFAULT_SPIKE_THRESHOLD;

/// Configuración del daemon. Los umbrales son valores de calibración del
/// sensor y se conservan tal cual como defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Umbral de gradiente promediado para heel-strike izquierdo (default: 20000)
    pub left_threshold: f32,
    /// Umbral de gradiente promediado para heel-strike derecho (default: 30000)
    pub right_threshold: f32,
    /// Umbral de gradiente crudo del filtro de picos (default: 10000000)
    pub spike_threshold: f32,
    /// Factor del promedio exponencial de las sumas de presión (default: 0.1)
    pub smoothing_alpha: f32,
    /// Puerto serie del sensor izquierdo (default: /dev/ttyS0)
    pub left_port: String,
    /// Puerto serie del sensor derecho (default: /dev/ttyS1)
    pub right_port: String,
    /// Velocidad del puerto serie (default: 115200)
    pub baud: u32,
    /// Reintentos máximos por pie y por ciclo antes de fallar (default: 3)
    pub max_retries: u32,
    /// Timeout de lectura del puerto en milisegundos (default: 200)
    pub read_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            left_threshold: DEFAULT_LEFT_THRESHOLD,
            right_threshold: DEFAULT_RIGHT_THRESHOLD,
            spike_threshold: DEFAULT_SPIKE_THRESHOLD,
            smoothing_alpha: 0.1,
            left_port: "/dev/ttyS0".to_string(),
            right_port: "/dev/ttyS1".to_string(),
            baud: 115_200,
            max_retries: 3,
            read_timeout_ms: 200,
        }
    }
}

impl PipelineConfig {
    /// Carga la configuración desde un JSON; los campos ausentes toman los
    /// defaults del dispositivo.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("No se pudo leer la configuración {:?}", path))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Configuración inválida en {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_device_calibration() {
        let config = PipelineConfig::default();
        assert_eq!(config.left_threshold, 20_000.0);
        assert_eq!(config.right_threshold, 30_000.0);
        assert_eq!(config.spike_threshold, 10_000_000.0);
        assert_eq!(config.baud, 115_200);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"left_port": "/dev/ttyUSB3", "max_retries": 5}"#).unwrap();
        assert_eq!(config.left_port, "/dev/ttyUSB3");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.right_threshold, 30_000.0);
        assert_eq!(config.smoothing_alpha, 0.1);
    }
}
