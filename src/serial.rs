use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use serialport::SerialPort;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::decoder::FrameDecoder;
use crate::types::{Leg, PerLeg, PressureFrame, FRAME_BYTES};

/// Cualquier byte dispara la lectura en el STM32; se usa 0xFF.
pub const TRIGGER_BYTE: u8 = 0xFF;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("No se pudo abrir el puerto {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    #[error("Reintentos agotados leyendo el pie {leg:?} tras {attempts} intentos: {last}")]
    RetriesExhausted {
        leg: Leg,
        attempts: u32,
        last: io::Error,
    },
}

/// Fuente de bytes de un sensor plantar: un byte de disparo y una lectura
/// de exactamente N bytes que bloquea hasta completarse o fallar.
pub trait ByteSource {
    fn trigger(&mut self) -> io::Result<()>;
    fn read_exact_frame(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

impl ByteSource for Box<dyn SerialPort> {
    fn trigger(&mut self) -> io::Result<()> {
        self.write_all(&[TRIGGER_BYTE])?;
        self.flush()
    }

    fn read_exact_frame(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.read_exact(buf)
    }
}

/// Trama con la marca de tiempo de su adquisición, en segundos desde el
/// arranque del hilo lector.
#[derive(Debug, Clone, Copy)]
pub struct TimedFrame {
    pub t: f64,
    pub frame: PressureFrame,
}

/// Adquisición de tramas de ambos pies con reintentos acotados.
///
/// Un pie que no responde agota `max_retries` y devuelve un error para que
/// el llamador decida entre abortar o re-adquirir; la lectura nunca se
/// bloquea para siempre.
pub struct FootSensor<S: ByteSource> {
    ports: PerLeg<S>,
    max_retries: u32,
}

impl FootSensor<Box<dyn SerialPort>> {
    /// Abre los dos puertos serie (115200 8N1) declarados en la configuración
    pub fn open(config: &PipelineConfig) -> Result<Self, TransportError> {
        let open_port = |name: &str| -> Result<Box<dyn SerialPort>, TransportError> {
            serialport::new(name, config.baud)
                .timeout(Duration::from_millis(config.read_timeout_ms))
                .open()
                .map_err(|source| TransportError::Open {
                    port: name.to_string(),
                    source,
                })
        };

        Ok(Self {
            ports: PerLeg::new(open_port(&config.left_port)?, open_port(&config.right_port)?),
            max_retries: config.max_retries,
        })
    }
}

impl<S: ByteSource> FootSensor<S> {
    /// Construye sobre fuentes ya abiertas (tests y transportes alternativos)
    pub fn from_sources(ports: PerLeg<S>, max_retries: u32) -> Self {
        Self { ports, max_retries }
    }

    /// Lee una trama cruda de 210 bytes de cada pie, en orden izquierdo y
    /// luego derecho. Cada pie se dispara y se lee completo antes de pasar
    /// al siguiente.
    pub fn acquire(&mut self) -> Result<PerLeg<[u8; FRAME_BYTES]>, TransportError> {
        Ok(PerLeg::new(
            self.acquire_foot(Leg::Left)?,
            self.acquire_foot(Leg::Right)?,
        ))
    }

    fn acquire_foot(&mut self, leg: Leg) -> Result<[u8; FRAME_BYTES], TransportError> {
        let port = &mut self.ports[leg];
        let mut buf = [0u8; FRAME_BYTES];
        let mut last_err: Option<io::Error> = None;

        // max_retries reintentos además del intento inicial
        for _ in 0..=self.max_retries {
            let attempt = port
                .trigger()
                .and_then(|_| port.read_exact_frame(&mut buf));
            match attempt {
                Ok(()) => return Ok(buf),
                Err(err) => last_err = Some(err),
            }
        }

        Err(TransportError::RetriesExhausted {
            leg,
            attempts: self.max_retries + 1,
            last: last_err.unwrap_or_else(|| io::Error::other("sin intentos")),
        })
    }
}

/// Bucle del hilo de adquisición: lee, decodifica y publica tramas por el
/// canal hasta que `stop` se active o el transporte falle.
///
/// Devuelve `Ok(())` en una parada limpia. El orden de los eventos queda
/// garantizado por el canal; todo el estado del pipeline vive en el receptor.
pub fn acquisition_loop<S: ByteSource>(
    mut sensor: FootSensor<S>,
    decoder: FrameDecoder,
    tx: Sender<TimedFrame>,
    stop: Arc<AtomicBool>,
) -> Result<(), TransportError> {
    let session_start = Instant::now();

    loop {
        // Punto de cancelación: una vez por ciclo, antes de bloquear en E/S
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }

        let raw = sensor.acquire()?;
        let t = session_start.elapsed().as_secs_f64();

        // read_exact garantiza los 210 bytes, así que aquí la decodificación
        // no puede fallar por trama corta
        let frame = PressureFrame {
            left: decoder.decode_foot(&raw.left).expect("trama izquierda completa"),
            right: decoder.decode_foot(&raw.right).expect("trama derecha completa"),
        };

        if tx.send(TimedFrame { t, frame }).is_err() {
            // Receptor cerrado: el daemon terminó
            return Ok(());
        }
    }
}
