/*
Detección de Heel-Strike en Tiempo Real - Rust Puro

Daemon que:
1. Lee matrices de presión plantar 15x7 desde dos puertos serie (STM32)
2. Calcula suma de presión y centro de presión por pie
3. Filtra picos espurios y rastrea gradientes crudo/promediado
4. Detecta heel-strikes con confirmación en dos etapas

Para compilar y ejecutar:
    ./target/release/podoscopio [config.json]

Teclas (captura global, requiere permisos sobre /dev/input):
  l → sembrar pierna candidata izquierda
  r → sembrar pierna candidata derecha
  n → limpiar la candidata
  q → salir
*/

use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::{bounded, select, unbounded, Sender};

use podoscopio::config::PipelineConfig;
use podoscopio::decoder::FrameDecoder;
use podoscopio::heel_strike::GaitEvent;
use podoscopio::pipeline::Pipeline;
use podoscopio::serial::{acquisition_loop, FootSensor, TimedFrame};
use podoscopio::types::Leg;

/// Comandos del teclado hacia el bucle principal
#[derive(Debug, Clone, Copy)]
enum KeyCommand {
    Seed(Leg),
    ClearCandidate,
    Quit,
}

fn main() -> Result<()> {
    println!("🦶 Podoscopio - Detección de Heel-Strike\n");

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => {
            println!("🔧 Configuración desde {}", path);
            PipelineConfig::from_file(path)?
        }
        None => {
            println!("🔧 Configuración por defecto");
            PipelineConfig::default()
        }
    };
    println!(
        "📡 Puertos: izq={} der={} @ {} baudios\n",
        config.left_port, config.right_port, config.baud
    );

    // Abrir los dos sensores antes de lanzar nada
    let sensor = FootSensor::open(&config)?;
    println!("✅ Puertos serie abiertos");

    let stop = Arc::new(AtomicBool::new(false));

    // Canal de tramas desde el hilo de adquisición
    let (tx_frames, rx_frames) = bounded::<TimedFrame>(100);
    let stop_acq = Arc::clone(&stop);
    let acq_handle = std::thread::spawn(move || {
        if let Err(e) = acquisition_loop(sensor, FrameDecoder::default(), tx_frames, stop_acq) {
            eprintln!("❌ Error de adquisición: {}", e);
        }
    });

    // Hilo de teclado para sembrar la candidata y salir
    let (tx_keys, rx_keys) = unbounded::<KeyCommand>();
    std::thread::spawn(move || {
        if let Err(e) = keyboard_loop(tx_keys) {
            eprintln!("⚠️  Teclado no disponible: {}", e);
        }
    });

    let mut pipeline = Pipeline::new(&config);
    let mut initialized = false;
    let mut cycles = 0u64;

    println!("🎬 Procesando tramas (l/r siembran candidata, q sale)...\n");

    loop {
        select! {
            recv(rx_frames) -> msg => {
                let timed = match msg {
                    Ok(timed) => timed,
                    Err(_) => {
                        eprintln!("\n❌ El hilo de adquisición terminó");
                        break;
                    }
                };

                // La primera trama solo siembra las cadenas de gradiente
                if !initialized {
                    pipeline.init(&timed.frame, timed.t);
                    initialized = true;
                    continue;
                }

                let out = pipeline.process(&timed.frame, timed.t)?;
                cycles += 1;

                if let GaitEvent::Confirmed(leg) = out.event {
                    println!("\n🎯 Heel-strike confirmado: {:?} (t = {:.3} s)", leg, timed.t);
                }

                print!(
                    "\r[CICLO {}] P_izq={:>9.0} COP=({:>4.1},{:>3.1})  P_der={:>9.0} COP=({:>4.1},{:>3.1})  candidata={:?}   ",
                    cycles,
                    out.metrics.left.sum,
                    out.metrics.left.cop_x,
                    out.metrics.left.cop_y,
                    out.metrics.right.sum,
                    out.metrics.right.cop_x,
                    out.metrics.right.cop_y,
                    pipeline.candidate(),
                );
                let _ = std::io::stdout().flush();
            }
            recv(rx_keys) -> key => {
                if let Ok(cmd) = key {
                    match cmd {
                        KeyCommand::Seed(leg) => {
                            println!("\n🌱 Candidata sembrada: {:?}", leg);
                            pipeline.set_candidate(Some(leg));
                        }
                        KeyCommand::ClearCandidate => {
                            println!("\n🧹 Candidata limpiada");
                            pipeline.set_candidate(None);
                        }
                        KeyCommand::Quit => {
                            println!("\n👋 Saliendo...");
                            break;
                        }
                    }
                }
            }
        }
    }

    // Parada limpia: el hilo de adquisición revisa la bandera una vez por ciclo
    stop.store(true, Ordering::Relaxed);
    drop(rx_frames);
    let _ = acq_handle.join();

    println!("✅ {} ciclos procesados", cycles);
    Ok(())
}

/// Busca un teclado en /dev/input y traduce las teclas a comandos
fn keyboard_loop(tx: Sender<KeyCommand>) -> Result<()> {
    use evdev::{Device, InputEventKind, Key};
    use std::fs;

    let mut keyboard_device: Option<Device> = None;

    for entry in fs::read_dir("/dev/input")? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name() else { continue };
        if !name.to_string_lossy().starts_with("event") {
            continue;
        }
        if let Ok(device) = Device::open(&path) {
            if let Some(dev_name) = device.name() {
                let dev_name_lc = dev_name.to_lowercase();
                if dev_name_lc.contains("keyboard") || dev_name_lc.contains("at translated") {
                    println!("✅ Teclado encontrado: {} ({})", dev_name, path.display());
                    keyboard_device = Some(device);
                    break;
                }
            }
        }
    }

    let mut device = keyboard_device.ok_or_else(|| {
        anyhow::anyhow!("No se encontró ningún dispositivo de teclado en /dev/input")
    })?;

    loop {
        for ev in device.fetch_events()? {
            if let InputEventKind::Key(key) = ev.kind() {
                if ev.value() != 1 {
                    continue;
                }
                let cmd = match key {
                    Key::KEY_L => Some(KeyCommand::Seed(Leg::Left)),
                    Key::KEY_R => Some(KeyCommand::Seed(Leg::Right)),
                    Key::KEY_N => Some(KeyCommand::ClearCandidate),
                    Key::KEY_Q | Key::KEY_ESC => Some(KeyCommand::Quit),
                    _ => None,
                };
                if let Some(cmd) = cmd {
                    if tx.send(cmd).is_err() {
                        return Ok(());
                    }
                }
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
