use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use podoscopio::config::PipelineConfig;
use podoscopio::csv_loader::load_frames_from_csv;
use podoscopio::heel_strike::GaitEvent;
use podoscopio::pipeline::Pipeline;
use podoscopio::types::{Leg, SAMPLING_RATE};

struct ReplayOptions {
    candidate: Leg,
    rate_hz: f64,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut candidate = Leg::Right;
    let mut rate_hz = SAMPLING_RATE;
    let mut csv_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--candidate" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--candidate requiere l|r"))?;
                candidate = match value.as_str() {
                    "l" | "left" => Leg::Left,
                    "r" | "right" => Leg::Right,
                    other => bail!("Candidata desconocida: {}", other),
                };
            }
            "--rate" => {
                let value = args.next().ok_or_else(|| anyhow!("--rate requiere Hz"))?;
                rate_hz = value.parse()?;
                if rate_hz <= 0.0 {
                    bail!("La frecuencia debe ser positiva");
                }
            }
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: replay_csv [--candidate l|r] [--rate Hz] <archivo.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((csv_path, ReplayOptions { candidate, rate_hz }))
}

fn main() -> Result<()> {
    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo sesión desde {:?}", csv_path);
    println!(
        "🌱 Candidata: {:?} (re-sembrada tras cada confirmación) @ {} Hz\n",
        opts.candidate, opts.rate_hz
    );

    let frames = load_frames_from_csv(&csv_path)?;
    if frames.len() < 2 {
        bail!("La sesión necesita al menos 2 tramas");
    }

    let mut pipeline = Pipeline::new(&PipelineConfig::default());
    pipeline.init(&frames[0], 0.0);
    pipeline.set_candidate(Some(opts.candidate));

    let mut confirmations = 0u32;
    for (idx, frame) in frames.iter().enumerate().skip(1) {
        let t = idx as f64 / opts.rate_hz;
        let out = pipeline.process(frame, t)?;

        if let GaitEvent::Confirmed(leg) = out.event {
            confirmations += 1;
            println!(
                "🎯 ciclo {:>5} (t={:>7.3} s): heel-strike {:?}  P_izq={:.0} P_der={:.0}",
                idx, t, leg, out.metrics.left.sum, out.metrics.right.sum
            );
            // Simular al controlador de swing: volver a sembrar
            pipeline.set_candidate(Some(opts.candidate));
        }
    }

    println!(
        "\n✅ {} ciclos, {} heel-strikes confirmados",
        frames.len() - 1,
        confirmations
    );
    Ok(())
}
