use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use csv::ReaderBuilder;

use crate::types::{Leg, PressureFrame, N_COLS, N_ROWS};

/// Carga una secuencia de tramas de presión desde un CSV con formato
/// `sample,leg,row,col,p`, donde `leg` es `L` o `R`. Las celdas ausentes
/// quedan en cero (el relleno estructural del sensor no se graba).
pub fn load_frames_from_csv(path: impl AsRef<Path>) -> Result<Vec<PressureFrame>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut samples: BTreeMap<usize, PressureFrame> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 5 {
            bail!("La fila {} no tiene 5 columnas", row_idx + 1);
        }

        let sample: usize = record[0]
            .parse()
            .with_context(|| format!("sample inválido en fila {}", row_idx + 1))?;
        let leg = match record[1].trim() {
            "L" | "l" => Leg::Left,
            "R" | "r" => Leg::Right,
            other => bail!("Pierna desconocida '{}' (fila {})", other, row_idx + 1),
        };
        let row: usize = record[2]
            .parse()
            .with_context(|| format!("row inválida en fila {}", row_idx + 1))?;
        let col: usize = record[3]
            .parse()
            .with_context(|| format!("col inválida en fila {}", row_idx + 1))?;
        let p: u16 = record[4]
            .parse()
            .with_context(|| format!("presión inválida en fila {}", row_idx + 1))?;

        if row >= N_ROWS || col >= N_COLS {
            bail!(
                "Celda ({}, {}) fuera de la matriz 15x7 (fila {})",
                row,
                col,
                row_idx + 1
            );
        }

        let frame = samples.entry(sample).or_insert_with(PressureFrame::zeroed);
        match leg {
            Leg::Left => frame.left[row][col] = p,
            Leg::Right => frame.right[row][col] = p,
        }
    }

    if samples.is_empty() {
        return Err(anyhow!("El CSV {:?} no contiene datos", path));
    }

    let (&min_sample, _) = samples.iter().next().unwrap();
    ensure!(
        min_sample == 0,
        "El CSV debe iniciar en sample=0 (encontrado sample={})",
        min_sample
    );
    let max_sample = *samples.keys().max().unwrap();

    let mut frames = Vec::with_capacity(max_sample + 1);
    let mut last_frame = PressureFrame::zeroed();
    for sample_idx in 0..=max_sample {
        if let Some(frame) = samples.get(&sample_idx) {
            last_frame = *frame;
            frames.push(*frame);
        } else {
            // Rellenar huecos repitiendo la última trama válida
            frames.push(last_frame);
        }
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_frames_and_fills_gaps() {
        let path = write_temp_csv(
            "podoscopio_loader_test.csv",
            "sample,leg,row,col,p\n\
             0,L,0,0,100\n\
             0,R,14,6,65535\n\
             2,L,4,2,77\n",
        );

        let frames = load_frames_from_csv(&path).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].left[0][0], 100);
        assert_eq!(frames[0].right[14][6], 65535);
        // El sample 1 repite la última trama conocida
        assert_eq!(frames[1].left[0][0], 100);
        assert_eq!(frames[2].left[4][2], 77);
        // Las celdas no grabadas quedan en cero
        assert_eq!(frames[2].right[0][0], 0);
    }

    #[test]
    fn rejects_out_of_range_cell() {
        let path = write_temp_csv(
            "podoscopio_loader_bad_cell.csv",
            "sample,leg,row,col,p\n0,L,15,0,1\n",
        );
        assert!(load_frames_from_csv(&path).is_err());
    }

    #[test]
    fn rejects_unknown_leg() {
        let path = write_temp_csv(
            "podoscopio_loader_bad_leg.csv",
            "sample,leg,row,col,p\n0,X,0,0,1\n",
        );
        assert!(load_frames_from_csv(&path).is_err());
    }
}
