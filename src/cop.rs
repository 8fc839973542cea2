use crate::types::PressureMatrix;

/// Resultado del estimador de centro de presión de un pie
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopEstimate {
    /// Suma total de presión de la matriz
    pub sum: f32,
    /// Centroide ponderado, en espacio de píxel 1-indexado (filas 1..=15)
    pub cop_x: f32,
    /// Centroide ponderado, en espacio de píxel 1-indexado (columnas 1..=7)
    pub cop_y: f32,
}

/// Calcula la suma total y el centro de presión de la matriz de un pie.
///
/// Los pesos son 1-indexados: la fila r aporta (r+1) y la columna c aporta
/// (c+1). Con suma total cero el COP se define como (0, 0); no es un error,
/// evita la división por cero cuando el pie está en el aire.
pub fn estimate(matrix: &PressureMatrix) -> CopEstimate {
    let mut sum = 0.0f32;
    let mut weighted_rows = 0.0f32;
    let mut weighted_cols = 0.0f32;

    for (r, row) in matrix.iter().enumerate() {
        for (c, &cell) in row.iter().enumerate() {
            let p = cell as f32;
            sum += p;
            weighted_rows += (r as f32 + 1.0) * p;
            weighted_cols += (c as f32 + 1.0) * p;
        }
    }

    if sum == 0.0 {
        return CopEstimate {
            sum: 0.0,
            cop_x: 0.0,
            cop_y: 0.0,
        };
    }

    CopEstimate {
        sum,
        cop_x: weighted_rows / sum,
        cop_y: weighted_cols / sum,
    }
}
