use std::ops::{Index, IndexMut};

/// Filas de la matriz de presión de cada pie
pub const N_ROWS: usize = 15;
/// Columnas de la matriz de presión de cada pie
pub const N_COLS: usize = 7;
/// Celdas totales por pie (105, de las cuales 99 son píxeles físicos)
pub const N_CELLS: usize = N_ROWS * N_COLS;
/// Píxeles físicamente válidos; las 6 celdas restantes son relleno fijo en cero
pub const VALID_CELLS: usize = 99;
/// Bytes por trama de un pie: 2 bytes por celda
pub const FRAME_BYTES: usize = N_CELLS * 2;
/// Frecuencia de muestreo nominal del sensor plantar (Hz)
pub const SAMPLING_RATE: f64 = 100.0;

/// Matriz de presión de un pie: 15x7 valores uint16 en orden row-major
pub type PressureMatrix = [[u16; N_COLS]; N_ROWS];

/// Trama completa de un ciclo de adquisición: ambos pies.
/// Es transitoria: se sobreescribe en cada ciclo.
#[derive(Debug, Clone, Copy)]
pub struct PressureFrame {
    pub left: PressureMatrix,
    pub right: PressureMatrix,
}

impl PressureFrame {
    pub fn zeroed() -> Self {
        Self {
            left: [[0; N_COLS]; N_ROWS],
            right: [[0; N_COLS]; N_ROWS],
        }
    }

    pub fn matrix(&self, leg: Leg) -> &PressureMatrix {
        match leg {
            Leg::Left => &self.left,
            Leg::Right => &self.right,
        }
    }
}

/// Identificador de pierna. Evita los arrays paralelos indexados 0/1 y sus
/// errores de aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    Left,
    Right,
}

impl Leg {
    pub const BOTH: [Leg; 2] = [Leg::Left, Leg::Right];
}

/// Par de valores, uno por pierna, indexable por `Leg`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerLeg<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerLeg<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Construye aplicando la misma función a cada pierna
    pub fn from_fn(mut f: impl FnMut(Leg) -> T) -> Self {
        Self {
            left: f(Leg::Left),
            right: f(Leg::Right),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerLeg<U> {
        PerLeg {
            left: f(&self.left),
            right: f(&self.right),
        }
    }
}

impl<T: Clone> PerLeg<T> {
    pub fn splat(value: T) -> Self {
        Self {
            left: value.clone(),
            right: value,
        }
    }
}

impl<T> Index<Leg> for PerLeg<T> {
    type Output = T;

    fn index(&self, leg: Leg) -> &T {
        match leg {
            Leg::Left => &self.left,
            Leg::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Leg> for PerLeg<T> {
    fn index_mut(&mut self, leg: Leg) -> &mut T {
        match leg {
            Leg::Left => &mut self.left,
            Leg::Right => &mut self.right,
        }
    }
}

/// Métricas por pie que persisten entre ciclos
#[derive(Debug, Clone, Copy, Default)]
pub struct FootMetrics {
    /// Suma total de presión (posiblemente corregida por el filtro de picos)
    pub sum: f32,
    /// Centro de presión en coordenadas de píxel 1-indexadas
    pub cop_x: f32,
    pub cop_y: f32,
    /// Gradiente de la suma cruda (unidades de presión / segundo)
    pub raw_gradient: f32,
    /// Suma suavizada en el tiempo (entrada del gradiente promediado)
    pub averaged_sum: f32,
    /// Gradiente de la suma suavizada
    pub averaged_gradient: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_leg_index_no_aliasing() {
        let mut armed = PerLeg::splat(true);
        armed[Leg::Left] = false;
        assert!(!armed[Leg::Left]);
        assert!(armed[Leg::Right]);
    }

    #[test]
    fn frame_matrix_selects_leg() {
        let mut frame = PressureFrame::zeroed();
        frame.right[14][6] = 42;
        assert_eq!(frame.matrix(Leg::Right)[14][6], 42);
        assert_eq!(frame.matrix(Leg::Left)[14][6], 0);
    }
}
