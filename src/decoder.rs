use thiserror::Error;

use crate::types::{PressureMatrix, FRAME_BYTES, N_COLS, N_ROWS};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Trama incompleta: se esperaban {expected} bytes, llegaron {got}")]
    IncompleteFrame { expected: usize, got: usize },
}

/// Orden de bytes de cada par uint16 dentro de la trama.
/// El STM32 del sensor envía primero el byte bajo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    fn merge(self, pair: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(pair),
            ByteOrder::BigEndian => u16::from_be_bytes(pair),
        }
    }
}

/// Decodificador de tramas de presión plantar: 210 bytes -> matriz 15x7.
///
/// De las 105 celdas solo 99 corresponden a píxeles físicos; las demás llegan
/// siempre en cero y se conservan en su posición, nunca se compactan.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder {
    pub byte_order: ByteOrder,
}

impl FrameDecoder {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self { byte_order }
    }

    /// Decodifica la trama de un pie. Determinista y sin efectos secundarios.
    ///
    /// Cada par de bytes forma un uint16; el par `i` va a la celda
    /// (fila `i / 7`, columna `i % 7`). Un buffer menor a 210 bytes falla
    /// con `IncompleteFrame` sin leer fuera de rango ni rellenar.
    pub fn decode_foot(&self, raw: &[u8]) -> Result<PressureMatrix, DecodeError> {
        if raw.len() < FRAME_BYTES {
            return Err(DecodeError::IncompleteFrame {
                expected: FRAME_BYTES,
                got: raw.len(),
            });
        }

        let mut matrix: PressureMatrix = [[0; N_COLS]; N_ROWS];
        for pair_idx in 0..(FRAME_BYTES / 2) {
            let lo = raw[pair_idx * 2];
            let hi = raw[pair_idx * 2 + 1];
            let value = self.byte_order.merge([lo, hi]);

            let row = pair_idx / N_COLS;
            let col = pair_idx % N_COLS;
            matrix[row][col] = value;
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Codifica una matriz al formato de cable (inverso exacto del decoder)
    fn encode_foot(matrix: &PressureMatrix, order: ByteOrder) -> Vec<u8> {
        let mut raw = Vec::with_capacity(FRAME_BYTES);
        for row in matrix {
            for &value in row {
                let pair = match order {
                    ByteOrder::LittleEndian => value.to_le_bytes(),
                    ByteOrder::BigEndian => value.to_be_bytes(),
                };
                raw.extend_from_slice(&pair);
            }
        }
        raw
    }

    #[test]
    fn roundtrip_little_endian() {
        let mut matrix: PressureMatrix = [[0; N_COLS]; N_ROWS];
        // Valores que cubren el rango completo de uint16
        matrix[0][0] = 0;
        matrix[0][6] = 1;
        matrix[7][3] = 0x1234;
        matrix[14][6] = u16::MAX;

        let decoder = FrameDecoder::default();
        let raw = encode_foot(&matrix, ByteOrder::LittleEndian);
        let decoded = decoder.decode_foot(&raw).unwrap();
        assert_eq!(decoded, matrix);
    }

    #[test]
    fn roundtrip_big_endian() {
        let mut matrix: PressureMatrix = [[0; N_COLS]; N_ROWS];
        matrix[3][2] = 0xBEEF;

        let decoder = FrameDecoder::new(ByteOrder::BigEndian);
        let raw = encode_foot(&matrix, ByteOrder::BigEndian);
        assert_eq!(decoder.decode_foot(&raw).unwrap(), matrix);
    }

    #[test]
    fn pair_index_maps_row_major() {
        let mut raw = vec![0u8; FRAME_BYTES];
        // Par 8 -> fila 1, columna 1
        raw[16] = 0xCD;
        raw[17] = 0xAB;

        let decoded = FrameDecoder::default().decode_foot(&raw).unwrap();
        assert_eq!(decoded[1][1], 0xABCD);
    }

    #[test]
    fn short_buffer_is_incomplete_frame() {
        let raw = vec![0u8; FRAME_BYTES - 1];
        let err = FrameDecoder::default().decode_foot(&raw).unwrap_err();
        assert_eq!(
            err,
            DecodeError::IncompleteFrame {
                expected: FRAME_BYTES,
                got: FRAME_BYTES - 1
            }
        );
    }
}
