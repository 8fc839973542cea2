/*
Podoscopio - pipeline de detección de fase de marcha

Decodifica tramas de presión plantar de un exoesqueleto (matrices 15x7 por
pie), estima el centro de presión, rastrea gradientes, suprime picos de
sensor y detecta heel-strikes con una máquina de estados de confirmación en
dos etapas.
*/

pub mod config;
pub mod cop;
pub mod csv_loader;
pub mod decoder;
pub mod gradient;
pub mod heel_strike;
pub mod pipeline;
pub mod serial;
pub mod spike_filter;
pub mod types;
