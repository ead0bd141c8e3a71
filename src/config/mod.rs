//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de entorno: servidor remoto,
//! sesión y almacenamiento local.

pub mod environment;

pub use environment::*;
