//! Crate `record`: modelo de datos y contratos de colaboradores
//!
//! Este crate define los tipos de dominio del formulario (`FieldValue`,
//! `RecordKey`, `Record` y los DTOs de respuesta), los contratos de los
//! colaboradores externos del navegador (`CrudClient` para el backend
//! remoto, `FieldAccessor` para los controles del formulario) y
//! implementaciones en memoria útiles para pruebas (`InMemoryCrudClient`,
//! `InMemoryFieldAccessor`).
//!
//! Diseño resumido:
//! - Identidad por clave primaria: dos registros son la misma entidad sii
//!   sus `RecordKey` coinciden.
//! - Conjuntos completos: cada escritura exitosa devuelve el conjunto
//!   autoritativo del backend; nunca se parchea en sitio.
//! - Comparación de formulario: los valores se comparan por su forma
//!   normalizada, porque los controles guardan texto y el backend tipos.
//!
//! Ejemplo rápido:
//! ```rust
//! use record::stubs::InMemoryCrudClient;
//! use record::Record;
//! let backend = InMemoryCrudClient::with_records("id", vec![Record::new().with("id", 1)]);
//! assert_eq!(backend.snapshot().len(), 1);
//! ```
pub mod domain;
pub mod errors;
pub mod repository;
pub mod stubs;

pub use domain::*;
pub use errors::*;
pub use repository::*;
pub use stubs::*;
