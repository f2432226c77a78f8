pub mod archivos;
pub mod catalogos;
pub mod citas;
pub mod deportistas;
pub mod descarga_segura;
pub mod documentos;
pub mod historias;
