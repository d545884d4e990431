use crate::series::error::ExportError;
use log::info;
use std::io;
use std::path::Path;

pub async fn ensure_output_dir_exists(path: &Path) -> Result<(), ExportError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(ExportError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| ExportError::OutputDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(ExportError::OutputDirCreation(path.to_path_buf(), e)),
    }
}
