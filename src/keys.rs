use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::{BastionError, Result};

fn ssh_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".ssh"))
        .unwrap_or_else(|| PathBuf::from("~/.ssh"))
}

/// `~/.ssh/id_rsa`
pub fn default_private_key_path() -> PathBuf {
    ssh_dir().join("id_rsa")
}

/// `~/.ssh/id_rsa.pub`
pub fn default_public_key_path() -> PathBuf {
    ssh_dir().join("id_rsa.pub")
}

/// Read public key material to hand to the bastion service.
pub fn read_public_key(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| BastionError::KeyFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let content = content.trim();

    if content.is_empty() {
        return Err(BastionError::KeyFile {
            path: path.to_path_buf(),
            message: "file is empty".to_string(),
        });
    }
    if content.contains("PRIVATE KEY") {
        return Err(BastionError::KeyFile {
            path: path.to_path_buf(),
            message: "this is a private key; pass the .pub file".to_string(),
        });
    }

    Ok(content.to_string())
}

/// The private key is only embedded in the printed command, but a missing
/// one is worth a warning before the operator copies it.
pub fn private_key_exists(path: &Path) -> bool {
    path.is_file()
}
