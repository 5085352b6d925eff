use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::util::normalize_path;

/// File name of the resource-pack descriptor.
pub const PACK_MCMETA: &str = "pack.mcmeta";

/// A resource-pack format number and the game versions it covers.
/// 資源包格式編號及其對應的遊戲版本。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackFormat {
    /// Value written to `pack.pack_format`.
    pub pack_format: u32,
    /// Human readable range of game versions using this format.
    pub versions: &'static str,
    /// Game version whose vanilla assets back this format.
    pub asset_version: &'static str,
}

/// Known formats, newest first.
pub const PACK_FORMATS: [PackFormat; 6] = [
    PackFormat {
        pack_format: 6,
        versions: "1.16.2-1.16.5",
        asset_version: "1.16.5",
    },
    PackFormat {
        pack_format: 5,
        versions: "1.15-1.16.1",
        asset_version: "1.15.2",
    },
    PackFormat {
        pack_format: 4,
        versions: "1.13-1.14.4",
        asset_version: "1.14.4",
    },
    PackFormat {
        pack_format: 3,
        versions: "1.11-1.12.2",
        asset_version: "1.12.2",
    },
    PackFormat {
        pack_format: 2,
        versions: "1.9-1.10.2",
        asset_version: "1.10.2",
    },
    PackFormat {
        pack_format: 1,
        versions: "1.6.1-1.8.9",
        asset_version: "1.8.9",
    },
];

impl PackFormat {
    /// Looks up a format by number.
    /// 依編號查詢格式。
    pub fn get(pack_format: u32) -> Option<&'static PackFormat> {
        PACK_FORMATS
            .iter()
            .find(|format| format.pack_format == pack_format)
    }

    pub fn latest() -> &'static PackFormat {
        &PACK_FORMATS[0]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PackMcmeta {
    pack: PackSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct PackSection {
    #[serde(default)]
    pack_format: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<serde_json::Value>,
}

/// Reads `pack.pack_format` from `<root>/pack.mcmeta`.
/// 讀取資源包描述檔中的格式編號。
///
/// `Ok(None)` when the descriptor is absent or carries no format.
pub fn read_pack_format(root: &Path) -> Result<Option<u32>, ProjectError> {
    let path = root.join(PACK_MCMETA);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(ProjectError::from_io(path, err)),
    };
    let meta: PackMcmeta =
        serde_json::from_str(&contents).map_err(|err| ProjectError::InvalidRecord {
            path: path.clone(),
            message: err.to_string(),
        })?;
    Ok(meta.pack.pack_format)
}

/// Creates `<location>/<name>/pack.mcmeta` for a new, empty resource pack.
/// 建立新的資源包資料夾與描述檔。
pub fn create_pack(
    location: &Path,
    name: &str,
    pack_format: u32,
    description: &str,
) -> Result<PathBuf, ProjectError> {
    validate_entry_name(name)?;
    let root = normalize_path(&location.join(name));
    fs::create_dir_all(location).map_err(|err| ProjectError::from_io(location, err))?;
    fs::create_dir(&root).map_err(|err| ProjectError::from_io(&root, err))?;

    let meta = PackMcmeta {
        pack: PackSection {
            pack_format: Some(pack_format),
            description: Some(serde_json::Value::String(description.to_string())),
        },
    };
    let payload =
        serde_json::to_vec_pretty(&meta).map_err(|err| ProjectError::InvalidRecord {
            path: root.join(PACK_MCMETA),
            message: err.to_string(),
        })?;
    let mcmeta = root.join(PACK_MCMETA);
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&mcmeta)
        .and_then(|mut file| file.write_all(&payload))
        .map_err(|err| ProjectError::from_io(&mcmeta, err))?;

    tracing::info!(root = %root.display(), pack_format, "created resource pack");
    Ok(root)
}

/// Rejects names that are empty, special, or contain a path separator.
pub(crate) fn validate_entry_name(name: &str) -> Result<(), ProjectError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        Err(ProjectError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
