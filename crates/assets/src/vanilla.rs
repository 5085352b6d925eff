use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;

use crate::progress::Progress;

const JAR_COPY: &str = "jar.jar";
const EXTRACT_DIR: &str = "extracted-jar";

/// 原版資源擷取錯誤。 / Errors raised while locating or extracting vanilla assets.
#[derive(Debug, Error)]
pub enum AssetsError {
    #[error("resource {0:?} may not contain '..'")]
    InvalidResource(String),
    #[error("invalid game version {0:?}; expected a single folder name such as 1.16.5")]
    InvalidVersion(String),
    #[error("the game jar for {version} does not exist at {path}; run the version once in the launcher")]
    JarMissing { version: String, path: PathBuf },
    #[error("the game jar has no {0}")]
    MissingEntry(&'static str),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl AssetsError {
    fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| AssetsError::Io { path, source }
    }
}

/// 指定遊戲版本的原版資源快取。 / Cached vanilla assets of one game version.
#[derive(Debug, Clone)]
pub struct VanillaAssets {
    cache_dir: PathBuf,
    version: String,
}

impl VanillaAssets {
    /// `cache_dir` holds one folder per version, so `version` must be a single
    /// plain path segment.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        version: impl Into<String>,
    ) -> Result<Self, AssetsError> {
        let version = version.into();
        let mut components = Path::new(&version).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !version.ends_with(['/', '\\']) => {}
            _ => return Err(AssetsError::InvalidVersion(version)),
        }
        Ok(Self {
            cache_dir: cache_dir.into(),
            version,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn version_dir(&self) -> PathBuf {
        self.cache_dir.join(&self.version)
    }

    /// 取得資源在快取中的絕對路徑。 / Path of `resource` inside the cached assets,
    /// e.g. `assets/minecraft/textures/block/stone.png`.
    pub fn absolute_path(&self, resource: &str) -> Result<PathBuf, AssetsError> {
        if resource.contains("..") {
            return Err(AssetsError::InvalidResource(resource.to_string()));
        }
        let relative = Path::new(resource);
        let mut path = self.version_dir();
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                path.push(segment);
            }
        }
        Ok(path)
    }

    /// 是否已擷取並快取。 / Whether the version folder already exists.
    pub fn exists_cached(&self) -> bool {
        self.version_dir().is_dir()
    }

    /// `<game_dir>/versions/<v>/<v>.jar`
    pub fn jar_path(&self, game_dir: &Path) -> PathBuf {
        game_dir
            .join("versions")
            .join(&self.version)
            .join(format!("{}.jar", self.version))
    }

    /// 從遊戲安裝目錄擷取資源。 / Copies the game jar, unpacks it and keeps the
    /// resource-pack relevant parts.
    ///
    /// `progress` advances once per archive entry and is marked failed on error.
    pub fn extract(&self, game_dir: &Path, progress: &mut Progress) -> Result<(), AssetsError> {
        let result = self.extract_inner(game_dir, progress);
        match &result {
            Ok(()) => {
                progress.finish();
                tracing::info!(version = %self.version, "vanilla assets extracted");
            }
            Err(err) => {
                progress.fail();
                tracing::error!(version = %self.version, error = %err, "vanilla asset extraction failed");
                self.remove_temporaries();
            }
        }
        result
    }

    fn extract_inner(&self, game_dir: &Path, progress: &mut Progress) -> Result<(), AssetsError> {
        let version_dir = self.version_dir();
        fs::create_dir_all(&version_dir).map_err(AssetsError::io(&version_dir))?;

        let jar = self.jar_path(game_dir);
        if !jar.is_file() {
            return Err(AssetsError::JarMissing {
                version: self.version.clone(),
                path: jar,
            });
        }

        let copy = version_dir.join(JAR_COPY);
        tracing::debug!(from = %jar.display(), to = %copy.display(), "copying game jar");
        fs::copy(&jar, &copy).map_err(AssetsError::io(&copy))?;

        let extract_dir = version_dir.join(EXTRACT_DIR);
        unpack(&copy, &extract_dir, progress)?;

        const REQUIRED: [&str; 2] = ["assets", "pack.png"];
        if let Some(missing) = REQUIRED.iter().find(|name| !extract_dir.join(name).exists()) {
            return Err(AssetsError::MissingEntry(*missing));
        }
        for name in REQUIRED {
            move_into(&extract_dir, &version_dir, name)?;
        }
        if !move_into(&extract_dir, &version_dir, "pack.mcmeta")? {
            tracing::debug!(version = %self.version, "game jar has no pack.mcmeta");
        }

        fs::remove_file(&copy).map_err(AssetsError::io(&copy))?;
        fs::remove_dir_all(&extract_dir).map_err(AssetsError::io(&extract_dir))?;
        Ok(())
    }

    fn remove_temporaries(&self) {
        let version_dir = self.version_dir();
        let removals = [
            fs::remove_file(version_dir.join(JAR_COPY)),
            fs::remove_dir_all(version_dir.join(EXTRACT_DIR)),
        ];
        for err in removals.into_iter().filter_map(Result::err) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(dir = %version_dir.display(), error = %err, "cannot remove temporary files");
            }
        }
        // Drops the version folder only when the failed run left it empty.
        let _ = fs::remove_dir(&version_dir);
    }
}

/// Unpacks every entry of `archive` below `dest`, skipping entries whose
/// names would escape it.
fn unpack(archive: &Path, dest: &Path, progress: &mut Progress) -> Result<(), AssetsError> {
    let file = File::open(archive).map_err(AssetsError::io(archive))?;
    let mut zip = ZipArchive::new(file).map_err(|source| AssetsError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;
    progress.set_max(zip.len() as u64);
    tracing::debug!(entries = zip.len(), "unpacking game jar");

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| AssetsError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;
        let Some(name) = entry.enclosed_name() else {
            tracing::warn!(entry = entry.name(), "skipping archive entry outside the target");
            progress.increment();
            continue;
        };
        let out = dest.join(name);
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(AssetsError::io(&out))?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(AssetsError::io(parent))?;
            }
            let mut target = File::create(&out).map_err(AssetsError::io(&out))?;
            io::copy(&mut entry, &mut target).map_err(AssetsError::io(&out))?;
        }
        progress.increment();
    }
    Ok(())
}

/// Moves `<from>/<name>` to `<to>/<name>`, replacing an older copy.
/// Returns `false` when the source does not exist.
fn move_into(from: &Path, to: &Path, name: &str) -> Result<bool, AssetsError> {
    let source = from.join(name);
    if !source.exists() {
        return Ok(false);
    }
    let target = to.join(name);
    if target.is_dir() {
        fs::remove_dir_all(&target).map_err(AssetsError::io(&target))?;
    } else if target.exists() {
        fs::remove_file(&target).map_err(AssetsError::io(&target))?;
    }
    fs::rename(&source, &target).map_err(AssetsError::io(&target))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_stays_inside_version_dir() {
        let assets = VanillaAssets::new("/data/VanillaAssets", "1.16.5").unwrap();
        assert_eq!(
            assets
                .absolute_path("assets/minecraft/textures/block/stone.png")
                .unwrap(),
            PathBuf::from("/data/VanillaAssets/1.16.5/assets/minecraft/textures/block/stone.png")
        );
        assert_eq!(
            assets.absolute_path("/pack.png").unwrap(),
            PathBuf::from("/data/VanillaAssets/1.16.5/pack.png")
        );
    }

    #[test]
    fn absolute_path_rejects_parent_segments() {
        let assets = VanillaAssets::new("/data/VanillaAssets", "1.16.5").unwrap();
        for resource in ["../x", "assets/../../secret", "a..b"] {
            assert!(matches!(
                assets.absolute_path(resource),
                Err(AssetsError::InvalidResource(_))
            ));
        }
    }

    #[test]
    fn jar_path_follows_launcher_layout() {
        let assets = VanillaAssets::new("/cache", "1.12.2").unwrap();
        assert_eq!(
            assets.jar_path(Path::new("/home/u/.minecraft")),
            PathBuf::from("/home/u/.minecraft/versions/1.12.2/1.12.2.jar")
        );
    }

    #[test]
    fn version_must_be_one_plain_segment() {
        for version in ["..", "../x", "/abs", ".", "", "1.16/5", "1.16.5/"] {
            assert!(
                matches!(
                    VanillaAssets::new("/cache", version),
                    Err(AssetsError::InvalidVersion(_))
                ),
                "{version:?} was accepted"
            );
        }
        assert!(VanillaAssets::new("/cache", "1.20.1-forge").is_ok());
    }
}
