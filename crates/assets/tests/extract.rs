use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use rpide_assets::{AssetsError, Progress, ProgressState, VanillaAssets};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_jar(game_dir: &Path, version: &str, entries: &[(&str, &[u8])]) {
    let dir = game_dir.join("versions").join(version);
    fs::create_dir_all(&dir).unwrap();
    let file = File::create(dir.join(format!("{version}.jar"))).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }
    zip.finish().unwrap();
}

#[test]
fn extract_keeps_assets_and_pack_files() {
    let game = tempdir().unwrap();
    let cache = tempdir().unwrap();
    write_jar(
        game.path(),
        "1.16.5",
        &[
            ("assets/", b""),
            ("assets/minecraft/textures/block/stone.png", b"png"),
            ("net/minecraft/client/Main.class", b"class"),
            ("pack.png", b"icon"),
            ("pack.mcmeta", br#"{"pack":{"pack_format":6}}"#),
        ],
    );

    let assets = VanillaAssets::new(cache.path(), "1.16.5").unwrap();
    assert!(!assets.exists_cached());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut progress = Progress::new("Extracting vanilla assets for 1.16.5", 1);
    progress.observe(move |snapshot| sink.borrow_mut().push(snapshot.value));

    assets.extract(game.path(), &mut progress).unwrap();

    assert!(assets.exists_cached());
    assert_eq!(progress.state(), ProgressState::Finished);
    assert_eq!(progress.max(), 5);
    assert_eq!(progress.fraction(), 1.0);
    assert_eq!(*seen.borrow(), vec![0, 1, 2, 3, 4, 5, 5]);

    let stone = assets
        .absolute_path("assets/minecraft/textures/block/stone.png")
        .unwrap();
    assert_eq!(fs::read(stone).unwrap(), b"png");
    let version_dir = cache.path().join("1.16.5");
    assert!(version_dir.join("pack.png").is_file());
    assert!(version_dir.join("pack.mcmeta").is_file());
    assert!(!version_dir.join("jar.jar").exists());
    assert!(!version_dir.join("extracted-jar").exists());
    assert!(!version_dir.join("net").exists());
}

#[test]
fn pack_mcmeta_is_optional() {
    let game = tempdir().unwrap();
    let cache = tempdir().unwrap();
    write_jar(
        game.path(),
        "1.8.9",
        &[("assets/minecraft/lang/en_US.lang", b"x"), ("pack.png", b"icon")],
    );

    let assets = VanillaAssets::new(cache.path(), "1.8.9").unwrap();
    let mut progress = Progress::new("extract", 1);
    assets.extract(game.path(), &mut progress).unwrap();

    assert!(!cache.path().join("1.8.9/pack.mcmeta").exists());
    assert!(cache.path().join("1.8.9/assets/minecraft/lang/en_US.lang").is_file());
}

#[test]
fn missing_jar_fails_progress_and_leaves_no_cache() {
    let game = tempdir().unwrap();
    let cache = tempdir().unwrap();
    let assets = VanillaAssets::new(cache.path(), "1.14.4").unwrap();
    let mut progress = Progress::new("extract", 1);

    let err = assets.extract(game.path(), &mut progress).unwrap_err();

    assert!(matches!(err, AssetsError::JarMissing { .. }));
    assert_eq!(progress.state(), ProgressState::Failed);
    assert!(!assets.exists_cached());
}

#[test]
fn jar_without_pack_png_is_rejected() {
    let game = tempdir().unwrap();
    let cache = tempdir().unwrap();
    write_jar(game.path(), "1.12.2", &[("assets/minecraft/x.json", b"{}")]);

    let assets = VanillaAssets::new(cache.path(), "1.12.2").unwrap();
    let mut progress = Progress::new("extract", 1);
    let err = assets.extract(game.path(), &mut progress).unwrap_err();

    assert!(matches!(err, AssetsError::MissingEntry("pack.png")));
    assert_eq!(progress.state(), ProgressState::Failed);
    let version_dir = cache.path().join("1.12.2");
    assert!(!version_dir.join("jar.jar").exists());
    assert!(!version_dir.join("extracted-jar").exists());
    assert!(!assets.exists_cached());
}

#[test]
fn escaping_versions_never_reach_the_filesystem() {
    let root = tempdir().unwrap();
    let cache = root.path().join("VanillaAssets");
    let victim = root.path().join("victim");
    fs::create_dir_all(&cache).unwrap();
    fs::create_dir_all(&victim).unwrap();
    fs::write(victim.join("keep.txt"), b"mine").unwrap();

    for version in ["..", "../victim", "/abs"] {
        let err = VanillaAssets::new(&cache, version).unwrap_err();
        assert!(matches!(err, AssetsError::InvalidVersion(ref v) if v == version));
    }
    assert_eq!(fs::read(victim.join("keep.txt")).unwrap(), b"mine");
}
