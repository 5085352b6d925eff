use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn cli(data_dir: &Path, game_dir: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("rpide-cli")?;
    cmd.arg("--data-dir")
        .arg(data_dir)
        .arg("--game-dir")
        .arg(game_dir);
    Ok(cmd)
}

fn write_jar(game_dir: &Path, version: &str) -> Result<(), Box<dyn Error>> {
    let dir = game_dir.join("versions").join(version);
    fs::create_dir_all(&dir)?;
    let mut zip = ZipWriter::new(File::create(dir.join(format!("{version}.jar")))?);
    let options = SimpleFileOptions::default();
    for (name, data) in [
        ("assets/minecraft/textures/block/stone.png", &b"png"[..]),
        ("net/minecraft/Main.class", b"class"),
        ("pack.png", b"icon"),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }
    zip.finish()?;
    Ok(())
}

#[test]
fn extract_populates_cache_once() -> Result<(), Box<dyn Error>> {
    let data = tempdir()?;
    let game = tempdir()?;
    write_jar(game.path(), "1.16.5")?;

    cli(data.path(), game.path())?
        .args(["assets", "extract", "1.16.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 1.16.5"))
        .stderr(predicate::str::contains("100%"));

    let stone = data
        .path()
        .join("VanillaAssets/1.16.5/assets/minecraft/textures/block/stone.png");
    assert_eq!(fs::read(&stone)?, b"png");

    cli(data.path(), game.path())?
        .args(["assets", "extract", "1.16.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already cached"));
    Ok(())
}

#[test]
fn extract_without_jar_fails() -> Result<(), Box<dyn Error>> {
    let data = tempdir()?;
    let game = tempdir()?;

    cli(data.path(), game.path())?
        .args(["assets", "extract", "1.12.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("game jar for 1.12.2 does not exist"));
    assert!(!data.path().join("VanillaAssets/1.12.2").exists());
    Ok(())
}

#[test]
fn extract_rejects_versions_outside_the_cache() -> Result<(), Box<dyn Error>> {
    let data = tempdir()?;
    let game = tempdir()?;
    let victim = data.path().join("victim");
    fs::create_dir_all(&victim)?;
    fs::write(victim.join("keep.txt"), b"mine")?;

    cli(data.path(), game.path())?
        .args(["assets", "extract", "../victim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid game version"));
    assert_eq!(fs::read(victim.join("keep.txt"))?, b"mine");
    Ok(())
}

#[test]
fn path_resolves_inside_cache_and_rejects_parent_segments() -> Result<(), Box<dyn Error>> {
    let data = tempdir()?;
    let game = tempdir()?;
    let expected = data.path().join("VanillaAssets/1.8.9/pack.png");

    cli(data.path(), game.path())?
        .args(["assets", "path", "1.8.9", "pack.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));

    cli(data.path(), game.path())?
        .args(["assets", "path", "1.8.9", "../secrets"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn preferred_game_dir_is_used_without_flag() -> Result<(), Box<dyn Error>> {
    let data = tempdir()?;
    let game = tempdir()?;
    write_jar(game.path(), "1.15.2")?;

    Command::cargo_bin("rpide-cli")?
        .arg("--data-dir")
        .arg(data.path())
        .args(["preferences", "set", "--default-game-dir"])
        .arg(game.path())
        .assert()
        .success();

    Command::cargo_bin("rpide-cli")?
        .arg("--data-dir")
        .arg(data.path())
        .args(["assets", "extract", "1.15.2"])
        .assert()
        .success();
    assert!(data.path().join("VanillaAssets/1.15.2/pack.png").is_file());
    Ok(())
}
