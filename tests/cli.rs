use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn screenmark_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("screenmark").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("WAYLAND_DISPLAY");
    cmd
}

#[test]
fn screenmark_help_prints_usage() {
    let temp = TempDir::new().unwrap();
    screenmark_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Show transient overlays marking screen regions",
        ))
        .stdout(predicate::str::contains("label-in:X,Y,W,H:TEXT"));
}

#[test]
fn long_version_includes_build_hash() {
    let temp = TempDir::new().unwrap();
    screenmark_cmd(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains(" ("));
}

#[test]
fn output_writes_png_of_screen_size() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("overlay.png");

    screenmark_cmd(&temp)
        .args([
            "--screen-size",
            "320x240",
            "--shape",
            "box:10,10,50,40",
            "--shape",
            "circle:100,100",
            "--shape",
            "label:200,50:hello",
            "--line-color",
            "#00ff00",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 320x240 overlay"));

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));

    let image = screenmark::Bitmap::load_png(&out).unwrap();
    assert_eq!((image.width(), image.height()), (320, 240));
    assert!(!image.is_fully_transparent());
    assert_eq!(image.pixel(10, 30).unwrap(), [0, 255, 0, 255]);
}

#[test]
fn invalid_shape_is_rejected() {
    let temp = TempDir::new().unwrap();
    screenmark_cmd(&temp)
        .args(["--headless", "--shape", "triangle:1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shape kind"));
}

#[test]
fn invalid_color_is_rejected() {
    let temp = TempDir::new().unwrap();
    screenmark_cmd(&temp)
        .args(["--headless", "--line-color", "chartreuse"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown color"));
}

#[test]
fn headless_display_returns_after_duration() {
    let temp = TempDir::new().unwrap();
    screenmark_cmd(&temp)
        .args([
            "--headless",
            "--screen-size",
            "64x64",
            "--seconds",
            "0.1",
            "--shape",
            "circle:32,32",
        ])
        .assert()
        .success();
}

#[test]
fn init_config_writes_default_file_once() {
    let temp = TempDir::new().unwrap();

    screenmark_cmd(&temp)
        .arg("--init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default config"));

    let path = temp.path().join("screenmark").join("config.toml");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[shadow]"));

    screenmark_cmd(&temp)
        .arg("--init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_file_changes_default_style() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("screenmark");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[style]\nline_color = \"blue\"\n\n[shadow]\nenabled = false\n",
    )
    .unwrap();
    let out = temp.path().join("blue.png");

    screenmark_cmd(&temp)
        .args(["--screen-size", "100x100", "--shape", "box:10,10,20,20", "--output"])
        .arg(&out)
        .assert()
        .success();

    let image = screenmark::Bitmap::load_png(&out).unwrap();
    assert_eq!(image.pixel(10, 20).unwrap(), [0, 0, 255, 255]);
    // No shadow below the bottom-right corner.
    assert_eq!(image.pixel(33, 33).unwrap()[3], 0);
}
