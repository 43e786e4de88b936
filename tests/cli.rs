use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn slime_lights() -> Command {
    let mut cmd = Command::cargo_bin("slime-lights").expect("binary exists");
    cmd.arg("--summary-only");
    cmd
}

fn write_scene(xml: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("scene.xml");
    fs::write(&path, xml).expect("write scene");
    (dir, path)
}

#[test]
fn default_scene_summary() {
    slime_lights()
        .assert()
        .success()
        .stdout(contains("Scene with 3 slime cube(s) and 50 particle(s)"))
        .stdout(contains("elapsed=1.00s"))
        .stdout(contains("light color=(0.50, 0.50, 0.00) mode=1 tracking=on"))
        .stdout(contains("slide offset=0.00"))
        .stdout(contains(" - slime 2 vertical scale="));
}

#[test]
fn mode_keys_change_blue_channel() {
    slime_lights()
        .args(["--keys", "2"])
        .assert()
        .success()
        .stdout(contains("light color=(0.50, 0.50, 0.50) mode=2"));

    slime_lights()
        .args(["--keys", "3", "--pointer", "256,576"])
        .assert()
        .success()
        .stdout(contains("light color=(0.25, 0.75, 0.75) mode=3"));
}

#[test]
fn toggled_tracking_keeps_lights_dark() {
    slime_lights()
        .args(["--keys", "Q"])
        .assert()
        .success()
        .stdout(contains("light color=(0.00, 0.00, 0.00) mode=1 tracking=off"));
}

#[test]
fn zero_frames_is_rest_pose() {
    slime_lights()
        .args(["--frames", "0"])
        .assert()
        .success()
        .stdout(contains("elapsed=0.00s"))
        .stdout(contains(" - slime 0 vertical scale=2.00"))
        .stdout(contains(" - slime 1 vertical scale=2.00"))
        .stdout(contains(" - slime 2 vertical scale=2.00"));
}

#[test]
fn arrow_keys_slide_cubes() {
    slime_lights()
        .args(["--keys", "Right,Right,Right"])
        .assert()
        .success()
        .stdout(contains("slide offset=0.03"));

    slime_lights()
        .args(["--keys", "Left"])
        .assert()
        .success()
        .stdout(contains("slide offset=-0.01"));
}

#[test]
fn scene_file_overrides_counts() {
    let (_dir, path) = write_scene(
        r#"<scene>
  <particles><count>7</count><seed>3</seed></particles>
  <slime><amplitude>0.2</amplitude><position>0 0 1</position></slime>
</scene>"#,
    );
    slime_lights()
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Scene with 1 slime cube(s) and 7 particle(s)"))
        .stdout(contains(" - slime 1 ").not());
}

#[test]
fn missing_textures_are_not_fatal() {
    let (_dir, path) = write_scene(
        "<scene><assets><wall>missing-wall.png</wall><slime>missing-slime.png</slime></assets></scene>",
    );
    slime_lights()
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Scene with 3 slime cube(s)"));
}

#[test]
fn missing_scene_file_fails() {
    slime_lights()
        .arg("does-not-exist.xml")
        .assert()
        .failure()
        .stderr(contains("failed to read scene"));
}

#[test]
fn invalid_scene_fails() {
    let (_dir, path) = write_scene("<scene><window><width>0</width></window></scene>");
    slime_lights()
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("window size must be non-zero"));
}

#[test]
fn unknown_argument_fails() {
    slime_lights()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --bogus"));
}
