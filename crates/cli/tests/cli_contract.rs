use assert_cmd::cargo::cargo_bin_cmd;
use lopdf::{dictionary, Document, Object};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures").join(name)
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should contain valid json")
}

/// Single landscape A4 page.
fn write_a4_landscape(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(842), Object::Integer(595)],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1_i64,
            "Kids" => vec![Object::Reference(page_id)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("test PDF should be written");
}

#[test]
fn render_emits_stable_svg_overlay() {
    let output = cargo_bin_cmd!("markup")
        .arg("render")
        .arg(fixture("plan_markup.json"))
        .args(["--page", "1", "--zoom", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let svg = String::from_utf8(output).expect("stdout should be utf-8");
    insta::assert_snapshot!("render_plan_page_one_at_2x", svg.trim_end());
}

#[test]
fn render_only_draws_the_requested_page() {
    cargo_bin_cmd!("markup")
        .arg("render")
        .arg(fixture("plan_markup.json"))
        .args(["--page", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<circle data-annotation-id="c2" cx="50" cy="50" r="10""#))
        .stdout(predicate::str::contains("r1").not());
}

#[test]
fn render_sizes_the_overlay_from_a_pdf() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let pdf = temp.path().join("a4.pdf");
    write_a4_landscape(&pdf);
    let output_path = temp.path().join("overlay.svg");

    cargo_bin_cmd!("markup")
        .arg("render")
        .arg(fixture("plan_markup.json"))
        .arg("--pdf")
        .arg(&pdf)
        .args(["--zoom", "0.5"])
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("overlay.svg"));

    let svg = fs::read_to_string(&output_path).expect("svg should be written");
    assert!(svg.starts_with(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="421" height="297.5" viewBox="0 0 421 297.5">"#
    ));
    assert!(svg.contains(r#"<rect data-annotation-id="r1" x="50" y="50" width="25" height="15""#));
}

#[test]
fn render_clamps_zoom_to_stored_settings() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    fs::write(
        temp.path().join("settings.json"),
        r#"{"version": 1, "settings": {"zoom": {"maxZoom": 1.5}}}"#,
    )
    .expect("write settings");

    cargo_bin_cmd!("markup")
        .arg("--store")
        .arg(temp.path())
        .arg("render")
        .arg(fixture("plan_markup.json"))
        .args(["--zoom", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"width="918" height="1188""#))
        .stdout(predicate::str::contains(r#"x="150" y="150" width="75" height="45""#));
}

#[test]
fn render_rejects_page_zero_and_missing_pdf_pages() {
    cargo_bin_cmd!("markup")
        .arg("render")
        .arg(fixture("plan_markup.json"))
        .args(["--page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1-based"));

    let temp = tempfile::tempdir().expect("temp dir should be created");
    let pdf = temp.path().join("a4.pdf");
    write_a4_landscape(&pdf);

    cargo_bin_cmd!("markup")
        .arg("render")
        .arg(fixture("plan_markup.json"))
        .arg("--pdf")
        .arg(&pdf)
        .args(["--page", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page 3 out of range"));
}

#[test]
fn import_then_export_moves_annotations_between_documents() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    let output = cargo_bin_cmd!("markup")
        .arg("--store")
        .arg(temp.path())
        .arg("import")
        .arg(fixture("plan_markup.json"))
        .args(["--document", "copy"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(
        stdout_json(&output),
        json!({
            "documentId": "copy",
            "totalFound": 7,
            "imported": 6,
            "skipped": 1,
            "byType": {
                "circle": 1,
                "ellipse": 1,
                "highlight": 1,
                "measurement": 1,
                "rectangle": 1,
                "text": 1
            }
        })
    );

    let output = cargo_bin_cmd!("markup")
        .arg("--store")
        .arg(temp.path())
        .arg("export")
        .args(["--document", "copy"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let export = stdout_json(&output);
    assert_eq!(export["version"], json!(1));
    assert_eq!(export["documentId"], json!("copy"));
    let annotations = export["annotations"].as_array().expect("annotations array");
    assert_eq!(annotations.len(), 6);
    assert!(annotations.iter().all(|a| a["documentId"] == json!("copy")));
    assert!(annotations.iter().all(|a| a["id"] != json!("r1")));
    assert_eq!(annotations[0]["position"]["width"], json!(50.0));
}

#[test]
fn import_rejects_newer_exports() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let input = temp.path().join("future.json");
    fs::write(&input, r#"{"version": 2, "annotations": []}"#).expect("write input");

    cargo_bin_cmd!("markup")
        .arg("--store")
        .arg(temp.path())
        .arg("import")
        .arg(&input)
        .args(["--document", "d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported export version 2"));
}

#[test]
fn recenter_reports_zoom_cycle_and_scroll() {
    let output = cargo_bin_cmd!("markup")
        .arg("recenter")
        .args(["--x", "500", "--y", "400"])
        .args(["--viewport-width", "800", "--viewport-height", "600"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(
        stdout_json(&output),
        json!({
            "previousZoom": 1.0,
            "zoom": 2.0,
            "scroll": { "x": 600.0, "y": 500.0 },
            "settleDelayMs": 50
        })
    );
}

#[test]
fn recenter_wraps_from_the_top_of_the_cycle() {
    let output = cargo_bin_cmd!("markup")
        .arg("recenter")
        .args(["--x", "100", "--y", "100", "--zoom", "4"])
        .args(["--scroll-x", "300", "--scroll-y", "200"])
        .args(["--viewport-width", "800", "--viewport-height", "600"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan = stdout_json(&output);
    assert_eq!(plan["zoom"], json!(1.0));
    // (100 + 300) / 4 - 400 and (100 + 200) / 4 - 300 clamp to zero
    assert_eq!(plan["scroll"], json!({ "x": 0.0, "y": 0.0 }));
}

#[test]
fn recenter_honors_stored_settings() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    fs::write(
        temp.path().join("settings.json"),
        r#"{"version": 1, "settings": {"zoom": {"recenterMaxZoom": 2.0}}}"#,
    )
    .expect("write settings");

    let output = cargo_bin_cmd!("markup")
        .arg("--store")
        .arg(temp.path())
        .arg("recenter")
        .args(["--x", "10", "--y", "10", "--zoom", "2"])
        .args(["--viewport-width", "800", "--viewport-height", "600"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(stdout_json(&output)["zoom"], json!(1.0));
}

#[test]
fn measure_prints_scaled_label() {
    cargo_bin_cmd!("markup")
        .args(["measure", "--from", "0,0", "--to", "30,40", "--scale", "25", "--unit", "ft"])
        .assert()
        .success()
        .stdout("2.00 ft\n");

    cargo_bin_cmd!("markup")
        .args(["measure", "--from", "0,0", "--to", "1,1", "--scale", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scale must be a finite positive number"));
}

#[test]
fn mentions_lists_unique_names() {
    cargo_bin_cmd!("markup")
        .args(["mentions", "@alex can you check with @Sam and @alex? mail sam@example.com"])
        .assert()
        .success()
        .stdout("[\"alex\",\"Sam\"]\n");
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("markup")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
