//! Layering guardrails for the compile-then-run boundary.
//!
//! The `designgen` CLI only writes and runs drivers; the design model and the generators are linked into the driver,
//! never into the CLI. This test scans the root `Cargo.toml` and fails if either crate appears in `[dependencies]`.

const DRIVER_ONLY: [&str; 2] = ["designgen_design", "designgen_generators"];

#[test]
fn cli_does_not_link_driver_only_crates() {
    let manifest = include_str!("../Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            if line == "[dependencies]" {
                in_dependencies = true;
                continue;
            }
            // Any new section after `[dependencies]` ends the scan window.
            if in_dependencies {
                break;
            }
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        for name in DRIVER_ONLY {
            if line_no_comment.starts_with(name) {
                panic!("`{name}` must not appear in [dependencies]; only generated drivers link it");
            }
        }
    }
}

#[test]
fn driver_manifest_links_every_support_crate() {
    let template = include_str!("../src/driver/templates/Cargo.toml.jinja");
    for name in ["designgen_codegen"].iter().chain(DRIVER_ONLY.iter()) {
        assert!(template.contains(&format!("{name} = {{ path = ")), "driver manifest misses {name}");
    }
}
