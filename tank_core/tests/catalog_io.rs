// ==========================================
// Catalog persistence and reports
// ==========================================
// Save/load round trip through the file system,
// then reports computed from the reloaded data
// ==========================================

use std::fs;
use std::path::PathBuf;

use tank_core::api::{ReliabilityOptions, ReportContext};
use tank_core::catalog::{reference_designs, DesignCatalog};
use tank_core::config::AnalysisConfig;
use tank_core::file_io::{load_catalog, load_design, save_catalog, save_design};
use tank_core::materials::MaterialRegistry;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tank_core_it_{}_{}.json", name, std::process::id()))
}

#[test]
fn test_catalog_roundtrip_gives_identical_reports() {
    let path = temp_path("catalog_reports");
    let registry = MaterialRegistry::standard();
    let config = AnalysisConfig::default();

    let original = DesignCatalog::reference();
    save_catalog(&original, &path).unwrap();
    let loaded = load_catalog(&path).unwrap();
    loaded.validate(&registry).unwrap();

    let before = ReportContext::new(&original, &registry, &config);
    let after = ReportContext::new(&loaded, &registry, &config);
    for design in original.list() {
        assert_eq!(before.stress_report(&design.id).unwrap(), after.stress_report(&design.id).unwrap());
        assert_eq!(before.failure_report(&design.id).unwrap(), after.failure_report(&design.id).unwrap());
    }

    let _ = fs::remove_file(&path);
}

#[test]
fn test_single_design_roundtrip() {
    let path = temp_path("single_design");
    let mut design = reference_designs().remove(2);
    design.name = "Edited Type III".to_string();
    design.touch();
    save_design(&design, &path).unwrap();

    let loaded = load_design(&path).unwrap();
    assert_eq!(loaded, design);
    assert_eq!(loaded.liner.as_ref().map(|l| l.material_id.as_str()), Some("AL6061-T6"));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_custom_config_changes_reports() {
    let catalog = DesignCatalog::reference();
    let registry = MaterialRegistry::standard();
    let default_config = AnalysisConfig::default();
    let mild = AnalysisConfig::from_toml_str(
        r#"
        [scf]
        severity = 0.0

        [reliability]
        sample_count = 128
        seed = 5
        "#,
    )
    .unwrap();

    let strict = ReportContext::new(&catalog, &registry, &default_config)
        .stress_report("type4-700")
        .unwrap();
    let relaxed = ReportContext::new(&catalog, &registry, &mild)
        .stress_report("type4-700")
        .unwrap();
    assert!(relaxed.max_stress.value_mpa < strict.max_stress.value_mpa);
    assert_eq!(relaxed.per_layer_stress, strict.per_layer_stress);

    let report = ReportContext::new(&catalog, &registry, &mild)
        .reliability_report("type4-700", &ReliabilityOptions::default())
        .unwrap();
    assert_eq!(report.sample_count, 128);
    assert_eq!(report.seed, 5);
    assert_eq!(report.limit_pressure_bar, 700.0 * 2.25);
}

#[test]
fn test_custom_material_file_extends_registry() {
    let registry = MaterialRegistry::from_toml_str(
        r#"
        [[material]]
        id = "M40J"
        kind = "fiber"
        name = "Toray M40J / epoxy"
        e1_mpa = 230000.0
        e2_mpa = 7000.0
        g12_mpa = 4500.0
        nu12 = 0.3
        xt_mpa = 2400.0
        xc_mpa = 1270.0
        yt_mpa = 50.0
        yc_mpa = 200.0
        s_mpa = 90.0
        density_kg_m3 = 1600.0
        cost_per_kg = 120.0
        "#,
    )
    .unwrap();
    assert!(registry.contains("M40J"));
    assert_eq!(registry.len(), 1);
}
