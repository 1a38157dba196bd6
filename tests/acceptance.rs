//! End-to-end runs of the `cru-check` command surface against temporary directories.

use std::path::Path;

use cru_checks::app::run_from;
use cru_checks::domain::{CheckReport, DomainId, Verdict};
use cru_checks::error::{EXIT_CONFIG, EXIT_FAIL, EXIT_INSUFFICIENT_DATA};
use cru_checks::io::read_report_json;
use cru_checks::models::{CRU_PARAMETERS, cmb_envelope, cosmic_ray_flux};

fn argv(args: &[&str]) -> Vec<String> {
    std::iter::once("cru-check")
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn seed(data: &Path) {
    let status = run_from(argv(&["seed", "--data", path_str(data)])).unwrap();
    assert_eq!(status, 0);
}

fn check(data: &Path, out: &Path, extra: &[&str]) -> Result<u8, cru_checks::error::AppError> {
    let mut args = vec!["check", "--data", path_str(data), "--out", path_str(out)];
    args.extend_from_slice(extra);
    run_from(argv(&args))
}

fn report(out: &Path) -> CheckReport {
    read_report_json(&out.join("checks.json")).unwrap()
}

fn verdict_of(report: &CheckReport, domain: DomainId) -> Verdict {
    report
        .domains
        .iter()
        .find(|d| d.domain == domain)
        .map(|d| d.verdict)
        .unwrap()
}

fn summary_names(report: &CheckReport, domain: DomainId) -> Vec<String> {
    report
        .domains
        .iter()
        .find(|d| d.domain == domain)
        .map(|d| d.summaries.iter().map(|s| s.name.clone()).collect())
        .unwrap()
}

#[test]
fn seeded_data_passes_with_exit_zero() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());

    assert_eq!(check(data.path(), out.path(), &[]).unwrap(), 0);

    let report = report(out.path());
    assert_eq!(report.aggregate, Verdict::Pass);
    let domains: Vec<DomainId> = report.domains.iter().map(|d| d.domain).collect();
    assert_eq!(domains, DomainId::ALL.to_vec());
    for d in &report.domains {
        assert_eq!(d.verdict, Verdict::Pass, "{}", d.domain);
        assert!(d.rows_evaluated > 0);
        assert!(d.flagged_rows.is_empty());
        assert!(d.summaries.iter().all(|s| s.passed == Some(true)), "{}", d.domain);
    }
    let names = |domain| summary_names(&report, domain);
    assert_eq!(names(DomainId::CmbTt), ["modulation_depth"]);
    assert_eq!(names(DomainId::CmbEe), ["modulation_depth"]);
    assert_eq!(names(DomainId::CosmicRay), ["cutoff_ratio"]);
    assert_eq!(
        names(DomainId::GravitationalWave),
        ["spectral_index", "strain_at_1mhz"]
    );
    assert!(names(DomainId::DarkMatter).is_empty());

    let badge = std::fs::read_to_string(out.path().join("cru_checks.svg")).unwrap();
    assert!(badge.contains(">PASS<") && badge.contains("#4c1"));
    assert!(!out.path().join("checks.log").exists());
}

#[test]
fn reruns_are_byte_identical() {
    let data = tempfile::tempdir().unwrap();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    seed(data.path());

    check(data.path(), first.path(), &["--write-log"]).unwrap();
    check(data.path(), second.path(), &["--write-log"]).unwrap();

    for file in ["checks.json", "cru_checks.svg", "checks.log"] {
        assert_eq!(
            std::fs::read(first.path().join(file)).unwrap(),
            std::fs::read(second.path().join(file)).unwrap(),
            "{file} differs between runs"
        );
    }
}

#[test]
fn missing_file_is_insufficient_for_that_domain_only() {
    for missing in DomainId::ALL {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        seed(data.path());
        std::fs::remove_file(data.path().join(missing.file_name())).unwrap();

        assert_eq!(
            check(data.path(), out.path(), &[]).unwrap(),
            EXIT_INSUFFICIENT_DATA,
            "{missing}"
        );

        let report = report(out.path());
        assert_eq!(report.aggregate, Verdict::InsufficientData);
        for d in &report.domains {
            let expected = if d.domain == missing {
                Verdict::InsufficientData
            } else {
                Verdict::Pass
            };
            assert_eq!(d.verdict, expected, "{} with {missing} removed", d.domain);
        }
        let badge = std::fs::read_to_string(out.path().join("cru_checks.svg")).unwrap();
        assert!(badge.contains("INSUFFICIENT DATA") && badge.contains("#dfb317"));
    }
}

#[test]
fn spectrum_without_the_imprint_fails_with_exit_one() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());

    // Smooth envelope only, quoted at the usual 1e-3 relative error.
    let tt = &CRU_PARAMETERS.cmb_tt;
    let mut body = String::from("ell,C_ell_sr_inv,sigma_C_ell_sr_inv\n");
    for ell in (500..=2500).step_by(2) {
        let c = cmb_envelope(tt, ell).unwrap();
        body.push_str(&format!("{ell},{c:e},{:e}\n", c * 1e-3));
    }
    std::fs::write(data.path().join("cmb_cl_TT.csv"), body).unwrap();

    assert_eq!(check(data.path(), out.path(), &[]).unwrap(), EXIT_FAIL);

    let report = report(out.path());
    let tt = &report.domains[0];
    assert_eq!(tt.verdict, Verdict::Fail);
    assert!(tt.flagged_rows.is_empty());
    assert_eq!(tt.summaries[0].name, "modulation_depth");
    assert_eq!(tt.summaries[0].passed, Some(false));
    assert_eq!(verdict_of(&report, DomainId::CmbEe), Verdict::Pass);
}

#[test]
fn header_only_limits_file_reports_zero_rows() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());
    std::fs::write(
        data.path().join("dm_limits.csv"),
        "mass_GeV,sigma_SI_cm2,experiment\n",
    )
    .unwrap();

    assert_eq!(
        check(data.path(), out.path(), &[]).unwrap(),
        EXIT_INSUFFICIENT_DATA
    );
    let report = report(out.path());
    let dm = report
        .domains
        .iter()
        .find(|d| d.domain == DomainId::DarkMatter)
        .unwrap();
    assert_eq!(dm.verdict, Verdict::InsufficientData);
    assert_eq!(dm.rows_evaluated, 0);
    assert!(dm.detail.as_deref().unwrap().contains("no data rows"));
}

/// Two exact bins plus one 15σ outlier (σ = stat ⊕ sys = 5% of flux).
fn write_flux_with_outlier(data: &Path) {
    let p = &CRU_PARAMETERS.cosmic_ray;
    let mut body = String::from("log10_E_eV,J_eV_m2_s_sr_inv,sigma_stat,sigma_sys\n");
    for (x, scale) in [(18.0, 1.0), (18.2, 1.0), (18.4, 1.75)] {
        let j = cosmic_ray_flux(p, x).unwrap();
        body.push_str(&format!(
            "{x:.1},{:e},{:e},{:e}\n",
            j * scale,
            0.03 * j,
            0.04 * j
        ));
    }
    std::fs::write(data.join("uhecr_flux.csv"), body).unwrap();
}

#[test]
fn fifteen_sigma_outlier_fails_with_exit_one() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());
    write_flux_with_outlier(data.path());

    assert_eq!(check(data.path(), out.path(), &[]).unwrap(), EXIT_FAIL);

    let report = report(out.path());
    assert_eq!(report.aggregate, Verdict::Fail);
    assert_eq!(verdict_of(&report, DomainId::CosmicRay), Verdict::Fail);
    assert_eq!(verdict_of(&report, DomainId::CmbTt), Verdict::Pass);
    let cr = &report.domains[2];
    assert_eq!(cr.flagged_rows.len(), 1);
    assert_eq!(cr.flagged_rows[0].line, 4);
    assert!((cr.max_deviation.unwrap() - 15.0).abs() < 1e-6);
}

#[test]
fn fail_outranks_insufficient_data() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());
    write_flux_with_outlier(data.path());
    std::fs::remove_file(data.path().join("cmb_cl_EE.csv")).unwrap();

    assert_eq!(check(data.path(), out.path(), &[]).unwrap(), EXIT_FAIL);
    let report = report(out.path());
    assert_eq!(report.aggregate, Verdict::Fail);
    assert_eq!(verdict_of(&report, DomainId::CmbEe), Verdict::InsufficientData);
}

#[test]
fn loosened_tolerance_file_turns_the_outlier_into_a_pass() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());
    write_flux_with_outlier(data.path());

    let yaml = data.path().join("tolerances.yml");
    std::fs::write(
        &yaml,
        "\
cmb_tt:
  row: { rule: sigma_multiple, k: 3 }
  summary: { modulation_depth: { min: 3.0e-4, max: 5.0e-3 } }
cmb_ee:
  row: { rule: sigma_multiple, k: 3 }
  summary: { modulation_depth: { min: 3.0e-4, max: 5.0e-3 } }
cosmic_ray:
  row: { rule: sigma_multiple, k: 20 }
  summary: { cutoff_ratio: { min: 5 } }
gravitational_wave:
  row: { rule: sigma_multiple, k: 3 }
  summary: { spectral_index: 0.05, strain_at_1mhz: { min: 3.0e-23, max: 3.0e-22 } }
dark_matter: { row: { rule: upper_limit, max_log_ratio: 0 } }
",
    )
    .unwrap();

    let status = check(data.path(), out.path(), &["--tolerances", path_str(&yaml)]).unwrap();
    assert_eq!(status, 0);
    let report = report(out.path());
    assert_eq!(report.domains[2].bound, 20.0);
}

#[test]
fn incomplete_tolerance_file_is_a_config_error_before_any_output() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());

    let yaml = data.path().join("tolerances.yml");
    std::fs::write(&yaml, "cmb_tt: { row: { rule: sigma_multiple, k: 3 } }\n").unwrap();

    let err = check(data.path(), out.path(), &["--tolerances", path_str(&yaml)]).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_CONFIG);
    assert!(err.to_string().contains("cmb_ee"));
    assert!(!out.path().join("checks.json").exists());
    assert!(!out.path().join("cru_checks.svg").exists());
}

#[test]
fn write_log_adds_text_report() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed(data.path());

    check(data.path(), out.path(), &["--write-log"]).unwrap();
    let log = std::fs::read_to_string(out.path().join("checks.log")).unwrap();
    assert!(log.contains("CMB TT"));
    assert!(log.contains("spectral_index"));
    assert!(log.contains("cutoff_ratio"));
    assert!(log.ends_with("Aggregate: PASS\n"));
}

#[test]
fn inspect_flags_unloadable_datasets() {
    let data = tempfile::tempdir().unwrap();
    let status = run_from(argv(&["inspect", "--data", path_str(data.path())])).unwrap();
    assert_eq!(status, EXIT_INSUFFICIENT_DATA);

    seed(data.path());
    let status = run_from(argv(&["inspect", "--data", path_str(data.path())])).unwrap();
    assert_eq!(status, 0);
}

#[test]
fn seed_without_force_keeps_existing_files() {
    let data = tempfile::tempdir().unwrap();
    seed(data.path());
    let tt = data.path().join("cmb_cl_TT.csv");
    std::fs::write(&tt, "ell,cl,sigma\n600,1.0,0.1\n").unwrap();

    seed(data.path());
    assert_eq!(
        std::fs::read_to_string(&tt).unwrap(),
        "ell,cl,sigma\n600,1.0,0.1\n"
    );

    run_from(argv(&["seed", "--data", path_str(data.path()), "--force"])).unwrap();
    assert_ne!(
        std::fs::read_to_string(&tt).unwrap(),
        "ell,cl,sigma\n600,1.0,0.1\n"
    );
}
