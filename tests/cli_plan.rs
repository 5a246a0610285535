//! CLI integration tests for `hostsmith plan`.
//!
//! `plan` is local-only, so these tests run the real binary against temp
//! projects without any remote host.

mod common;

use common::{run_cli, Project};

#[test]
fn plan_lists_pending_bootloader_files() {
    let project = Project::new();
    project.write_config("[bootloader]\n");
    project.write(
        "assets/grub/etc/default/grub.d/90-test.cfg",
        "GRUB_TIMEOUT=5\n",
    );

    let (ok, stdout, stderr) = run_cli(project.dir.path(), &["plan"]);
    assert!(ok, "plan failed:\n{stderr}");
    assert!(stdout.contains("bootloader"), "missing step name:\n{stdout}");
    assert!(
        stdout.contains("create /etc/default/grub.d/90-test.cfg"),
        "missing create line:\n{stdout}"
    );
    assert!(stdout.contains("trigger: update-grub"), "{stdout}");
    assert!(stdout.contains("1 of 1 steps due."), "{stdout}");
}

#[test]
fn plan_json_emits_machine_readable_report() {
    let project = Project::new();
    project.write_config("[bootloader]\n");
    project.write("assets/grub/etc/default/grub.d/90-test.cfg", "x\n");

    let (ok, stdout, _) = run_cli(project.dir.path(), &["--json", "plan"]);
    assert!(ok);

    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["event"], "plan");
    assert_eq!(report["due"], 1);
    assert_eq!(report["steps"][0]["step"], "bootloader");
    assert_eq!(report["steps"][0]["due"], true);
}

#[test]
fn plan_reports_everything_up_to_date_for_empty_graph() {
    let project = Project::new();
    project.write_config("");

    let (ok, stdout, _) = run_cli(project.dir.path(), &["plan"]);
    assert!(ok);
    assert!(stdout.contains("Everything up to date."));
}

#[test]
fn plan_fails_on_missing_asset_directory() {
    let project = Project::new();
    project.write_config("[bootloader]\n");

    let (ok, _, stderr) = run_cli(project.dir.path(), &["plan"]);
    assert!(!ok);
    assert!(
        stderr.contains("asset directory not found"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn plan_fails_on_missing_template_key() {
    let project = Project::new();
    project.write_config(
        r#"[smtp]
server = "smtp.test"
port = 587
username = "mailer"
password = "pw"
from = "pve@test"
"#,
    );
    project.write("assets/smtp/etc/relay.cfg", "unknown={nope}\n");

    let (ok, _, stderr) = run_cli(project.dir.path(), &["plan"]);
    assert!(!ok);
    assert!(stderr.contains("missing key 'nope'"), "{stderr}");
}

#[test]
fn plan_redacts_secret_bearing_files() {
    let project = Project::new();
    project.write_config(
        r#"[smtp]
server = "smtp.test"
port = 587
username = "mailer"
password = "super-secret-pw"
from = "pve@test"
"#,
    );
    project.write("assets/smtp/etc/pve/priv/notifications.cfg", "password {password}\n");

    let (ok, stdout, stderr) = run_cli(project.dir.path(), &["plan"]);
    assert!(ok, "{stderr}");
    assert!(stdout.contains("(contents redacted)"), "{stdout}");
    assert!(!stdout.contains("super-secret-pw"));
    assert!(!stderr.contains("super-secret-pw"));
}

#[test]
fn dry_run_apply_matches_plan_output() {
    let project = Project::new();
    project.write_config("[bootloader]\n");
    project.write("assets/grub/etc/default/grub.d/90-test.cfg", "x\n");

    let (ok, stdout, _) = run_cli(project.dir.path(), &["apply", "--dry-run"]);
    assert!(ok);
    assert!(stdout.contains("1 of 1 steps due."));
}
