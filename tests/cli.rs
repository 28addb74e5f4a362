use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const BASE: &str = r#"{
    "packages": [
        {
            "name": "roave/security-advisories",
            "version": "dev-master",
            "source": {
                "type": "git",
                "url": "https://github.com/Roave/SecurityAdvisories.git",
                "reference": "d46283075d76ed244f7825b378eeb1cee246af73"
            }
        },
        {
            "name": "symfony/event-dispatcher",
            "version": "v2.8.52",
            "source": {
                "type": "git",
                "url": "https://github.com/symfony/event-dispatcher.git",
                "reference": "a77e974a5fecb4398833b0709210e3d5e334ffb0"
            }
        }
    ],
    "packages-dev": [
        {
            "name": "phpunit/php-invoker",
            "version": "3.0.1",
            "source": {
                "type": "git",
                "url": "https://github.com/sebastianbergmann/php-invoker.git",
                "reference": "f6eedfed1085dd1f4c599629459a0277d25f9a66"
            }
        }
    ],
    "aliases": [],
    "platform": { "php": ">=5.3" },
    "platform-dev": []
}"#;

const TARGET: &str = r#"{
    "packages": [
        {
            "name": "psr/event-dispatcher",
            "version": "1.0.0",
            "source": {
                "type": "git",
                "url": "https://github.com/php-fig/event-dispatcher.git",
                "reference": "dbefd12671e8a14ec7f180cab83036ed26714bb0"
            }
        },
        {
            "name": "roave/security-advisories",
            "version": "dev-master",
            "source": {
                "type": "git",
                "url": "https://github.com/Roave/SecurityAdvisories.git",
                "reference": "9b860214d58c48b5cbe99bdb17914d0eb723c9cd"
            }
        },
        {
            "name": "symfony/event-dispatcher",
            "version": "v5.1.2",
            "source": {
                "type": "git",
                "url": "https://github.com/symfony/event-dispatcher.git",
                "reference": "cc0d059e2e997e79ca34125a52f3e33de4424ac7"
            }
        }
    ],
    "packages-dev": [],
    "aliases": [],
    "platform": { "php": ">=7.2.5" },
    "platform-dev": []
}"#;

fn write_fixtures(dir: &Path) {
    fs::write(dir.join("base.lock"), BASE).unwrap();
    fs::write(dir.join("target.lock"), TARGET).unwrap();
}

fn lockdiff(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("lockdiff"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn test_markdown_table() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    lockdiff(dir.path())
        .args(["--base", "base.lock", "--target", "target.lock"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "| Prod Packages | Operation | Base | Target |\n\
             |---|---|---|---|\n\
             | psr/event-dispatcher | New | - | 1.0.0 |\n\
             | roave/security-advisories | Changed | dev-master d462830 | dev-master 9b86021 |\n\
             | symfony/event-dispatcher | Upgraded | v2.8.52 | v5.1.2 |",
        ))
        .stdout(predicate::str::contains("| phpunit/php-invoker | Removed | 3.0.1 | - |"))
        .stdout(predicate::str::contains("php ").not());
}

#[test]
fn test_no_dev_with_platform() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "--no-dev", "-p", "-f", "mdlist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dev Packages").not())
        .stdout(predicate::str::contains("phpunit").not())
        .stdout(predicate::str::ends_with(
            " - Upgraded symfony/event-dispatcher (v2.8.52 => v5.1.2)\n - Changed php (>=5.3 => >=7.2.5)\n",
        ));
}

#[test]
fn test_json_with_links() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    let output = lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "-l", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["with_links"], true);
    let production = &report["sections"][0]["entries"];
    assert_eq!(
        production[1]["link"],
        "https://github.com/Roave/SecurityAdvisories/compare/d462830...9b86021"
    );
    assert_eq!(
        production[0]["link"],
        "https://github.com/php-fig/event-dispatcher/releases/tag/1.0.0"
    );
    let development = &report["sections"][1]["entries"];
    assert_eq!(development[0]["kind"], "uninstall");
    assert_eq!(
        development[0]["link"],
        "https://github.com/sebastianbergmann/php-invoker/releases/tag/3.0.1"
    );
}

#[test]
fn test_strict_exit_codes() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "--strict"])
        .assert()
        .code(6);
    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "--strict", "--no-dev"])
        .assert()
        .code(2);
    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "base.lock", "--strict"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_lock_file() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    lockdiff(dir.path())
        .args(["-b", "missing.lock", "-t", "target.lock"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Failed to resolve packages from `missing.lock:composer.lock`",
        ));
}

#[test]
fn test_git_base() {
    let dir = tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    fs::write(dir.path().join("composer.lock"), BASE).unwrap();
    git(dir.path(), &["add", "composer.lock"]);
    git(dir.path(), &["commit", "-q", "-m", "init"]);
    fs::write(dir.path().join("composer.lock"), TARGET).unwrap();

    lockdiff(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "| symfony/event-dispatcher | Upgraded | v2.8.52 | v5.1.2 |",
        ));

    lockdiff(dir.path())
        .args(["--base", "invalid-ref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid-ref:composer.lock"));
}

#[test]
fn test_gitlab_domains_from_config() {
    let dir = tempdir().unwrap();
    let lock = |version: &str| {
        format!(
            r#"{{"packages": [{{
                "name": "acme/package",
                "version": "{version}",
                "source": {{"type": "git", "url": "git@gitlab.acme.org:ac/me/package.git", "reference": null}}
            }}]}}"#
        )
    };
    fs::write(dir.path().join("base.lock"), lock("3.12.0")).unwrap();
    fs::write(dir.path().join("target.lock"), lock("3.12.1")).unwrap();

    let link = "[Compare](https://gitlab.acme.org/ac/me/package/compare/3.12.0...3.12.1)";

    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "-l"])
        .assert()
        .success()
        .stdout(predicate::str::contains(link).not());

    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "-l", "--gitlab-domain", "gitlab.acme.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains(link));

    fs::write(
        dir.path().join("lockdiff.toml"),
        "[[providers]]\nkind = \"gitlab\"\nhost = \"gitlab.acme.org\"\n",
    )
    .unwrap();
    lockdiff(dir.path())
        .args(["-b", "base.lock", "-t", "target.lock", "-l"])
        .assert()
        .success()
        .stdout(predicate::str::contains(link));
}
