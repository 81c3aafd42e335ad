use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const SENDER: &str = "rLNaPoKeeBjZe2qs6x52yVPZpZ8td4dc6w";

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", SENDER, "--dry-run", "--yes"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("row,name,address,outcome,detail"))
        .stdout(predicate::str::contains(
            "1,Alice,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,confirmed,",
        ))
        .stdout(predicate::str::contains(
            "2,Bob,rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn,confirmed,",
        ))
        .stdout(predicate::str::contains(
            "3,Carol,rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh,confirmed,",
        ))
        .stderr(predicate::str::contains(
            "Processed 3: 3 confirmed, 0 failed, 0 timed out",
        ));

    Ok(())
}

#[test]
fn test_operator_can_decline() {
    let mut cmd = assert_cmd::Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", SENDER, "--dry-run"])
        .write_stdin("n\n");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Proceed? [y/N]"))
        .stderr(predicate::str::contains("Aborted"))
        .stdout(predicate::str::contains("confirmed").not());
}

#[test]
fn test_prompt_shows_batch_totals() {
    let mut cmd = assert_cmd::Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", SENDER, "--dry-run"])
        .write_stdin("yes\n");

    // 17.75 USD at 0.5 USD per unit
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Recipients: 3"))
        .stderr(predicate::str::contains("Total USD:  17.75"))
        .stderr(predicate::str::contains("Total paid: 35.5 (35500000 base units)"));
}

#[test]
fn test_seed_required_for_live_network() {
    let mut cmd = Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", SENDER, "--yes"])
        .env_remove("DISBURSE_SEED");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("signing seed is required"));
}

#[test]
fn test_invalid_rate_is_rejected() {
    let mut cmd = Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0", "--sender", SENDER, "--dry-run", "--yes"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("exchange rate must be positive"));
}

#[test]
fn test_invalid_sender_fails_before_any_payment() {
    let mut cmd = Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", "0xabc", "--dry-run", "--yes"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Could not connect to ledger"))
        .stdout(predicate::str::contains("confirmed").not());
}

#[test]
fn test_live_run_requires_explicit_endpoint() {
    let mut cmd = Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", SENDER, "--yes"])
        .env("DISBURSE_SEED", "sEdTM1uX8pu2do5XvTnutH6HsouMaM2");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("trusted signing node"))
        .stdout(predicate::str::contains("row,name").not());
}

#[test]
fn test_seed_is_never_sent_to_public_servers() {
    let mut cmd = Command::new(cargo_bin!("disburse"));
    cmd.arg("tests/fixtures/recipients.csv")
        .args(["--rate", "0.5", "--sender", SENDER, "--yes"])
        .args(["--network", "mainnet", "--endpoint", "https://s1.ripple.com:51234/"])
        .env("DISBURSE_SEED", "sEdTM1uX8pu2do5XvTnutH6HsouMaM2");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("public server"))
        .stdout(predicate::str::contains("row,name").not());
}
