use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn write_notifications(path: &std::path::Path, rows: &[&[&str]]) {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .unwrap();
    wtr.write_record(["app_package", "app_name", "title", "text"])
        .unwrap();
    for row in rows {
        wtr.write_record(*row).unwrap();
    }
    wtr.flush().unwrap();
}

#[test]
fn test_cli_extracts_signals_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notifications.csv");
    write_notifications(
        &input,
        &[
            &[
                "com.sberbank.android",
                "СберБанк",
                "Пополнение",
                "Перевод: 1 500,00 ₽ от Иван И. Карта **** 4532",
            ],
            &["com.bank.app", "", "Привет", "Как дела?"],
        ],
    );

    let mut cmd = Command::new(cargo_bin!("tradepay-core"));
    cmd.arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "app_package,amount,card_last4,operation",
        ))
        .stdout(predicate::str::contains(
            "com.sberbank.android,1500.00,4532,credit",
        ))
        // Noisy text still produces a row, with empty cells.
        .stdout(predicate::str::contains("com.bank.app,,,"));
}

#[test]
fn test_cli_skips_malformed_rows_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notifications.csv");
    write_notifications(
        &input,
        &[
            &["com.bank.app", "Bank"],
            &[
                "com.tinkoff.android",
                "Тинькофф",
                "Покупка",
                "Оплата 250.50 RUB, карта *1234",
            ],
        ],
    );

    let mut cmd = Command::new(cargo_bin!("tradepay-core"));
    cmd.arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "com.tinkoff.android,250.50,1234,debit",
        ))
        .stderr(predicate::str::contains("Error reading notification"));
}

#[test]
fn test_cli_writes_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notifications.csv");
    let output = dir.path().join("signals.csv");
    write_notifications(
        &input,
        &[&[
            "com.sberbank.android",
            "СберБанк",
            "Зачисление 900р.",
            "Баланс: 10 000р.",
        ]],
    );

    let mut cmd = Command::new(cargo_bin!("tradepay-core"));
    cmd.arg(&input).arg("--output").arg(&output);
    cmd.assert().success();

    let rendered = std::fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("com.sberbank.android,900,,credit"));
}

#[test]
fn test_cli_fails_on_missing_input() {
    let mut cmd = Command::new(cargo_bin!("tradepay-core"));
    cmd.arg("no-such-file.csv");
    cmd.assert().failure();
}
