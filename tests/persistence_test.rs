#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: place and deliver an order
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "type, order, delivery, rows, name, quantity, amount, payment").unwrap();
    writeln!(csv1, "row, 1, , , Sneakers, 1, 100.00,").unwrap();
    writeln!(csv1, "place, 1, , , , , , PaymentPlan").unwrap();
    writeln!(csv1, "deliver, 1, , , , , ,").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("payorder"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains(r#""orderStatus":"Delivered""#));

    // 2. Second run: credit the delivery recovered from the same DB path
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "type, order, delivery, rows, name, quantity, amount, payment").unwrap();
    writeln!(csv2, "credit_rows, 1, 1, , , , ,").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("payorder"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    assert!(stdout2.contains(r#"{"id":1,"version":3,"#));
    assert!(stdout2.contains(r#""orderStatus":"Cancelled""#));
}
