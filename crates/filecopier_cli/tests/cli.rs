use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, txt).expect("write text");
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn filecopier(path_tmp: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_filecopier"));
    cmd.arg("--log-file")
        .arg(path_tmp.join("logs/FileCopier.log"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn copies_groups_and_prints_summary() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("keep.md"), "keep");
    write_text(&src.join("notes.txt"), "skip");
    write_text(&src.join("node_modules/dep.js"), "skip");
    write_text(&src.join("lib/code.rs"), "fn main() {}");
    write_text(
        &tmp.path().join("conf/file-copier.toml"),
        &format!(
            "[Global]\ndestinationDirectory = \"{}\"\n\n[Code]\ndirectory = \"{}\"\ncopySubdirs = true\nexcludeExtensions = \"txt\"\nexcludeSubdirs = \"node_modules\"\n",
            toml_path(&dst),
            toml_path(&src)
        ),
    );

    let output = filecopier(tmp.path())
        .arg("-c")
        .arg(tmp.path().join("conf"))
        .arg("--verify")
        .output()
        .expect("run filecopier");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Group Code ("));
    assert!(stdout.contains("copied 2 files"));
    assert!(dst.join("Code/keep.md").exists());
    assert!(dst.join("Code/lib/code.rs").exists());
    assert!(!dst.join("Code/notes.txt").exists());
    assert!(!dst.join("Code/node_modules").exists());

    let l_logs: Vec<_> = std::fs::read_dir(tmp.path().join("logs"))
        .expect("read log dir")
        .map(|e| e.expect("entry").path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("FileCopier.") && n.ends_with(".log"))
        })
        .collect();
    assert_eq!(l_logs.len(), 1);
    let log = std::fs::read_to_string(&l_logs[0]).expect("read log");
    assert!(log.contains("**** Starting copy run"));
}

#[test]
fn no_copy_writes_nothing() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a.txt"), "a");
    let path_config = tmp.path().join("custom.toml");
    write_text(
        &path_config,
        &format!(
            "[Docs]\ndirectory = \"{}\"\ndestDir = \"{}\"\n",
            toml_path(&src),
            toml_path(&dst)
        ),
    );

    let output = filecopier(tmp.path())
        .args(["-n", "-p", "-c"])
        .arg(&path_config)
        .output()
        .expect("run filecopier");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 files to copy"));
    assert!(stdout.contains(" -> "));
    assert!(!dst.exists());
}

#[test]
fn group_errors_exit_with_one() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    write_text(&src.join("a.txt"), "a");
    let path_config = tmp.path().join("file-copier.toml");
    write_text(
        &path_config,
        &format!("[Homeless]\ndirectory = \"{}\"\n", toml_path(&src)),
    );

    let output = filecopier(tmp.path())
        .arg("-q")
        .arg("-c")
        .arg(&path_config)
        .output()
        .expect("run filecopier");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_config_is_fatal() {
    let tmp = TempDir::new().expect("tempdir");
    let output = filecopier(tmp.path())
        .arg("-c")
        .arg(tmp.path().join("nowhere"))
        .output()
        .expect("run filecopier");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
