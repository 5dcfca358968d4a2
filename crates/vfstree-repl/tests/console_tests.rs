//! Console commands against the in-memory fake device.

use std::io::Write;
use std::sync::Arc;

use vfstree_kernel::{Node, VfsError};
use vfstree_repl::{CommandError, Repl};
use vfstree_testutil::FakeVfsApi;

fn device() -> Arc<FakeVfsApi> {
    Arc::new(
        FakeVfsApi::new()
            .with_volume("/sd")
            .with_volume("/config")
            .with_file("/sd", "a/b.txt", 10)
            .with_file("/sd", "logs/boot.log", 100)
            .with_file("/config", "config.ini", 64)
            .without_mkdir(),
    )
}

/// Run each line, collecting outputs and errors in order.
async fn run_script(repl: &mut Repl<Arc<FakeVfsApi>>, script: &str) -> Vec<String> {
    let mut outputs = Vec::new();
    for line in script.lines() {
        match repl.process_line(line).await {
            Ok(Some(output)) => outputs.push(output),
            Ok(None) => {}
            Err(e) => outputs.push(format!("ERROR: {e}")),
        }
    }
    outputs
}

async fn connected() -> (Arc<FakeVfsApi>, Repl<Arc<FakeVfsApi>>) {
    let api = device();
    let mut repl = Repl::new(api.clone());
    repl.process_line("volumes").await.unwrap();
    (api, repl)
}

fn local_file(content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file
}

// ============================================================================
// Browsing
// ============================================================================

#[tokio::test]
async fn volumes_are_listed_sorted() {
    let mut repl = Repl::new(device());
    let output = repl.process_line("volumes").await.unwrap().unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("/config"));
    assert!(lines[1].starts_with("/sd"));
    assert!(lines[1].contains("110 B used"));
}

#[tokio::test]
async fn ls_marks_directories() {
    let (_api, mut repl) = connected().await;

    let outputs = run_script(&mut repl, "ls sd\nls /sd a\nls config").await;
    assert_eq!(
        outputs,
        vec![
            "            a/\n            logs/",
            "        10  b.txt",
            "        64  config.ini",
        ]
    );
}

#[tokio::test]
async fn ls_sorted_puts_directories_first_by_name() {
    let (_api, mut repl) = connected().await;

    let outputs = run_script(&mut repl, "mkdir sd 0dir\nls sd\nls -s sd").await;
    assert_eq!(
        outputs,
        vec![
            "created /sd:0dir/",
            "            a/\n            logs/\n            0dir/",
            "            0dir/\n            a/\n            logs/",
        ]
    );
}

#[tokio::test]
async fn tree_shows_everything_known() {
    let (_api, mut repl) = connected().await;

    let output = repl.process_line("tree sd").await.unwrap().unwrap();
    assert_eq!(output, "/sd\n  a/\n    b.txt\n  logs/\n    boot.log");
}

#[tokio::test]
async fn browsing_before_volumes_is_an_unknown_volume() {
    let mut repl = Repl::new(device());

    let err = repl.process_line("ls sd").await.unwrap_err();
    assert!(matches!(err, CommandError::Vfs(VfsError::UnknownVolume(ref v)) if v == "/sd"));
}

#[tokio::test]
async fn ls_of_a_file_is_rejected() {
    let (_api, mut repl) = connected().await;

    let err = repl.process_line("ls sd a/b.txt").await.unwrap_err();
    assert_eq!(err.to_string(), "/sd:a/b.txt is not a directory");
}

#[tokio::test]
async fn stat_shows_usage() {
    let (_api, mut repl) = connected().await;

    let output = repl.process_line("stat sd").await.unwrap().unwrap();
    assert_eq!(output, "/sd: 110 B used, 1023.9 KiB free, 1.0 MiB total");
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn put_into_unknown_directory_then_load() {
    let (api, mut repl) = connected().await;
    let local = local_file(b"hello");
    let put = format!("put sd music/x.fseq {}", local.path().display());

    let outputs = run_script(&mut repl, &put).await;
    assert_eq!(outputs, vec!["uploaded /sd:music/x.fseq (5 bytes)"]);
    assert!(api.exists("/sd", "music/x.fseq").await);

    let outputs = run_script(&mut repl, "ls sd\nload sd music\nls sd").await;
    assert_eq!(
        outputs,
        vec![
            "            a/\n            logs/\n            music/…",
            "         5  x.fseq",
            "            a/\n            logs/\n            music/",
        ]
    );
}

#[tokio::test]
async fn put_carries_local_mtime() {
    let (_api, mut repl) = connected().await;
    let local = local_file(b"x");
    let modified = std::fs::metadata(local.path()).unwrap().modified().unwrap();

    repl.process_line(&format!("put sd f.bin {}", local.path().display()))
        .await
        .unwrap();
    assert_eq!(
        repl.manager().lookup("/sd", "f.bin").and_then(Node::mtime),
        Some(chrono::DateTime::<chrono::Utc>::from(modified))
    );
}

#[tokio::test]
async fn put_of_missing_local_file_makes_no_request() {
    let (api, mut repl) = connected().await;
    let calls = api.calls().await.len();

    let err = repl
        .process_line("put sd f.bin /nonexistent/vfsh-test-file")
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::ReadFile { .. }));
    assert_eq!(api.calls().await.len(), calls);
}

#[tokio::test]
async fn mkdir_without_server_support_is_local() {
    let (api, mut repl) = connected().await;

    let outputs = run_script(&mut repl, "mkdir config x\nls config").await;
    assert_eq!(
        outputs,
        vec!["created /config:x/", "        64  config.ini\n            x/"]
    );
    assert!(!api.exists("/config", "x").await);
}

#[tokio::test]
async fn rm_and_rmdir() {
    let (api, mut repl) = connected().await;

    let outputs = run_script(&mut repl, "rm sd a/b.txt\nrmdir sd logs\nls sd\nstat sd").await;
    assert_eq!(
        outputs,
        vec![
            "deleted /sd:a/b.txt",
            "deleted /sd:logs",
            "            a/",
            "/sd: 0 B used, 1.0 MiB free, 1.0 MiB total",
        ]
    );
    assert!(!api.exists("/sd", "logs").await);
}

#[tokio::test]
async fn server_errors_are_reported() {
    let (_api, mut repl) = connected().await;
    let before = repl.manager().registry().clone();

    let err = repl.process_line("rm sd nothing.txt").await.unwrap_err();
    assert!(err.to_string().contains("HTTP 404"));
    assert_eq!(repl.manager().registry(), &before);
}

// ============================================================================
// Command parsing
// ============================================================================

#[tokio::test]
async fn wrong_arity_prints_usage() {
    let mut repl = Repl::new(device());

    let outputs = run_script(&mut repl, "ls\nput sd x\nvolumes extra").await;
    assert_eq!(
        outputs,
        vec![
            "ERROR: usage: ls [-s] VOLUME [DIR]",
            "ERROR: usage: put VOLUME PATH LOCALFILE",
            "ERROR: usage: volumes",
        ]
    );
}

#[tokio::test]
async fn blank_lines_comments_and_unknown_commands() {
    let mut repl = Repl::new(device());

    let outputs = run_script(&mut repl, "\n   \n# a comment\nfrobnicate now").await;
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].starts_with("ERROR: unknown command: frobnicate"));
}

#[tokio::test]
async fn help_and_quit() {
    let mut repl = Repl::new(device());

    let help = repl.process_line("help").await.unwrap().unwrap();
    assert!(help.contains("put VOLUME PATH LOCALFILE"));
    assert!(!repl.is_done());

    assert_eq!(repl.process_line("quit").await.unwrap(), None);
    assert!(repl.is_done());
}
