use crate::executor::compose::{Composer, escape_double_quoted, escape_single_quoted};
use crate::executor::context::{ExecutionContext, RemoteHost};
use crate::executor::{Executor, ExecutorOptions};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn remote(host: &str, password: Option<&str>) -> Option<RemoteHost> {
    Some(RemoteHost {
        host: host.to_string(),
        password: password.map(str::to_string),
    })
}

/// Strips `[sshpass -p PW] ssh FLAGS HOST 'CMD'` down to CMD as the local shell would.
fn peel_remote(cmd: &str, password: Option<&str>) -> String {
    let words = shell_words::split(cmd).unwrap();
    let mut idx = 0;
    if let Some(pw) = password {
        assert_eq!(words[..3], ["sshpass", "-p", pw]);
        idx = 3;
    }
    assert_eq!(words.len(), idx + 7, "unexpected ssh words: {:?}", words);
    assert_eq!(words[idx], "ssh");
    words[idx + 6].clone()
}

/// Strips `RUNTIME exec NAME sh -c 'CMD'` down to CMD.
fn peel_container(cmd: &str) -> String {
    let words = shell_words::split(cmd).unwrap();
    assert_eq!(words.len(), 6, "unexpected container words: {:?}", words);
    assert_eq!(words[1..5], ["exec", "Duplicacy", "sh", "-c"]);
    words[5].clone()
}

fn exported(inner: &str, var: &str) -> Option<String> {
    let prefix = format!("{}=", var);
    shell_words::split(inner)
        .unwrap()
        .into_iter()
        .find_map(|w| w.strip_prefix(&prefix).map(str::to_string))
}

#[test]
fn test_compose_basic() {
    let ctx = ExecutionContext::default();
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup", "-storage", "gdrive"]), "");
    assert_eq!(cmd, "duplicacy backup -storage gdrive");
}

#[test]
fn test_compose_container_without_shell() {
    let ctx = ExecutionContext {
        container: Some("C".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("list", &args(&["-storage", "test"]), "");
    assert_eq!(cmd, "docker exec C list -storage test");
}

#[test]
fn test_compose_custom_binary_in_container() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("/config/bin/duplicacy_linux_x64_3.2.5", &args(&["backup"]), "");
    assert_eq!(cmd, "docker exec Duplicacy /config/bin/duplicacy_linux_x64_3.2.5 backup");
}

#[test]
fn test_compose_custom_runtime() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        container_runtime: "podman".to_string(),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["list"]), "");
    assert_eq!(cmd, "podman exec Duplicacy duplicacy list");
}

#[test]
fn test_compose_remote() {
    let ctx = ExecutionContext {
        remote: remote("root@192.168.1.100", None),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup", "-storage", "gdrive"]), "");
    assert_eq!(
        cmd,
        "ssh -o StrictHostKeyChecking=no -o LogLevel=ERROR root@192.168.1.100 'duplicacy backup -storage gdrive'"
    );
}

#[test]
fn test_compose_remote_with_password() {
    let ctx = ExecutionContext {
        remote: remote("root@192.168.1.100", Some("secret123")),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup"]), "");
    assert_eq!(
        cmd,
        "sshpass -p 'secret123' ssh -o StrictHostKeyChecking=no -o LogLevel=ERROR root@192.168.1.100 'duplicacy backup'"
    );
}

#[test]
fn test_compose_container_inside_remote() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        remote: remote("root@192.168.1.100", Some("secret123")),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup", "-storage", "gdrive"]), "");
    assert_eq!(
        cmd,
        "sshpass -p 'secret123' ssh -o StrictHostKeyChecking=no -o LogLevel=ERROR root@192.168.1.100 'docker exec Duplicacy duplicacy backup -storage gdrive'"
    );
}

#[test]
fn test_compose_remote_password_with_quote() {
    let ctx = ExecutionContext {
        remote: remote("root@192.168.1.100", Some("pass'word")),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup"]), "");
    assert!(cmd.starts_with("sshpass -p 'pass'\"'\"'word' ssh "), "got {}", cmd);
    assert_eq!(peel_remote(&cmd, Some("pass'word")), "duplicacy backup");
}

#[test]
fn test_compose_container_with_credentials() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        default_credential: Some("secret123".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup", "-storage", "gdrive"]), "gdrive");
    assert_eq!(
        cmd,
        "docker exec Duplicacy sh -c 'export DUPLICACY_PASSWORD=\"secret123\" && export DUPLICACY_GDRIVE_PASSWORD=\"secret123\" && duplicacy backup -storage gdrive'"
    );
}

#[test]
fn test_compose_container_without_entity_exports_generic_only() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        default_credential: Some("secret123".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["list"]), "");
    assert_eq!(cmd, "docker exec Duplicacy sh -c 'export DUPLICACY_PASSWORD=\"secret123\" && duplicacy list'");
}

#[test]
fn test_compose_container_with_cache_dir() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        repository: Some("/backuproot".to_string()),
        cache_dir: Some("/cache/localhost/0".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["backup"]), "");
    assert_eq!(cmd, "docker exec Duplicacy sh -c 'cd /cache/localhost/0 && duplicacy backup'");
}

#[test]
fn test_compose_token_path_goes_first() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        default_credential: Some("pass".to_string()),
        token_path: Some("/config/gcd-token.json".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "gdrive");
    assert_eq!(
        cmd,
        "docker exec Duplicacy sh -c 'export DUPLICACY_GDRIVE_GCD_TOKEN=\"/config/gcd-token.json\" && export DUPLICACY_PASSWORD=\"pass\" && export DUPLICACY_GDRIVE_PASSWORD=\"pass\" && duplicacy check'"
    );

    // no entity, no token
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "");
    assert!(!cmd.contains("GCD_TOKEN"));
}

#[test]
fn test_compose_token_alone_needs_inner_shell() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        token_path: Some("/config/gcd-token.json".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "gdrive");
    assert_eq!(
        cmd,
        "docker exec Duplicacy sh -c 'export DUPLICACY_GDRIVE_GCD_TOKEN=\"/config/gcd-token.json\" && duplicacy check'"
    );
}

#[test]
fn test_compose_hyphenated_storage_name() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        default_credential: Some("pass".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "my-storage");
    assert!(cmd.contains("export DUPLICACY_MY_STORAGE_PASSWORD=\"pass\""), "got {}", cmd);
}

#[test]
fn test_compose_per_storage_credential() {
    let mut ctx = ExecutionContext {
        default_credential: Some("passB".to_string()),
        ..Default::default()
    };
    ctx.entity_credentials.insert("storage1".to_string(), "passA".to_string());

    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "storage1");
    assert_eq!(exported(&cmd, "DUPLICACY_STORAGE1_PASSWORD").as_deref(), Some("passA"));

    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "other");
    assert_eq!(exported(&cmd, "DUPLICACY_PASSWORD").as_deref(), Some("passB"));
}

#[test]
fn test_compose_local_exports_wrap_workdir() {
    let ctx = ExecutionContext {
        repository: Some("/repo".to_string()),
        default_credential: Some("p".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose("duplicacy", &args(&["list"]), "");
    assert_eq!(cmd, "export DUPLICACY_PASSWORD=\"p\" && cd /repo && duplicacy list");
}

#[test]
fn test_escape_double_quoted_order() {
    assert_eq!(escape_double_quoted(r#"a\b"#), r#"a\\b"#);
    assert_eq!(escape_double_quoted(r#"\$"#), r#"\\\$"#);
    assert_eq!(escape_double_quoted("pass$word`with\"special\\chars"), "pass\\$word\\`with\\\"special\\\\chars");
}

#[test]
fn test_escape_single_quoted() {
    assert_eq!(escape_single_quoted("it's"), "it'\"'\"'s");
    assert_eq!(escape_single_quoted("plain"), "plain");
}

const NASTY_SECRETS: &[&str] = &[
    "plain",
    "pass$word",
    "back\\slash",
    "dq\"inside",
    "tick`whoami`",
    "$(rm -rf /)",
    "\\\"$`",
    "it's",
    "mix'\"$\\`'end\\",
    "trailing\\",
];

#[test]
fn test_credentials_round_trip_through_every_layer() {
    for &secret in NASTY_SECRETS {
        for (container, host) in [(false, false), (true, false), (false, true), (true, true)] {
            let ctx = ExecutionContext {
                container: container.then(|| "Duplicacy".to_string()),
                remote: if host { remote("root@nas", Some(secret)) } else { None },
                default_credential: Some(secret.to_string()),
                ..Default::default()
            };
            let mut cmd = Composer::new(&ctx).compose("duplicacy", &args(&["check"]), "gdrive");

            if host {
                cmd = peel_remote(&cmd, Some(secret));
            }
            if container {
                cmd = peel_container(&cmd);
            }

            assert_eq!(exported(&cmd, "DUPLICACY_PASSWORD").as_deref(), Some(secret), "layers ({}, {})", container, host);
            assert_eq!(exported(&cmd, "DUPLICACY_GDRIVE_PASSWORD").as_deref(), Some(secret));
            assert!(cmd.ends_with("&& duplicacy check"));
        }
    }
}

#[test]
fn test_arguments_survive_nesting_verbatim() {
    let base = args(&["prune", "-id", "'my repo'", "-keep", "0:180", "$HOME"]);
    let plain = Composer::new(&ExecutionContext {
        repository: Some("/repo".to_string()),
        ..Default::default()
    })
    .compose("duplicacy", &base, "");

    let ctx = ExecutionContext {
        repository: Some("/repo".to_string()),
        container: Some("Duplicacy".to_string()),
        remote: remote("root@nas", None),
        ..Default::default()
    };
    let nested = Composer::new(&ctx).compose("duplicacy", &base, "");
    assert_eq!(peel_container(&peel_remote(&nested, None)), plain);
}

#[test]
fn test_compose_script_always_uses_inner_shell() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        ..Default::default()
    };
    let cmd = Composer::new(&ctx).compose_script("cat /config/test.txt");
    assert_eq!(cmd, "docker exec Duplicacy sh -c 'cat /config/test.txt'");

    let local = Composer::new(&ExecutionContext::default()).compose_script("cat /config/test.txt");
    assert_eq!(local, "cat /config/test.txt");
}

#[test]
fn test_compose_script_quotes_survive_remote_and_container() {
    let ctx = ExecutionContext {
        container: Some("Duplicacy".to_string()),
        remote: remote("root@nas", Some("pw")),
        ..Default::default()
    };
    let script = "cat /x 2>/dev/null || echo '{}'";
    let cmd = Composer::new(&ctx).compose_script(script);
    assert_eq!(peel_container(&peel_remote(&cmd, Some("pw"))), script);
}

#[test]
fn test_executor_dry_run_returns_success() {
    let exec = Executor::new(ExecutorOptions {
        dry_run: true,
        verbose: true,
        ..Default::default()
    });
    assert!(exec.run_for_storage("", &args(&["backup", "-storage", "gdrive"])).is_ok());
}

#[test]
fn test_executor_dry_run_in_container_and_remote() {
    let exec = Executor::new(ExecutorOptions {
        dry_run: true,
        context: ExecutionContext {
            container: Some("TestContainer".to_string()),
            remote: remote("test@localhost", Some("testpass")),
            ..Default::default()
        },
        ..Default::default()
    });
    assert!(exec.run_for_storage("", &args(&["list"])).is_ok());
    assert_eq!(exec.capture_for_storage("local", &args(&["check", "-tabular"])).unwrap(), "");
    assert_eq!(exec.binary().unwrap(), "duplicacy");
}

#[test]
fn test_executor_preview_masks_secrets() {
    let exec = Executor::new(ExecutorOptions {
        context: ExecutionContext {
            binary_path: Some("duplicacy".to_string()),
            container: Some("Duplicacy".to_string()),
            default_credential: Some("topsecret".to_string()),
            remote: remote("root@nas", Some("sshsecret")),
            ..Default::default()
        },
        ..Default::default()
    });
    let shown = exec.compose_for_storage("gdrive", &args(&["check"]));
    assert!(!shown.contains("topsecret"));
    assert!(!shown.contains("sshsecret"));
    assert!(shown.contains("DUPLICACY_GDRIVE_PASSWORD"));
}

#[test]
fn test_executor_compose_does_not_discover() {
    // discovery through this runtime would fail
    let exec = Executor::new(ExecutorOptions {
        shell: "sh".to_string(),
        context: ExecutionContext {
            container: Some("Duplicacy".to_string()),
            container_runtime: "false".to_string(),
            ..Default::default()
        },
        ..Default::default()
    });
    assert_eq!(exec.compose_for_storage("", &args(&["list"])), "false exec Duplicacy duplicacy list");
    assert!(exec.binary().is_err());
}

#[test]
fn test_executor_capture_failure_keeps_report() {
    let exec = Executor::new(ExecutorOptions {
        shell: "sh".to_string(),
        context: ExecutionContext {
            binary_path: Some("echo 'ERROR STORAGE_NOT_FOUND gdrive'; exit 100;".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });
    let err = exec.capture_for_storage("gdrive", &args(&["check", "-tabular"])).unwrap_err();
    assert_eq!(err.exit_code(), Some(100));
    assert!(err.stdout().contains("STORAGE_NOT_FOUND"));
}

#[test]
fn test_executor_exports_reach_the_process() {
    let secret = "a\"b$c`d\\e'f";
    let exec = Executor::new(ExecutorOptions {
        shell: "sh".to_string(),
        context: ExecutionContext {
            binary_path: Some("printenv".to_string()),
            default_credential: Some(secret.to_string()),
            ..Default::default()
        },
        ..Default::default()
    });
    let out = exec.capture_for_storage("my-store", &args(&["DUPLICACY_MY_STORE_PASSWORD"])).unwrap();
    assert_eq!(out, format!("{}\n", secret));
}

#[test]
fn test_executor_runs_in_working_directory() {
    let exec = Executor::new(ExecutorOptions {
        shell: "sh".to_string(),
        context: ExecutionContext {
            binary_path: Some("pwd".to_string()),
            repository: Some("/".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });
    assert_eq!(exec.capture_for_storage("", &[]).unwrap(), "/\n");
}

#[test]
fn test_executor_reports_exit_code() {
    let exec = Executor::new(ExecutorOptions {
        shell: "sh".to_string(),
        context: ExecutionContext {
            binary_path: Some("exit".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });
    let err = exec.run_for_storage("", &args(&["100"])).unwrap_err();
    assert!(err.to_string().contains("exited with code 100"));
}
