use std::process::{Command, Stdio};
use std::thread;
use anyhow::{Result, bail};
use log::{info, warn};
use crate::config::Config;
use crate::model::Entry;

/// Opens the entry's link with the configured opener command.
pub fn open(entry: &Entry, config: &Config) -> Result<()> {
    let Some(mut command) = build_command(&config.general.opener, &entry.link) else {
        bail!("opener command is empty");
    };
    info!("Launcher: opening '{}' ({})", entry.label, entry.link);
    let mut child = command.spawn()?;
    // The opener outlives the call; wait on it off-loop so it never lingers
    // as a zombie.
    thread::Builder::new()
        .name("opener-reaper".into())
        .spawn(move || match child.wait() {
            Ok(status) if !status.success() => warn!("Launcher: opener exited with {}", status),
            Ok(_) => {}
            Err(e) => warn!("Launcher: failed to wait on opener: {}", e),
        })?;
    Ok(())
}

fn build_command(opener: &str, link: &str) -> Option<Command> {
    let mut parts = opener.split_whitespace();
    let program = parts.next()?;

    let mut command = Command::new(program);
    command.args(parts)
        .arg(link)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn opener_arguments_precede_link() {
        let command = build_command("firefox --new-tab", "https://example.org").unwrap();
        assert_eq!(command.get_program(), OsStr::new("firefox"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, [OsStr::new("--new-tab"), OsStr::new("https://example.org")]);
    }

    #[test]
    fn blank_opener_builds_nothing() {
        assert!(build_command("   ", "https://example.org").is_none());
    }

    #[test]
    fn blank_opener_is_an_error() {
        let mut config = Config::default();
        config.general.opener = " ".into();
        assert!(open(&Entry::new("Repo", "/repo"), &config).is_err());
    }

    /// Children of this process named `comm` that have exited but were
    /// never waited on.
    #[cfg(target_os = "linux")]
    fn zombie_children(comm: &str) -> usize {
        let me = std::process::id().to_string();
        let Ok(dir) = std::fs::read_dir("/proc") else { return 0 };
        dir.filter_map(|e| e.ok())
            .filter_map(|e| std::fs::read_to_string(e.path().join("stat")).ok())
            .filter(|stat| {
                // pid (comm) state ppid ...
                let Some(open) = stat.find('(') else { return false };
                let Some(close) = stat.rfind(')') else { return false };
                let mut rest = stat[close + 1..].split_whitespace();
                &stat[open + 1..close] == comm
                    && rest.next() == Some("Z")
                    && rest.next() == Some(me.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn finished_openers_are_reaped() {
        let mut config = Config::default();
        config.general.opener = "true".into();
        let entry = Entry::new("Repo", "https://example.org");
        for _ in 0..3 {
            open(&entry, &config).unwrap();
        }

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let mut zombies = zombie_children("true");
        while zombies > 0 && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(20));
            zombies = zombie_children("true");
        }
        assert_eq!(zombies, 0);
    }
}
