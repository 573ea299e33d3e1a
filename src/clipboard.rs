use anyhow::Result;
use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;

pub const DAEMON_FLAG: &str = "__clipboard_daemon";

/// Reads the payload (the newline-joined path list) from stdin, claims the
/// clipboard, and parks forever. On X11/Wayland the clipboard contents only
/// live as long as the process that set them, hence the daemon.
#[cfg(target_os = "linux")]
fn run_daemon_mode() -> Result<()> {
    let text = std::io::read_to_string(std::io::stdin())?;

    let mut clipboard = Clipboard::new()?;
    match clipboard.set().wait().text(text) {
        Ok(_waiter) => {
            std::thread::park(); // The clipboard stays valid while we live.
            unreachable!("daemon parks indefinitely");
        }
        Err(e) => Err(anyhow::Error::from(e)),
    }
}

/// Checks if the DAEMON_FLAG is present in args. If so, runs in daemon mode.
/// Returns Ok(true) if daemon mode was run, Ok(false) otherwise.
pub fn check_and_run_daemon_if_requested() -> Result<bool> {
    if std::env::args().any(|a| a == DAEMON_FLAG) {
        #[cfg(target_os = "linux")]
        {
            run_daemon_mode()?;
            return Ok(true);
        }
        #[cfg(not(target_os = "linux"))]
        {
            eprintln!("Warning: {DAEMON_FLAG} flag used on a non-Linux system. Ignoring.");
            std::process::exit(0);
        }
    }
    Ok(false)
}

/// Puts `text` on the system clipboard. On Linux this re-executes the current
/// binary as a detached daemon that holds the selection; elsewhere a plain
/// set_text sticks on its own.
pub fn copy_text_to_clipboard(text: String) -> Result<()> {
    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
    }

    #[cfg(target_os = "linux")]
    {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut child = Command::new(std::env::current_exe()?)
            .arg(DAEMON_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .current_dir("/")
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
            stdin.flush()?;
        } else {
            return Err(anyhow::anyhow!("Failed to get stdin for the clipboard daemon"));
        }
    }
    Ok(())
}
