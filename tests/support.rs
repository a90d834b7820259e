use std::ffi::OsStr;
use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Kills the wrapped process when dropped.
pub struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        drop(self.child.kill());
        drop(self.child.wait());
    }
}

/// Spawn the keycrate binary with stdout/stderr captured.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned.
pub fn spawn_keycrate_with_output<I, S>(args: I) -> Result<Child, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(keycrate_bin())
        .args(args)
        .env("RUST_LOG", "error")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn keycrate failed: {}", err))
}

/// Start `keycrate worker` on a free loopback port and wait until it accepts
/// connections. Returns the worker base URL.
///
/// # Errors
///
/// Returns an error if the worker cannot be spawned or never becomes ready.
pub fn spawn_worker() -> Result<(String, ChildGuard), String> {
    let port = pick_port()?;
    let child = Command::new(keycrate_bin())
        .args(["worker", "--host", "127.0.0.1", "--port", &port.to_string()])
        .env("RUST_LOG", "error")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| format!("spawn worker failed: {}", err))?;
    let guard = ChildGuard { child };
    wait_for_port(port, Duration::from_secs(10))?;
    Ok((format!("http://127.0.0.1:{}", port), guard))
}

/// Wait for a child process to exit.
///
/// # Errors
///
/// Returns an error if waiting fails or the timeout is exceeded.
pub fn wait_for_exit(child: &mut Child, timeout: Duration) -> Result<ExitStatus, String> {
    let start = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|err| format!("wait failed: {}", err))?
        {
            return Ok(status);
        }
        if start.elapsed() > timeout {
            drop(child.kill());
            return Err("process timed out".to_owned());
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Read captured stdout/stderr from a child.
///
/// # Errors
///
/// Returns an error if the streams cannot be read.
pub fn read_child_output(child: &mut Child) -> Result<(String, String), String> {
    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_string(&mut stdout)
            .map_err(|err| format!("read stdout failed: {}", err))?;
    }
    let mut stderr = String::new();
    if let Some(mut err_out) = child.stderr.take() {
        err_out
            .read_to_string(&mut stderr)
            .map_err(|err| format!("read stderr failed: {}", err))?;
    }
    Ok((stdout, stderr))
}

/// Run the binary to completion and return its status and output.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned, read or times out.
pub fn run_keycrate<I, S>(args: I) -> Result<(ExitStatus, String, String), String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = spawn_keycrate_with_output(args)?;
    // Drain output before waiting so a full pipe cannot stall the child.
    let (stdout, stderr) = read_child_output(&mut child)?;
    let status = wait_for_exit(&mut child, Duration::from_secs(60))?;
    Ok((status, stdout, stderr))
}

/// Pick an available local TCP port.
///
/// # Errors
///
/// Returns an error if a local port cannot be allocated.
pub fn pick_port() -> Result<u16, String> {
    TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind port failed: {}", err))?
        .local_addr()
        .map_err(|err| format!("port addr failed: {}", err))
        .map(|addr| addr.port())
}

fn wait_for_port(port: u16, timeout: Duration) -> Result<(), String> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(25));
    }
    Err(format!("worker on port {} never became ready", port))
}

fn keycrate_bin() -> &'static str {
    env!("CARGO_BIN_EXE_keycrate")
}
