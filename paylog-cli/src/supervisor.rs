use paylog_core::RecorderError;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

/// Logical name the supervisor uses to locate, stop, and restart the
/// listener process across invocations.
pub const SERVICE_NAME: &str = "paylog-service";

/// Launch descriptor for a managed background process.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// Process-control seam the lifecycle commands drive.
///
/// `stop` and `delete` are idempotent: asking to retire a service that
/// is not running succeeds, so an `Err` always means the supervisor
/// itself failed.
pub trait Supervisor {
    fn connect(&mut self) -> Result<(), RecorderError>;

    /// Launch the descriptor's program as a long-lived background
    /// process registered under its logical name.
    fn start(&mut self, descriptor: &ServiceDescriptor) -> Result<(), RecorderError>;

    /// Stop the managed process by logical name, blocking until it has
    /// exited.
    fn stop(&mut self, name: &str) -> Result<(), RecorderError>;

    /// Remove the registration by logical name.
    fn delete(&mut self, name: &str) -> Result<(), RecorderError>;
}

/// Pidfile-backed supervisor: each managed service gets `<name>.pid`
/// and `<name>.log` under a state directory.
pub struct PidfileSupervisor {
    state_dir: PathBuf,
}

impl PidfileSupervisor {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    /// State dir from `PAYLOG_STATE_DIR`, falling back to the OS temp
    /// directory.
    pub fn from_env() -> Self {
        let state_dir = std::env::var_os("PAYLOG_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("paylog"));
        Self::new(state_dir)
    }

    fn pidfile(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{name}.pid"))
    }

    fn logfile(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{name}.log"))
    }

    fn read_pid(&self, name: &str) -> Option<i32> {
        let raw = fs::read_to_string(self.pidfile(name)).ok()?;
        raw.trim().parse().ok()
    }
}

fn supervisor_err(context: &str, err: impl std::fmt::Display) -> RecorderError {
    RecorderError::Supervisor(format!("{context}: {err}"))
}

impl Supervisor for PidfileSupervisor {
    fn connect(&mut self) -> Result<(), RecorderError> {
        fs::create_dir_all(&self.state_dir).map_err(|e| {
            supervisor_err(&format!("cannot prepare state dir {}", self.state_dir.display()), e)
        })
    }

    fn start(&mut self, descriptor: &ServiceDescriptor) -> Result<(), RecorderError> {
        let log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.logfile(&descriptor.name))
            .map_err(|e| supervisor_err("cannot open service log file", e))?;
        let log_err = log
            .try_clone()
            .map_err(|e| supervisor_err("cannot open service log file", e))?;

        let mut command = Command::new(&descriptor.program);
        command
            .args(&descriptor.args)
            .envs(descriptor.env.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        // Detach into its own process group so the listener outlives
        // this invocation and its terminal.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|e| supervisor_err(&format!("failed to launch {}", descriptor.name), e))?;

        fs::write(self.pidfile(&descriptor.name), child.id().to_string())
            .map_err(|e| supervisor_err("cannot write pidfile", e))?;

        debug!(name = %descriptor.name, pid = child.id(), "Service process launched");
        Ok(())
    }

    fn stop(&mut self, name: &str) -> Result<(), RecorderError> {
        let Some(pid) = self.read_pid(name) else {
            debug!(name, "No pidfile, nothing to stop");
            return Ok(());
        };

        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            // ESRCH: already gone.
            if err.raw_os_error() == Some(libc::ESRCH) {
                debug!(name, pid, "Process already exited");
                return Ok(());
            }
            return Err(supervisor_err(&format!("failed to signal {name} (pid {pid})"), err));
        }

        // Block until the process is gone so callers can re-probe the
        // port immediately after stop returns.
        for _ in 0..100 {
            if unsafe { libc::kill(pid, 0) } != 0 {
                debug!(name, pid, "Process stopped");
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        Err(RecorderError::Supervisor(format!(
            "{name} (pid {pid}) did not exit after SIGTERM"
        )))
    }

    fn delete(&mut self, name: &str) -> Result<(), RecorderError> {
        match fs::remove_file(self.pidfile(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(supervisor_err(&format!("failed to remove registration for {name}"), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor_in(dir: &tempfile::TempDir) -> PidfileSupervisor {
        PidfileSupervisor::new(dir.path().to_path_buf())
    }

    #[test]
    fn connect_creates_the_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deeper/state");
        let mut supervisor = PidfileSupervisor::new(nested.clone());
        supervisor.connect().unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn stop_without_pidfile_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = supervisor_in(&dir);
        supervisor.connect().unwrap();
        supervisor.stop("ghost").unwrap();
    }

    #[test]
    fn stop_with_stale_pid_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = supervisor_in(&dir);
        supervisor.connect().unwrap();
        // A pid far above any real pid range: kill() reports ESRCH.
        fs::write(dir.path().join("stale.pid"), "1999999999").unwrap();
        supervisor.stop("stale").unwrap();
    }

    #[test]
    fn stop_with_unparseable_pidfile_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = supervisor_in(&dir);
        supervisor.connect().unwrap();
        fs::write(dir.path().join("junk.pid"), "not-a-pid").unwrap();
        supervisor.stop("junk").unwrap();
    }

    #[test]
    fn delete_removes_the_pidfile_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = supervisor_in(&dir);
        supervisor.connect().unwrap();
        let pidfile = dir.path().join("svc.pid");
        fs::write(&pidfile, "1234").unwrap();

        supervisor.delete("svc").unwrap();
        assert!(!pidfile.exists());
        supervisor.delete("svc").unwrap();
    }

    #[test]
    fn start_records_the_child_pid() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = supervisor_in(&dir);
        supervisor.connect().unwrap();

        let descriptor = ServiceDescriptor {
            name: "true-svc".to_string(),
            program: PathBuf::from("/bin/true"),
            args: vec![],
            env: vec![],
        };
        supervisor.start(&descriptor).unwrap();

        let pid: i32 = fs::read_to_string(dir.path().join("true-svc.pid"))
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(pid > 0);
        assert!(dir.path().join("true-svc.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn stop_terminates_a_running_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = supervisor_in(&dir);
        supervisor.connect().unwrap();

        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        fs::write(dir.path().join("sleeper.pid"), child.id().to_string()).unwrap();

        // stop() polls for process exit; reap the child from this
        // thread so the pid actually disappears.
        let state_dir = dir.path().to_path_buf();
        let stopper = std::thread::spawn(move || {
            PidfileSupervisor::new(state_dir).stop("sleeper")
        });
        let status = child.wait().unwrap();
        assert!(!status.success());
        stopper.join().unwrap().unwrap();
    }
}
