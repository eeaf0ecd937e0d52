use crate::supervisor::{ServiceDescriptor, Supervisor};
use paylog_core::{RecorderConfig, RecorderError};
use std::net::TcpListener;
use tracing::{debug, info};

/// True when something is already listening on the loopback port. Probed
/// by attempting a bind; only AddrInUse counts as held.
pub fn port_in_use(port: u16) -> bool {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(_) => false,
        Err(e) => e.kind() == std::io::ErrorKind::AddrInUse,
    }
}

/// Launch descriptor for the listener: this same executable, invoked
/// with `serve`, with the resolved port and window passed via env.
pub fn descriptor(name: &str, config: &RecorderConfig) -> Result<ServiceDescriptor, RecorderError> {
    let program = std::env::current_exe()?;
    Ok(ServiceDescriptor {
        name: name.to_string(),
        program,
        args: vec!["serve".to_string()],
        env: vec![
            ("PORT".to_string(), config.port.to_string()),
            ("PAYLOAD_WINDOW".to_string(), config.window.to_string()),
        ],
    })
}

/// Start the managed listener, recovering once from a stale instance.
///
/// Sequence: connect, probe the port, on conflict stop+delete any prior
/// registration under the same name and re-probe. A port still held
/// after recovery belongs to something outside our control and is a
/// fatal conflict. Running this twice converges to exactly one listener.
pub fn start_service(
    supervisor: &mut dyn Supervisor,
    config: &RecorderConfig,
    descriptor: &ServiceDescriptor,
) -> Result<(), RecorderError> {
    supervisor.connect()?;

    if port_in_use(config.port) {
        debug!(port = config.port, "Port held, retiring any prior instance");
        supervisor.stop(&descriptor.name)?;
        supervisor.delete(&descriptor.name)?;
        if port_in_use(config.port) {
            return Err(RecorderError::PortConflict(config.port));
        }
    }

    supervisor.start(descriptor)?;
    info!(name = %descriptor.name, port = config.port, "Service started");
    Ok(())
}

/// Stop and remove the managed listener by logical name.
pub fn stop_service(supervisor: &mut dyn Supervisor, name: &str) -> Result<(), RecorderError> {
    supervisor.connect()?;
    supervisor.stop(name)?;
    supervisor.delete(name)?;
    info!(name, "Service stopped");
    Ok(())
}
