// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    ExternalFrame, PlaybackState, PlaybackWidget, WidgetEvent, WidgetFactory, WidgetOptions,
};
use crate::config::PlayerConfig;
use crate::video_ref::VideoReference;

const IPC_TIMEOUT: Duration = Duration::from_millis(500);

static SOCKET_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Socket path for one widget instance.
///
/// Lives under `$XDG_STATE_HOME/tvcatalog` (owner-only permissions), falling
/// back to the temp directory keyed by uid.
fn socket_path() -> PathBuf {
    let instance = format!(
        "{}-{}",
        std::process::id(),
        SOCKET_COUNTER.fetch_add(1, Ordering::Relaxed)
    );

    let state_dir = std::env::var("XDG_STATE_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::state_dir);

    if let Some(state_dir) = state_dir {
        let app_dir = state_dir.join("tvcatalog");
        match fs::create_dir_all(&app_dir) {
            Ok(()) => {
                if let Err(e) = fs::set_permissions(&app_dir, fs::Permissions::from_mode(0o700)) {
                    warn!("Failed to set permissions on state directory: {}", e);
                }
                return app_dir.join(format!("mpv-{}.sock", instance));
            }
            Err(e) => warn!("Failed to create state directory: {}", e),
        }
    }

    let uid = unsafe { libc::getuid() };
    std::env::temp_dir().join(format!("tvcatalog-mpv-{}-{}.sock", uid, instance))
}

/// Drain a child's output so the pipe never fills.
fn drain_output(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                debug!("mpv stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                if line.contains("error") || line.contains("ERROR") {
                    warn!("mpv stderr: {}", line);
                } else {
                    debug!("mpv stderr: {}", line);
                }
            }
        });
    }
}

fn exit_message(status: ExitStatus) -> String {
    if status.success() {
        "Player exited normally".to_string()
    } else if let Some(code) = status.code() {
        // 4 is mpv's "quit by user"
        if code == 4 {
            "Player window closed".to_string()
        } else {
            format!("Player exited with error code: {}", code)
        }
    } else {
        "Player terminated by signal".to_string()
    }
}

fn stop_child(child: &mut Child) {
    match child.try_wait() {
        Ok(Some(_)) => debug!("Player process already exited"),
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            debug!("Player process terminated");
        }
        Err(e) => {
            warn!("Error checking player process status: {}, killing", e);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// mpv driven over its JSON IPC socket.
pub struct MpvWidget {
    socket_path: PathBuf,
    process: Option<Child>,
    ready: bool,
    last_state: Option<PlaybackState>,
    exit_reported: bool,
    request_id: u64,
}

impl MpvWidget {
    pub fn spawn(
        config: &PlayerConfig,
        reference: &VideoReference,
        options: &WidgetOptions,
    ) -> Result<Self> {
        let socket_path = socket_path();
        if socket_path.exists() {
            let _ = fs::remove_file(&socket_path);
        }

        let mut cmd = Command::new(&config.command);
        cmd.arg(reference.watch_url())
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .arg("--force-window=yes")
            .arg("--keep-open=yes")
            .arg("--no-terminal")
            .arg(format!("--pause={}", if options.autoplay { "no" } else { "yes" }))
            .arg(format!("--mute={}", if options.start_muted { "yes" } else { "no" }));

        if options.hide_native_controls {
            cmd.arg("--osc=no").arg("--no-input-default-bindings");
        }

        cmd.args(&config.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        debug!("Starting player: {:?}", cmd);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}. Is it installed?", config.command))?;
        drain_output(&mut child);

        Ok(Self {
            socket_path,
            process: Some(child),
            ready: false,
            last_state: None,
            exit_reported: false,
            request_id: 0,
        })
    }

    fn send_command(&mut self, command: Value) -> Result<Value> {
        self.request_id += 1;
        let request_id = self.request_id;

        let mut socket = UnixStream::connect(&self.socket_path).with_context(|| {
            format!("Failed to connect to player socket at {:?}", self.socket_path)
        })?;
        socket.set_read_timeout(Some(IPC_TIMEOUT))?;
        socket.set_write_timeout(Some(IPC_TIMEOUT))?;

        let mut request = command;
        request["request_id"] = json!(request_id);
        let request_str = serde_json::to_string(&request)?;
        debug!("Sending player command: {}", request_str);

        socket.write_all(request_str.as_bytes())?;
        socket.write_all(b"\n")?;

        // Event lines may arrive ahead of the reply
        let mut reader = BufReader::new(socket);
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                anyhow::bail!("Player closed the socket");
            }

            let parsed: Value = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse player response: {}", line))?;

            if parsed.get("request_id").and_then(Value::as_u64) != Some(request_id) {
                continue;
            }

            if let Some(error) = parsed.get("error").and_then(Value::as_str)
                && error != "success"
            {
                anyhow::bail!("Player command failed: {}", error);
            }

            return Ok(parsed);
        }
    }

    fn get_property(&mut self, name: &str) -> Result<Value> {
        let response = self.send_command(json!({ "command": ["get_property", name] }))?;
        Ok(response.get("data").cloned().unwrap_or(Value::Null))
    }

    fn get_f64(&mut self, name: &str) -> Result<f64> {
        self.get_property(name)?
            .as_f64()
            .with_context(|| format!("Property {} is not a number", name))
    }

    fn get_bool(&mut self, name: &str) -> Result<bool> {
        self.get_property(name)?
            .as_bool()
            .with_context(|| format!("Property {} is not a flag", name))
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        self.send_command(json!({ "command": ["set_property", name, value] }))?;
        Ok(())
    }

    fn is_socket_ready(&mut self) -> bool {
        self.socket_path.exists() && self.get_property("mpv-version").is_ok()
    }

    /// Returns the exit status once the process has gone.
    fn check_exit(&mut self) -> Option<ExitStatus> {
        let child = self.process.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Player process exited with status: {:?}", status);
                self.process = None;
                Some(status)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to check player process status: {}", e);
                None
            }
        }
    }
}

impl PlaybackWidget for MpvWidget {
    fn play(&mut self) -> Result<()> {
        self.set_property("pause", json!(false))
    }

    fn pause(&mut self) -> Result<()> {
        self.set_property("pause", json!(true))
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<()> {
        let mode = if allow_seek_ahead {
            "absolute"
        } else {
            "absolute+keyframes"
        };
        self.send_command(json!({ "command": ["seek", seconds, mode] }))?;
        Ok(())
    }

    fn current_time(&mut self) -> Result<f64> {
        self.get_f64("time-pos")
    }

    fn duration(&mut self) -> Result<f64> {
        self.get_f64("duration")
    }

    fn loaded_fraction(&mut self) -> Result<f64> {
        let duration = self.duration()?;
        if duration <= 0.0 {
            return Ok(0.0);
        }
        let cached = self.get_f64("demuxer-cache-time").unwrap_or(0.0);
        Ok((cached / duration).clamp(0.0, 1.0))
    }

    fn is_muted(&mut self) -> Result<bool> {
        self.get_bool("mute")
    }

    fn mute(&mut self) -> Result<()> {
        self.set_property("mute", json!(true))
    }

    fn unmute(&mut self) -> Result<()> {
        self.set_property("mute", json!(false))
    }

    fn player_state(&mut self) -> Result<PlaybackState> {
        if self.get_bool("eof-reached").unwrap_or(false) {
            return Ok(PlaybackState::Ended);
        }
        if self.get_bool("paused-for-cache").unwrap_or(false) {
            return Ok(PlaybackState::Buffering);
        }
        if self.get_bool("pause")? {
            return Ok(PlaybackState::Paused);
        }
        if self.get_f64("time-pos").is_err() {
            // Nothing decoded yet
            return Ok(PlaybackState::Buffering);
        }
        Ok(PlaybackState::Playing)
    }

    fn poll_events(&mut self) -> Vec<WidgetEvent> {
        let mut events = Vec::new();

        if let Some(status) = self.check_exit() {
            if !self.exit_reported {
                self.exit_reported = true;
                events.push(WidgetEvent::Exited(Some(exit_message(status))));
            }
            return events;
        }
        if self.exit_reported || self.process.is_none() {
            return events;
        }

        if !self.ready {
            if !self.is_socket_ready() {
                return events;
            }
            debug!("Player IPC socket ready at {:?}", self.socket_path);
            self.ready = true;
            events.push(WidgetEvent::Ready);
        }

        match self.player_state() {
            Ok(state) if self.last_state != Some(state) => {
                self.last_state = Some(state);
                events.push(WidgetEvent::StateChange(state));
            }
            Ok(_) => {}
            Err(e) => debug!("Player state unavailable: {:#}", e),
        }

        events
    }

    fn destroy(&mut self) {
        if self.process.is_some() && self.ready {
            let _ = self.send_command(json!({ "command": ["quit"] }));
        }
        if let Some(mut child) = self.process.take() {
            stop_child(&mut child);
        }
        if self.socket_path.exists() {
            let _ = fs::remove_file(&self.socket_path);
        }
    }
}

impl Drop for MpvWidget {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// A plain player window for sources the overlay cannot control.
pub struct ProcessFrame {
    process: Option<Child>,
}

impl ProcessFrame {
    pub fn spawn(config: &PlayerConfig, source_url: &str) -> Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.arg(source_url)
            .arg("--force-window=yes")
            .arg("--no-terminal")
            .args(&config.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        debug!("Starting external frame: {:?}", cmd);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}. Is it installed?", config.command))?;
        drain_output(&mut child);

        Ok(Self {
            process: Some(child),
        })
    }
}

impl ExternalFrame for ProcessFrame {
    fn close(&mut self) {
        if let Some(mut child) = self.process.take() {
            stop_child(&mut child);
        }
    }

    fn is_open(&mut self) -> bool {
        let Some(child) = self.process.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("External frame exited: {}", exit_message(status));
                self.process = None;
                false
            }
            Ok(None) => true,
            Err(_) => {
                self.process = None;
                false
            }
        }
    }
}

impl Drop for ProcessFrame {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct MpvFactory {
    config: PlayerConfig,
    available: bool,
}

impl MpvFactory {
    pub fn new(config: PlayerConfig) -> Self {
        let available = Self::is_player_available(&config.command);

        if available {
            debug!("{} detected and will be used as the video player", config.command);
        } else {
            warn!("{} not found! Playback will be unavailable", config.command);
        }

        Self { config, available }
    }

    fn is_player_available(command: &str) -> bool {
        Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

impl WidgetFactory for MpvFactory {
    fn create(
        &mut self,
        reference: &VideoReference,
        options: &WidgetOptions,
    ) -> Result<Box<dyn PlaybackWidget>> {
        if !self.available {
            anyhow::bail!("{} is not installed", self.config.command);
        }
        Ok(Box::new(MpvWidget::spawn(&self.config, reference, options)?))
    }

    fn open_frame(&mut self, source_url: &str) -> Result<Box<dyn ExternalFrame>> {
        if !self.available {
            anyhow::bail!("{} is not installed", self.config.command);
        }
        Ok(Box::new(ProcessFrame::spawn(&self.config, source_url)?))
    }
}
