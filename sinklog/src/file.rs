// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A sink which appends to a single log file and rotates it by size and,
//! optionally, once per day.
//!
//! Rotated files are named `<prefix>_<YYYY-MM-DD>_<NNN>.log`, where the
//! prefix is the log path without its extension and `NNN` is the lowest free
//! sequence number for that date. After each rotation, rotated files older
//! than the configured number of days are deleted.
//!
//! Each sink owns one housekeeping thread. It checks once a minute whether a
//! daily rotation is due and runs expired-file cleanup so that deleting old
//! files never happens under the write lock.

use crate::*;

use chrono::{Local, NaiveDate, Timelike};
use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

/// Permission bits used for the active log file unless configured otherwise.
pub const DEFAULT_PERM: &str = "0660";

/// Permission bits applied to a log file once it has been rotated.
pub const ROTATED_PERM: u32 = 0o440;

/// The highest sequence number tried when rotating within a single day.
pub const MAX_SEQUENCE: u16 = 9999;

const TICK_INTERVAL: Duration = Duration::from_secs(60);
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Settings for a `FileSink`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FileConfig {
    /// Path of the active log file. Must include an extension.
    pub path: PathBuf,
    /// Also rotate once per day, shortly after local midnight.
    pub daily_rotate: bool,
    /// Rotated files older than this many days are deleted. Zero keeps them.
    pub max_days: u16,
    /// Rotate before a write would grow the file beyond this many bytes.
    /// Zero disables size based rotation.
    pub max_size: u64,
    /// Octal permission bits for the active log file.
    pub perm: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            daily_rotate: false,
            max_days: 0,
            max_size: 0,
            perm: DEFAULT_PERM.to_string(),
        }
    }
}

/// A type to construct a `FileSink`.
pub struct FileSinkBuilder {
    config: FileConfig,
    reporter: Option<Arc<dyn Reporter>>,
}

impl FileSinkBuilder {
    /// Rotate the file once per day.
    pub fn daily_rotate(mut self, enabled: bool) -> Self {
        self.config.daily_rotate = enabled;
        self
    }

    /// Delete rotated files after they are `days` old.
    pub fn max_days(mut self, days: u16) -> Self {
        self.config.max_days = days;
        self
    }

    /// Rotate when the file would exceed `bytes`.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.config.max_size = bytes;
        self
    }

    /// Sets the permission bits of the active log file, as an octal string.
    pub fn perm(mut self, perm: &str) -> Self {
        self.config.perm = perm.to_string();
        self
    }

    /// Where rotation and cleanup failures are reported. Defaults to
    /// standard error.
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Consumes the builder and returns a `FileSink`. The file is not opened
    /// until the sink is initialized.
    pub fn build(self) -> Result<FileSink> {
        let reporter = self.reporter.unwrap_or_else(default_reporter);
        FileSink::with_reporter(self.config, reporter)
    }
}

/// A `Sink` which appends to a file, with size and daily rotation and
/// retention of rotated files.
pub struct FileSink {
    shared: Arc<Shared>,
    housekeeping: Mutex<Housekeeping>,
}

struct Shared {
    name: String,
    path: PathBuf,
    prefix: PathBuf,
    daily_rotate: bool,
    max_age: Option<Duration>,
    max_size: u64,
    perm: u32,
    state: Mutex<State>,
    reporter: Arc<dyn Reporter>,
}

#[derive(Default)]
struct State {
    file: Option<File>,
    size: u64,
    last_daily: Option<NaiveDate>,
    cleanup: Option<Sender<()>>,
}

enum Housekeeping {
    Idle,
    Running(Housekeeper),
    Stopped,
}

struct Housekeeper {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl Housekeeper {
    fn stop(self) {
        // disconnecting the channel wakes the thread
        drop(self.stop);
        let _ = self.thread.join();
    }
}

impl FileSink {
    /// Returns a builder for a sink writing to `path`.
    pub fn builder<P: Into<PathBuf>>(path: P) -> FileSinkBuilder {
        FileSinkBuilder {
            config: FileConfig {
                path: path.into(),
                ..Default::default()
            },
            reporter: None,
        }
    }

    pub fn new(config: FileConfig) -> Result<Self> {
        Self::with_reporter(config, default_reporter())
    }

    fn with_reporter(config: FileConfig, reporter: Arc<dyn Reporter>) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }
        if config.path.extension().is_none() {
            return Err(Error::MissingExtension(config.path));
        }
        let perm = parse_perm(&config.perm)?;
        let prefix = config.path.with_extension("");
        let max_age = match config.max_days {
            0 => None,
            days => Some(Duration::from_secs(days as u64 * SECONDS_PER_DAY)),
        };

        let shared = Shared {
            name: format!("file({})", config.path.display()),
            path: config.path,
            prefix,
            daily_rotate: config.daily_rotate,
            max_age,
            max_size: config.max_size,
            perm,
            state: Mutex::new(State::default()),
            reporter,
        };

        Ok(Self {
            shared: Arc::new(shared),
            housekeeping: Mutex::new(Housekeeping::Idle),
        })
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Bytes in the active log file as tracked by the sink.
    pub fn current_size(&self) -> u64 {
        self.shared.state.lock().size
    }

    /// Rotates immediately, regardless of size. Returns the new name of the
    /// retired file, or `None` if there was no active file on disk. The sink
    /// remains writable even if an error is returned.
    pub fn rotate(&self) -> Result<Option<PathBuf>> {
        let today = Local::now().date_naive();
        let mut state = self.shared.state.lock();
        self.shared.rotate(&mut state, today)
    }

    fn start_housekeeping(&self) -> Result<()> {
        let mut housekeeping = self.housekeeping.lock();
        if !matches!(*housekeeping, Housekeeping::Idle) {
            return Ok(());
        }

        let (stop, stop_rx) = bounded::<()>(0);
        // a single pending request is enough, cleanup scans everything
        let (cleanup, cleanup_rx) = bounded::<()>(1);

        let shared = self.shared.clone();
        let thread = std::thread::Builder::new()
            .name("sinklog-file".to_string())
            .spawn(move || shared.housekeeping(stop_rx, cleanup_rx))
            .map_err(|source| Error::Spawn {
                name: "file housekeeping",
                source,
            })?;

        self.shared.state.lock().cleanup = Some(cleanup);
        *housekeeping = Housekeeping::Running(Housekeeper { stop, thread });
        Ok(())
    }

    fn stop_housekeeping(&self) {
        let previous = std::mem::replace(&mut *self.housekeeping.lock(), Housekeeping::Stopped);
        if let Housekeeping::Running(housekeeper) = previous {
            housekeeper.stop();
        }
    }
}

impl Shared {
    fn report(&self, error: &Error) {
        self.reporter.report(&self.name, error);
    }

    fn housekeeping(&self, stop: Receiver<()>, cleanup: Receiver<()>) {
        let ticker = if self.daily_rotate {
            tick(TICK_INTERVAL)
        } else {
            never()
        };

        loop {
            select! {
                recv(stop) -> _ => break,
                recv(cleanup) -> msg => {
                    if msg.is_err() {
                        break;
                    }
                    self.remove_expired(SystemTime::now());
                }
                recv(ticker) -> _ => {
                    let now = Local::now();
                    self.daily_check(now.hour(), now.date_naive());
                }
            }
        }
    }

    /// Rotates once for `today` if the local hour is midnight.
    fn daily_check(&self, hour: u32, today: NaiveDate) -> bool {
        if hour != 0 {
            return false;
        }
        let mut state = self.state.lock();
        if state.last_daily == Some(today) {
            return false;
        }
        state.last_daily = Some(today);
        if let Err(e) = self.rotate(&mut state, today) {
            self.report(&e);
        }
        true
    }

    /// Opens (or creates) the active file, replacing any open handle, and
    /// resyncs the tracked size with the file on disk.
    fn open(&self, state: &mut State) -> Result<()> {
        state.file = None;
        state.size = 0;

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.perm);
        }

        let file = options.open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })?;
        state.size = file.metadata().map(|m| m.len()).unwrap_or(0);
        state.file = Some(file);

        metrics! {
            LOG_OPEN.increment();
        }

        // the mode passed to open is subject to the umask
        set_perm(&self.path, self.perm)
    }

    fn rotate(&self, state: &mut State, today: NaiveDate) -> Result<Option<PathBuf>> {
        metrics! {
            LOG_ROTATE.increment();
        }

        let retired = self.retire(state, today);
        let reopened = self.open(state);

        if let Some(cleanup) = &state.cleanup {
            let _ = cleanup.try_send(());
        }

        match (retired, reopened) {
            (Ok(name), Ok(())) => Ok(name),
            (Err(e), Ok(())) | (Ok(_), Err(e)) => {
                metrics! {
                    LOG_ROTATE_EX.increment();
                }
                Err(e)
            }
            (Err(e), Err(reopen)) => {
                metrics! {
                    LOG_ROTATE_EX.increment();
                }
                self.report(&e);
                Err(reopen)
            }
        }
    }

    /// Closes the active file and moves it out of the way.
    fn retire(&self, state: &mut State, today: NaiveDate) -> Result<Option<PathBuf>> {
        if fs::symlink_metadata(&self.path).is_err() {
            return Ok(None);
        }

        let target = next_rotated_path(&self.path, &self.prefix, today)?;

        state.file = None;

        fs::rename(&self.path, &target).map_err(|source| Error::Rename {
            from: self.path.clone(),
            to: target.clone(),
            source,
        })?;
        set_perm(&target, ROTATED_PERM)?;

        Ok(Some(target))
    }

    /// Deletes rotated files which have outlived the retention period.
    /// Returns the number of files removed.
    fn remove_expired(&self, now: SystemTime) -> usize {
        let Some(cutoff) = self.max_age.and_then(|age| now.checked_sub(age)) else {
            return 0;
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let stem = self
            .prefix
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let active = self.path.file_name();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                self.report(&Error::Cleanup {
                    path: dir.to_path_buf(),
                    source,
                });
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    self.report(&Error::Cleanup {
                        path: dir.to_path_buf(),
                        source,
                    });
                    continue;
                }
            };

            let name = entry.file_name();
            if Some(name.as_os_str()) == active || !name.to_string_lossy().starts_with(&stem) {
                continue;
            }

            let path = entry.path();
            let modified = match entry.metadata().and_then(|m| {
                if m.is_file() {
                    m.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(modified)) => modified,
                Ok(None) => continue,
                Err(source) => {
                    self.report(&Error::Cleanup { path, source });
                    continue;
                }
            };

            if modified < cutoff {
                match fs::remove_file(&path) {
                    Ok(()) => {
                        metrics! {
                            LOG_CLEANUP.increment();
                        }
                        removed += 1;
                    }
                    Err(source) => {
                        metrics! {
                            LOG_CLEANUP_EX.increment();
                        }
                        self.report(&Error::Cleanup { path, source });
                    }
                }
            }
        }

        removed
    }
}

impl Sink for FileSink {
    fn name(&self) -> String {
        self.shared.name.clone()
    }

    fn initialize(&self) -> Result<()> {
        let opened = {
            let mut state = self.shared.state.lock();
            self.shared.open(&mut state)
        };
        self.start_housekeeping()?;
        opened
    }

    fn write(&self, text: &str) -> Result<()> {
        let shared = &self.shared;
        let len = text.len() as u64;
        let mut state = shared.state.lock();

        if shared.max_size > 0 && state.size > 0 && state.size + len > shared.max_size {
            if let Err(e) = shared.rotate(&mut state, Local::now().date_naive()) {
                shared.report(&e);
            }
        }

        let file = state.file.as_mut().ok_or(Error::Closed)?;
        file.write_all(text.as_bytes()).map_err(Error::Write)?;
        state.size += len;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match &self.shared.state.lock().file {
            Some(file) => file.sync_all().map_err(Error::Flush),
            None => Ok(()),
        }
    }

    fn destroy(&self) -> Result<()> {
        self.stop_housekeeping();

        let mut state = self.shared.state.lock();
        state.cleanup = None;
        match state.file.take() {
            Some(file) => file.sync_all().map_err(Error::Flush),
            None => Ok(()),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.stop_housekeeping();
    }
}

/// Returns the name a log file with the given prefix is rotated to.
///
/// ```
/// # use std::path::{Path, PathBuf};
/// let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// assert_eq!(
///     sinklog::rotated_path(Path::new("/var/log/app"), date, 6),
///     PathBuf::from("/var/log/app_2024-01-02_006.log"),
/// );
/// ```
pub fn rotated_path(prefix: &Path, date: NaiveDate, sequence: u16) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(format!("_{}_{:03}.log", date.format("%Y-%m-%d"), sequence));
    PathBuf::from(name)
}

fn next_rotated_path(path: &Path, prefix: &Path, date: NaiveDate) -> Result<PathBuf> {
    (1..=MAX_SEQUENCE)
        .map(|sequence| rotated_path(prefix, date, sequence))
        .find(|candidate| fs::symlink_metadata(candidate).is_err())
        .ok_or_else(|| Error::SequenceExhausted(path.to_path_buf()))
}

fn parse_perm(perm: &str) -> Result<u32> {
    let digits = perm.strip_prefix("0o").unwrap_or(perm);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if !digits.is_empty() && mode <= 0o7777 => Ok(mode),
        _ => Err(Error::InvalidPermission(perm.to_string())),
    }
}

#[cfg(unix)]
fn set_perm(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        Error::Permissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_perm(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
