use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, Local};

use crate::error::LogError;

/// A log destination.
///
/// The variants form a closed set behind one capability: accept a byte
/// span. Rotation decisions are made per write by the rolling variants;
/// `Stdout` and `FixedFile` have no rotation state.
///
/// A sink's file handle is only ever touched by the single thread that
/// currently owns delivery for its logger, so none of the variants carry
/// their own locking.
pub enum Sink {
    Stdout(StdoutSink),
    FixedFile(FixedFileSink),
    RollBySize(RollBySizeSink),
    RollByTime(RollByTimeSink),
}

impl Sink {
    /// Console destination.
    pub fn stdout() -> Sink {
        Sink::Stdout(StdoutSink)
    }

    /// Single file, opened once in append mode, never rotated.
    pub fn fixed_file(path: impl Into<PathBuf>) -> Result<Sink, LogError> {
        Ok(Sink::FixedFile(FixedFileSink::new(path.into())?))
    }

    /// Size-rotated file family starting at `base_path`.
    ///
    /// With `prev_check` the file never exceeds `max_size` even
    /// transiently; without it the file may overshoot by at most one
    /// record before the next write rolls.
    pub fn roll_by_size(
        base_path: impl Into<PathBuf>,
        max_size: u64,
        prev_check: bool,
    ) -> Result<Sink, LogError> {
        Ok(Sink::RollBySize(RollBySizeSink::new(
            base_path.into(),
            max_size,
            prev_check,
        )?))
    }

    /// Time-rotated file family starting at `base_path`.
    ///
    /// With `by_wall_clock` rotations align to fixed wall-clock buckets of
    /// `interval_secs` (the first bucket may be short); otherwise a
    /// rotation happens once more than `interval_secs` have elapsed since
    /// the previous boundary.
    pub fn roll_by_time(
        base_path: impl Into<PathBuf>,
        interval_secs: i64,
        by_wall_clock: bool,
    ) -> Result<Sink, LogError> {
        Ok(Sink::RollByTime(RollByTimeSink::new(
            base_path.into(),
            interval_secs,
            by_wall_clock,
        )?))
    }

    /// Writes the full span to the destination, rotating first when the
    /// variant's policy calls for it.
    pub fn log(&mut self, data: &[u8]) -> Result<(), LogError> {
        match self {
            Sink::Stdout(s) => s.log(data),
            Sink::FixedFile(s) => s.log(data),
            Sink::RollBySize(s) => s.log(data),
            Sink::RollByTime(s) => s.log(data),
        }
    }

    /// Human-readable destination name, used when reporting a degraded
    /// sink.
    pub fn target(&self) -> String {
        match self {
            Sink::Stdout(_) => "stdout".to_string(),
            Sink::FixedFile(s) => s.path.display().to_string(),
            Sink::RollBySize(s) => s.base_path.display().to_string(),
            Sink::RollByTime(s) => s.base_path.display().to_string(),
        }
    }
}

/// Console destination. Stateless; every call locks stdout for the span.
pub struct StdoutSink;

impl StdoutSink {
    fn log(&mut self, data: &[u8]) -> Result<(), LogError> {
        io::stdout()
            .lock()
            .write_all(data)
            .map_err(|e| LogError::sink_io("stdout", e))
    }
}

/// Fixed-file destination, opened once at construction.
pub struct FixedFileSink {
    path: PathBuf,
    file: File,
}

impl FixedFileSink {
    fn new(path: PathBuf) -> Result<Self, LogError> {
        create_parent_dirs(&path)?;
        let file = open_append(&path)?;
        Ok(Self { path, file })
    }

    fn log(&mut self, data: &[u8]) -> Result<(), LogError> {
        self.file
            .write_all(data)
            .map_err(|e| LogError::sink_io(self.path.display().to_string(), e))
    }
}

/// Size-rotated destination.
///
/// `cur_size` counts bytes written to the currently open file and resets
/// to 0 exactly when a new file opens. Filenames append a second-precision
/// wall-clock stamp and a numeric suffix to `base_path`; the suffix resets
/// to 1 whenever the stamp second changes, so rotations within one second
/// stay distinct.
pub struct RollBySizeSink {
    base_path: PathBuf,
    max_size: u64,
    cur_size: u64,
    cur_suffix: u64,
    last_stamp: i64,
    prev_check: bool,
    file: Option<File>,
}

impl RollBySizeSink {
    fn new(base_path: PathBuf, max_size: u64, prev_check: bool) -> Result<Self, LogError> {
        if max_size == 0 {
            return Err(LogError::Config(
                "size rotation requires max_size > 0".into(),
            ));
        }
        create_parent_dirs(&base_path)?;
        Ok(Self {
            base_path,
            max_size,
            cur_size: 0,
            cur_suffix: 1,
            last_stamp: 0,
            prev_check,
            file: None,
        })
    }

    fn log(&mut self, data: &[u8]) -> Result<(), LogError> {
        let len = data.len() as u64;
        if len > self.max_size {
            return Err(LogError::RecordTooLarge {
                len,
                max_size: self.max_size,
            });
        }
        if self.needs_roll(len) {
            self.roll()?;
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(data)
                .map_err(|e| LogError::sink_io(self.base_path.display().to_string(), e))?;
            self.cur_size += len;
        }
        Ok(())
    }

    fn needs_roll(&self, len: u64) -> bool {
        match self.file {
            None => true,
            Some(_) if self.prev_check => self.cur_size >= self.max_size,
            Some(_) => self.cur_size + len > self.max_size,
        }
    }

    fn roll(&mut self) -> Result<(), LogError> {
        // Drop the old handle before opening the successor.
        self.file = None;
        let now = Local::now();
        let stamp_sec = now.timestamp();
        if self.last_stamp != stamp_sec {
            self.cur_suffix = 1;
        }
        let name = format!(
            "{}{}-{}",
            self.base_path.display(),
            now.format("%Y%m%d%H%M%S"),
            self.cur_suffix
        );
        self.cur_suffix += 1;
        self.last_stamp = stamp_sec;
        self.file = Some(open_append(Path::new(&name))?);
        self.cur_size = 0;
        Ok(())
    }
}

/// Time-rotated destination.
///
/// In wall-clock mode `last` stores the bucket index `now / interval`; in
/// elapsed mode it stores the current boundary timestamp, which advances
/// by exactly one interval per rotation rather than snapping to `now`, so
/// boundaries never drift. Exactly one file is opened per effective
/// bucket.
pub struct RollByTimeSink {
    base_path: PathBuf,
    interval_secs: i64,
    last: i64,
    by_wall_clock: bool,
    file: Option<File>,
}

impl RollByTimeSink {
    fn new(base_path: PathBuf, interval_secs: i64, by_wall_clock: bool) -> Result<Self, LogError> {
        if interval_secs <= 0 {
            return Err(LogError::Config(
                "time rotation requires interval_secs > 0".into(),
            ));
        }
        create_parent_dirs(&base_path)?;
        Ok(Self {
            base_path,
            interval_secs,
            last: 0,
            by_wall_clock,
            file: None,
        })
    }

    fn log(&mut self, data: &[u8]) -> Result<(), LogError> {
        self.log_at(data, Local::now().timestamp())
    }

    fn log_at(&mut self, data: &[u8], now: i64) -> Result<(), LogError> {
        if self.needs_roll(now) {
            self.roll(now)?;
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(data)
                .map_err(|e| LogError::sink_io(self.base_path.display().to_string(), e))?;
        }
        Ok(())
    }

    fn needs_roll(&self, now: i64) -> bool {
        match self.file {
            None => true,
            Some(_) if self.by_wall_clock => now / self.interval_secs != self.last,
            Some(_) => now - self.last > self.interval_secs,
        }
    }

    fn roll(&mut self, now: i64) -> Result<(), LogError> {
        let first_open = self.file.is_none();
        self.file = None;
        let stamp: DateTime<Local> =
            DateTime::from(UNIX_EPOCH + Duration::from_secs(now.max(0) as u64));
        let name = format!("{}{}", self.base_path.display(), stamp.format("%Y%m%d%H%M%S"));
        self.file = Some(open_append(Path::new(&name))?);
        self.last = if self.by_wall_clock {
            now / self.interval_secs
        } else if first_open {
            now
        } else {
            self.last + self.interval_secs
        };
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| LogError::sink_io(path.display().to_string(), e))
}

fn create_parent_dirs(path: &Path) -> Result<(), LogError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| LogError::sink_io(parent.display().to_string(), e))?;
        }
    }
    Ok(())
}
