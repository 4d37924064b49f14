//! Progress bar display for downloads

use std::io::{self, Read};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress display for a single artifact download
///
/// Hidden when stderr is not a terminal, so piped and CI output stays clean.
pub struct DownloadProgress {
    pb: ProgressBar,
}

impl DownloadProgress {
    /// Create a bar for `name`; `length` is the content length if the server sent one.
    pub fn new(name: &str, length: Option<u64>) -> Self {
        let pb = match length {
            Some(total) => {
                let pb = ProgressBar::new(total);
                let style = ProgressStyle::default_bar()
                    .template("  [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-");
                pb.set_style(style);
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                let style = ProgressStyle::default_spinner()
                    .template("  {spinner} {bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                pb.set_style(style);
                pb
            }
        };

        if !console::Term::stderr().is_term() {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_message(name.to_string());

        Self { pb }
    }

    /// Wrap a reader so every read advances the bar.
    pub fn wrap<R: Read>(&self, reader: R) -> impl Read {
        self.pb.wrap_read(reader)
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.pb.abandon();
    }
}

/// Copy `reader` into `writer`, telling read failures apart from write failures.
///
/// The resolver reports the former as a download error and the latter as a
/// resolution error.
pub fn copy_split<R: Read, W: io::Write>(
    reader: &mut R,
    writer: &mut W,
) -> std::result::Result<u64, CopyError> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    }
}

#[derive(Debug)]
pub enum CopyError {
    Read(io::Error),
    Write(io::Error),
}
