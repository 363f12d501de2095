#![forbid(unsafe_code)]

//! Cancellable blocking byte source for the controlling terminal.
//!
//! Reading `/dev/tty` blocks until the user types, which leaves a shutdown
//! path no way to unblock the reader. [`CancelReader`] multiplexes the
//! input fd with an internal wake pipe using `poll(2)`: a
//! [`CancelHandle`] owned by another thread writes one byte to the pipe,
//! and the pending read returns a [`Cancelled`] error promptly instead of
//! hanging.
//!
//! `CancelReader` implements [`std::io::Read`], so it slots straight into
//! [`vtinput_core::Driver`] as its byte source.

use std::io;

#[cfg(unix)]
use std::fs::File;
#[cfg(unix)]
use std::io::{Read, Write};
#[cfg(unix)]
use std::os::fd::AsFd;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::sync::Arc;
#[cfg(unix)]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(unix)]
use vtinput_core::{Driver, SequenceTable};

/// Error payload carried by an `io::Error` when a read was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("read cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// True if the error came from a [`CancelHandle::cancel`] call rather
/// than a real I/O failure.
#[must_use]
pub fn is_cancelled(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<Cancelled>())
}

#[cfg(unix)]
fn cancelled_error() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, Cancelled)
}

/// A blocking reader over a terminal (or any pollable fd-backed source)
/// that can be unblocked from another thread.
#[cfg(unix)]
#[derive(Debug)]
pub struct CancelReader<T = File> {
    input: T,
    wake_rx: UnixStream,
    wake_tx: UnixStream,
    cancelled: Arc<AtomicBool>,
}

/// Handle used to cancel a pending or future read. Obtained from
/// [`CancelReader::cancel_handle`]; safe to move to another thread.
#[cfg(unix)]
#[derive(Debug)]
pub struct CancelHandle {
    wake: UnixStream,
    cancelled: Arc<AtomicBool>,
}

#[cfg(unix)]
impl CancelReader<File> {
    /// Open the controlling terminal.
    ///
    /// # Errors
    ///
    /// Fails when `/dev/tty` cannot be opened (no controlling terminal)
    /// or the wake pipe cannot be created.
    pub fn open() -> io::Result<Self> {
        Self::new(File::open("/dev/tty")?)
    }
}

#[cfg(unix)]
impl<T: AsFd + Read> CancelReader<T> {
    /// Wrap an already-open source. Any pollable fd works: a tty, a
    /// pipe, or a socket.
    ///
    /// # Errors
    ///
    /// Fails when the wake pipe cannot be created.
    pub fn new(input: T) -> io::Result<Self> {
        let (wake_tx, wake_rx) = UnixStream::pair()?;
        Ok(Self {
            input,
            wake_rx,
            wake_tx,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// A handle that unblocks this reader. May be duplicated via
    /// [`CancelHandle::try_clone`] and moved across threads.
    ///
    /// # Errors
    ///
    /// Fails when the wake pipe fd cannot be duplicated.
    pub fn cancel_handle(&self) -> io::Result<CancelHandle> {
        Ok(CancelHandle {
            wake: self.wake_tx.try_clone()?,
            cancelled: Arc::clone(&self.cancelled),
        })
    }

    /// Block until the input fd or the wake pipe is readable.
    fn wait_readable(&self) -> io::Result<Readable> {
        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Ok(Readable::Wake);
            }

            let mut fds = [
                nix::poll::PollFd::new(self.input.as_fd(), nix::poll::PollFlags::POLLIN),
                nix::poll::PollFd::new(self.wake_rx.as_fd(), nix::poll::PollFlags::POLLIN),
            ];
            match nix::poll::poll(&mut fds, nix::poll::PollTimeout::NONE) {
                Ok(_) => {}
                Err(nix::errno::Errno::EINTR) => continue,
                Err(err) => return Err(io::Error::other(err)),
            }

            let wake_ready = fds[1]
                .revents()
                .is_some_and(|r| r.intersects(nix::poll::PollFlags::POLLIN));
            if wake_ready {
                return Ok(Readable::Wake);
            }
            let input_ready = fds[0].revents().is_some_and(|r| {
                r.intersects(
                    nix::poll::PollFlags::POLLIN
                        | nix::poll::PollFlags::POLLHUP
                        | nix::poll::PollFlags::POLLERR,
                )
            });
            if input_ready {
                return Ok(Readable::Input);
            }
        }
    }
}

#[cfg(unix)]
enum Readable {
    Input,
    Wake,
}

#[cfg(unix)]
impl<T: AsFd + Read> Read for CancelReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.wait_readable()? {
            Readable::Wake => {
                // Drain the wake byte so a reused reader does not spin.
                let mut sink = [0u8; 8];
                let _ = (&self.wake_rx).read(&mut sink);
                #[cfg(feature = "tracing")]
                tracing::debug!("terminal read cancelled");
                Err(cancelled_error())
            }
            Readable::Input => self.input.read(buf),
        }
    }
}

#[cfg(unix)]
impl CancelHandle {
    /// Cancel the reader: any blocked read returns a [`Cancelled`] error,
    /// as does every read after this call.
    ///
    /// # Errors
    ///
    /// Fails when the wake pipe write fails, which only happens once the
    /// reader side is gone.
    pub fn cancel(&self) -> io::Result<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        (&self.wake).write_all(&[0])
    }

    /// Duplicate this handle for another thread.
    ///
    /// # Errors
    ///
    /// Fails when the wake pipe fd cannot be duplicated.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self {
            wake: self.wake.try_clone()?,
            cancelled: Arc::clone(&self.cancelled),
        })
    }
}

/// Open the controlling terminal and wrap it in an event driver.
///
/// # Errors
///
/// Fails when the terminal cannot be opened.
#[cfg(unix)]
pub fn open_driver(table: SequenceTable) -> io::Result<Driver<CancelReader<File>>> {
    Ok(Driver::new(CancelReader::open()?, table))
}
