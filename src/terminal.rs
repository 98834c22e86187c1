// Raw-mode terminal session
//
// Puts the input device into non-canonical, no-echo mode for the life of the
// session and puts the original attributes back exactly once, either when the
// session is dropped or from the interrupt path through a RestoreHandle.

use std::io;
use std::mem::MaybeUninit;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::error::{Result, TeleopError};

struct SavedState {
    fd: RawFd,
    original: libc::termios,
    released: AtomicBool,
}

/// Cloneable handle that puts the saved attributes back.
///
/// `restore` makes a single `tcsetattr` call and never blocks or allocates on
/// the success path, so it is fine to call from the interrupt handler.
#[derive(Clone)]
pub struct RestoreHandle {
    saved: Arc<SavedState>,
}

impl RestoreHandle {
    /// Returns true if this call performed the restore, false if some other
    /// handle (or the session itself) already did.
    pub fn restore(&self) -> bool {
        if self.saved.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Err(e) = set_attrs(self.saved.fd, &self.saved.original) {
            warn!("Failed to restore terminal attributes: {}", e);
        }
        true
    }

    pub fn is_restored(&self) -> bool {
        self.saved.released.load(Ordering::SeqCst)
    }
}

/// Exclusive owner of the terminal's original mode
pub struct TerminalSession {
    handle: RestoreHandle,
}

impl TerminalSession {
    /// Acquire standard input
    pub fn acquire() -> Result<Self> {
        Self::acquire_fd(libc::STDIN_FILENO)
    }

    pub fn acquire_fd(fd: RawFd) -> Result<Self> {
        let original = get_attrs(fd).map_err(TeleopError::DeviceUnavailable)?;

        let mut raw = original;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        // Setting a new line, then end of file
        raw.c_cc[libc::VEOL] = 1;
        raw.c_cc[libc::VEOF] = 2;
        // Non-canonical reads return after a single byte, no timer
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        set_attrs(fd, &raw).map_err(TeleopError::DeviceUnavailable)?;
        debug!("Terminal on fd {} switched to raw mode", fd);

        Ok(Self {
            handle: RestoreHandle {
                saved: Arc::new(SavedState {
                    fd,
                    original,
                    released: AtomicBool::new(false),
                }),
            },
        })
    }

    pub fn restorer(&self) -> RestoreHandle {
        self.handle.clone()
    }

    /// Put the original attributes back and end the session
    pub fn release(self) {
        if self.handle.restore() {
            debug!("Terminal restored");
        } else {
            debug!("Terminal already restored by interrupt");
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.handle.restore() {
            debug!("Terminal restored on drop");
        }
    }
}

fn get_attrs(fd: RawFd) -> io::Result<libc::termios> {
    let mut attrs = MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr fully initializes the struct when it returns 0
    if unsafe { libc::tcgetattr(fd, attrs.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { attrs.assume_init() })
}

fn set_attrs(fd: RawFd, attrs: &libc::termios) -> io::Result<()> {
    // SAFETY: attrs points to a valid termios for the duration of the call
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, attrs) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::os::fd::AsRawFd;
    use std::ptr;

    /// Pseudo-terminal pair standing in for an interactive terminal
    pub(crate) struct Pty {
        master: RawFd,
        pub(crate) slave: RawFd,
    }

    impl Pty {
        pub(crate) fn open() -> Self {
            let mut master = -1;
            let mut slave = -1;
            let rc = unsafe {
                libc::openpty(
                    &mut master,
                    &mut slave,
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                )
            };
            assert_eq!(rc, 0, "openpty failed: {}", io::Error::last_os_error());
            Self { master, slave }
        }

        pub(crate) fn master_fd(&self) -> RawFd {
            self.master
        }
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.slave);
                libc::close(self.master);
            }
        }
    }

    type Snapshot = (
        libc::tcflag_t,
        libc::tcflag_t,
        libc::tcflag_t,
        libc::tcflag_t,
        Vec<libc::cc_t>,
        libc::speed_t,
        libc::speed_t,
    );

    pub(crate) fn snapshot(fd: RawFd) -> Snapshot {
        let t = get_attrs(fd).unwrap();
        let (ispeed, ospeed) = unsafe { (libc::cfgetispeed(&t), libc::cfgetospeed(&t)) };
        (
            t.c_iflag,
            t.c_oflag,
            t.c_cflag,
            t.c_lflag,
            t.c_cc.to_vec(),
            ispeed,
            ospeed,
        )
    }

    #[test]
    fn test_acquire_sets_raw_mode() {
        let pty = Pty::open();
        let _session = TerminalSession::acquire_fd(pty.slave).unwrap();

        let t = get_attrs(pty.slave).unwrap();
        assert_eq!(t.c_lflag & libc::ICANON, 0, "canonical mode still on");
        assert_eq!(t.c_lflag & libc::ECHO, 0, "echo still on");
        assert_ne!(t.c_lflag & libc::ISIG, 0, "Ctrl-C must still raise SIGINT");
        assert_eq!(t.c_cc[libc::VMIN], 1);
        assert_eq!(t.c_cc[libc::VTIME], 0);
    }

    #[test]
    fn test_release_restores_exact_attributes() {
        let pty = Pty::open();
        let before = snapshot(pty.slave);

        let session = TerminalSession::acquire_fd(pty.slave).unwrap();
        assert_ne!(snapshot(pty.slave), before);
        session.release();

        assert_eq!(snapshot(pty.slave), before);
    }

    #[test]
    fn test_drop_restores() {
        let pty = Pty::open();
        let before = snapshot(pty.slave);
        {
            let _session = TerminalSession::acquire_fd(pty.slave).unwrap();
        }
        assert_eq!(snapshot(pty.slave), before);
    }

    #[test]
    fn test_restore_happens_once() {
        let pty = Pty::open();
        let session = TerminalSession::acquire_fd(pty.slave).unwrap();
        let handle = session.restorer();

        assert!(!handle.is_restored());
        assert!(handle.restore());
        assert!(handle.is_restored());
        assert!(!handle.clone().restore());
        session.release();
        assert!(handle.is_restored());
    }

    #[test]
    fn test_not_a_terminal() {
        let file = std::fs::File::open("/dev/null").unwrap();
        let err = TerminalSession::acquire_fd(file.as_raw_fd()).err().unwrap();
        assert!(matches!(err, TeleopError::DeviceUnavailable(_)));
    }
}
