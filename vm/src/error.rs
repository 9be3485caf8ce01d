use arch::codec::FormatError;
use arch::inst::DecodeError;
use thiserror::Error;

/// Everything that can stop the machine. All variants are terminal.
#[derive(Debug, Error)]
pub enum VmError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unknown syscall kind {0}")]
    UnknownSyscall(u16),

    #[error("unsupported file descriptor {0}")]
    BadDescriptor(u16),

    #[error("image does not fit in memory")]
    ImageTooLarge,

    #[error("syscall write failed")]
    SyscallIo(#[source] std::io::Error),

    #[error("bad image {0}: {1}")]
    BadImage(String, #[source] FormatError),

    #[error("bad dump config {0}")]
    DumpCfg(String, #[source] serde_yaml::Error),

    #[error("failed to read {0}")]
    FileRead(String, #[source] std::io::Error),
}
