// Consistent exit codes for the lexflow CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error
//   3  = record not found
//   10 = remote service rejected the write
//   13 = network error

use std::process;

use lexflow_common::types::ParseLabelError;
use lexflow_sync::backend::BackendError;
use lexflow_sync::calendar::credentials::CallbackError;
use lexflow_sync::config::ConfigError;
use lexflow_sync::SyncError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    NotFound = 3,
    Rejected = 10,
    Network = 13,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(sync_err) = cause.downcast_ref::<SyncError>() {
                return Self::from_sync_error(sync_err);
            }
            if let Some(backend_err) = cause.downcast_ref::<BackendError>() {
                return Self::from_backend_error(backend_err);
            }
            if cause.is::<ParseLabelError>() || cause.is::<CallbackError>() {
                return Self::Usage;
            }
            if let Some(ConfigError::UnknownKey(_)) = cause.downcast_ref::<ConfigError>() {
                return Self::Usage;
            }
        }
        Self::Error
    }

    fn from_sync_error(err: &SyncError) -> Self {
        match err {
            SyncError::UnknownRecord { .. } => Self::NotFound,
            SyncError::Backend(backend_err) => Self::from_backend_error(backend_err),
        }
    }

    fn from_backend_error(err: &BackendError) -> Self {
        match err {
            BackendError::Transport(_) => Self::Network,
            BackendError::Http { .. } | BackendError::Decode(_) => Self::Rejected,
            BackendError::Storage(_) => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexflow_common::types::RecordKind;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Error.code(), 1);
        assert_eq!(ExitCode::Usage.code(), 2);
        assert_eq!(ExitCode::NotFound.code(), 3);
        assert_eq!(ExitCode::Rejected.code(), 10);
        assert_eq!(ExitCode::Network.code(), 13);
    }

    #[test]
    fn unknown_record_is_not_found() {
        let err = anyhow::Error::new(SyncError::UnknownRecord {
            kind: RecordKind::Task,
            id: "t9".into(),
        });
        assert_eq!(ExitCode::from_error(&err), ExitCode::NotFound);
    }

    #[test]
    fn remote_failures_split_by_transport() {
        let rejected = anyhow::Error::new(SyncError::Backend(BackendError::Http {
            status: 409,
            body: "duplicate key".into(),
        }));
        assert_eq!(ExitCode::from_error(&rejected), ExitCode::Rejected);

        let offline =
            anyhow::Error::new(SyncError::Backend(BackendError::Transport("connection refused".into())));
        assert_eq!(ExitCode::from_error(&offline), ExitCode::Network);
    }

    #[test]
    fn wrapped_errors_are_found_in_the_chain() {
        let err = anyhow::Error::new(BackendError::Transport("timed out".into()))
            .context("failed to add task");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Network);
    }

    #[test]
    fn bad_labels_are_usage_errors() {
        let err = anyhow::Error::new(ParseLabelError { what: "task status", value: "Blocked".into() });
        assert_eq!(ExitCode::from_error(&err), ExitCode::Usage);
        let err = anyhow::Error::new(CallbackError::MissingToken);
        assert_eq!(ExitCode::from_error(&err), ExitCode::Usage);
        let err = anyhow::Error::new(ConfigError::UnknownKey("remote.token".into()));
        assert_eq!(ExitCode::from_error(&err), ExitCode::Usage);
    }

    #[test]
    fn from_error_generic_is_error() {
        let err = anyhow::anyhow!("something went wrong");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Error);
    }

    #[test]
    fn exit_code_to_process_exit_code() {
        let code: process::ExitCode = ExitCode::NotFound.into();
        let _ = code;
    }
}
