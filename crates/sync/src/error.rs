use taskdeck_core::error::CoreError;
use taskdeck_remote::RemoteError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    /// Text for an error toast.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Remote(e) => e.user_message().to_string(),
            SyncError::Core(CoreError::Validation(detail)) => format!("Please check: {detail}"),
            SyncError::Core(e) => e.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SyncError::Remote(e) if e.is_timeout())
    }
}

impl From<validator::ValidationErrors> for SyncError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SyncError::Core(errors.into())
    }
}
