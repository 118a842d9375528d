use fanpanel_client::ClientError;
use fanpanel_core::UnknownFan;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("expected 2 fan readings, device sent {0}")]
    ReadingCount(usize),
    #[error(transparent)]
    UnknownFan(#[from] UnknownFan),
}

impl PanelError {
    /// HTTP status of a rejected request, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            PanelError::Client(e) => e.status(),
            _ => None,
        }
    }
}
