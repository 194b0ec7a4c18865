use snafu::Snafu;

use crate::model::OperationId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("operation {id} was not found"))]
    NotFound { id: OperationId },

    /// Terminal states are write-once: a worker that has already published `Succeeded`,
    /// `Failed`, or `Canceled` for an operation can never overwrite it.
    #[snafu(display("operation {id} already reached a terminal state"))]
    AlreadyTerminal { id: OperationId },

    #[snafu(display("cannot complete operation {id} with a non-terminal status"))]
    NotTerminal { id: OperationId },
}
