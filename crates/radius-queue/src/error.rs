use snafu::Snafu;

use crate::model::MessageId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("message {id} was not found"))]
    NotFound { id: MessageId },

    /// Returned by [`Queue::extend`](crate::Queue::extend) and
    /// [`Queue::finish`](crate::Queue::finish) when the caller's visibility lock has already
    /// expired and the message was redelivered to a different consumer.
    #[snafu(display("lock held for message {id} has expired or was superseded"))]
    LockExpired { id: MessageId },
}
