//! Producer loops backing GraphQL subscriptions

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use crate::errors::ServiceResult;

/// Forward `source` into a bounded sink until the subscriber goes away
///
/// The producer stops as soon as the receiving half is dropped, when the
/// source ends, or after forwarding the first source error. The sink is
/// closed when the producer exits.
pub fn pump<T, S>(source: S, buffer: usize) -> (ReceiverStream<ServiceResult<T>>, JoinHandle<()>)
where
    T: Send + 'static,
    S: Stream<Item = ServiceResult<T>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));

    let handle = tokio::spawn(async move {
        let mut source = Box::pin(source);
        loop {
            tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("subscriber disconnected");
                    break;
                }
                next = source.next() => match next {
                    Some(Ok(event)) => {
                        if tx.send(Ok(event)).await.is_err() {
                            tracing::debug!("subscriber disconnected");
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "subscription source failed");
                        let _ = tx.send(Err(err)).await;
                        break;
                    }
                    None => {
                        tracing::debug!("subscription source ended");
                        break;
                    }
                },
            }
        }
    });

    (ReceiverStream::new(rx), handle)
}
