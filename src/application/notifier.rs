use futures::future::join_all;

use crate::domain::notification::Notice;
use crate::domain::ports::Mailer;

/// Sends every notice concurrently. Failures are logged and never surface
/// to the caller; returns how many mails went out.
pub async fn dispatch(mailer: &dyn Mailer, notices: Vec<Notice>) -> usize {
    let sends = notices.iter().map(|notice| async move {
        match mailer.send(&notice.to, &notice.subject, &notice.html).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to send '{}' to {}: {}", notice.subject, notice.to, e);
                false
            }
        }
    });
    join_all(sends).await.into_iter().filter(|sent| *sent).count()
}
